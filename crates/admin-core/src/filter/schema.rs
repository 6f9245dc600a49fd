//! Static filter-field schema.
//!
//! The schema is a plain table declared once: field name -> type +
//! default lookup. A declaration may carry a lookup prefix on the name
//! (`^name`, `~username`, ...).

use std::collections::BTreeMap;

use crate::error::DomainError;

/// How a filter value is matched against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Case-insensitive exact match (`=` or no prefix).
    IExact,
    /// Case-insensitive starts-with (`^`).
    IStartsWith,
    /// Case-insensitive contains (`~`).
    IContains,
    /// Case-insensitive regex match (`$`).
    IRegex,
    /// Whole-word text search (`@`).
    Search,
}

impl Lookup {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '^' => Some(Lookup::IStartsWith),
            '=' => Some(Lookup::IExact),
            '~' => Some(Lookup::IContains),
            '$' => Some(Lookup::IRegex),
            '@' => Some(Lookup::Search),
            _ => None,
        }
    }
}

/// Declared type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Uuid,
    DateTime,
    /// Structured payloads are never filtered; declared fields of this
    /// type are skipped rather than erroring.
    Json,
    TimeZone,
}

impl FieldType {
    pub fn filterable(&self) -> bool {
        !matches!(self, FieldType::Json | FieldType::TimeZone)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub ty: FieldType,
    pub lookup: Lookup,
}

/// Field table built once at startup.
#[derive(Debug, Clone, Default)]
pub struct FilterSchema {
    fields: BTreeMap<String, FieldSpec>,
}

impl FilterSchema {
    pub fn builder() -> FilterSchemaBuilder {
        FilterSchemaBuilder::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    /// Resolves a request field, failing fast on undeclared names.
    pub fn resolve(&self, field: &str) -> Result<&FieldSpec, DomainError> {
        self.fields
            .get(field)
            .ok_or_else(|| DomainError::UnknownFilterField(field.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FilterSchemaBuilder {
    fields: Vec<(String, FieldType, Option<Lookup>)>,
    fuzzy_text: bool,
}

impl FilterSchemaBuilder {
    /// Declares a field. The name may carry a lookup prefix; without one
    /// the default lookup applies (exact, or contains for text fields when
    /// `fuzzy_text` is set).
    pub fn field(mut self, decl: &str, ty: FieldType) -> Self {
        let mut chars = decl.chars();
        match chars.next().and_then(Lookup::from_prefix) {
            Some(lookup) => self.fields.push((chars.collect(), ty, Some(lookup))),
            None => self.fields.push((decl.to_string(), ty, None)),
        }
        self
    }

    /// Match-all-fields mode: text fields without an explicit prefix
    /// default to case-insensitive contains instead of exact.
    pub fn fuzzy_text(mut self) -> Self {
        self.fuzzy_text = true;
        self
    }

    pub fn build(self) -> FilterSchema {
        let mut fields = BTreeMap::new();
        for (name, ty, declared) in self.fields {
            let lookup = declared.unwrap_or(match ty {
                FieldType::Text if self.fuzzy_text => Lookup::IContains,
                _ => Lookup::IExact,
            });
            fields.insert(name, FieldSpec { ty, lookup });
        }
        FilterSchema { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_parsing() {
        let schema = FilterSchema::builder()
            .field("^name", FieldType::Text)
            .field("~username", FieldType::Text)
            .field("$path", FieldType::Text)
            .field("@remark", FieldType::Text)
            .field("=key", FieldType::Text)
            .field("sort", FieldType::Integer)
            .build();

        assert_eq!(schema.get("name").unwrap().lookup, Lookup::IStartsWith);
        assert_eq!(schema.get("username").unwrap().lookup, Lookup::IContains);
        assert_eq!(schema.get("path").unwrap().lookup, Lookup::IRegex);
        assert_eq!(schema.get("remark").unwrap().lookup, Lookup::Search);
        assert_eq!(schema.get("key").unwrap().lookup, Lookup::IExact);
        assert_eq!(schema.get("sort").unwrap().lookup, Lookup::IExact);
        assert!(schema.get("^name").is_none());
    }

    #[test]
    fn test_fuzzy_text_default() {
        let schema = FilterSchema::builder()
            .fuzzy_text()
            .field("name", FieldType::Text)
            .field("=key", FieldType::Text)
            .field("visible", FieldType::Boolean)
            .build();

        assert_eq!(schema.get("name").unwrap().lookup, Lookup::IContains);
        // explicit prefix wins over the fuzzy default
        assert_eq!(schema.get("key").unwrap().lookup, Lookup::IExact);
        assert_eq!(schema.get("visible").unwrap().lookup, Lookup::IExact);
    }

    #[test]
    fn test_resolve_unknown_field() {
        let schema = FilterSchema::builder().field("name", FieldType::Text).build();
        assert!(matches!(
            schema.resolve("nope"),
            Err(DomainError::UnknownFilterField(f)) if f == "nope"
        ));
    }
}
