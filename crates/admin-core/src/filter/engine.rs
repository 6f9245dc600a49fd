//! Filter engine: conjunction of field-level predicates over a base set.

use regex::RegexBuilder;
use uuid::Uuid;

use crate::error::DomainError;

use super::schema::{FieldSpec, FieldType, FilterSchema, Lookup};

/// Special request field: its presence flips the request to
/// ancestor-expansion semantics and never contributes a predicate.
pub const PARENT_FIELD: &str = "parent";

/// A field value as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Id(Uuid),
    /// RFC 3339 timestamp; ordered lexicographically.
    DateTime(String),
    Null,
}

impl FieldValue {
    fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Id(id) => Some(id.to_string()),
            FieldValue::DateTime(s) => Some(s.clone()),
            FieldValue::Null => None,
        }
    }
}

/// Anything the engine can filter. Unknown names return `Null`; the
/// schema guards against them before a value is ever requested.
pub trait Filterable {
    fn field_value(&self, field: &str) -> FieldValue;
}

/// Parsed query parameters: ordered field -> values, repeated keys merged.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    entries: Vec<(String, Vec<String>)>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.push(k.into(), v.into());
        }
        params
    }

    pub fn push(&mut self, field: String, value: String) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            values.push(value);
        } else {
            self.entries.push((field, vec![value]));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the request asked for ancestor-expansion semantics.
    pub fn has_parent(&self) -> bool {
        self.entries.iter().any(|(f, _)| f == PARENT_FIELD)
    }

    /// First non-blank value of the `parent` field, if any.
    pub fn parent_value(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == PARENT_FIELD)
            .and_then(|(_, vs)| vs.iter().find(|v| !v.trim().is_empty()))
            .map(|v| v.as_str())
    }

    /// Non-parent entries with blank values dropped. An entry left with no
    /// values is no constraint at all.
    pub fn predicates(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.entries
            .iter()
            .filter(|(f, _)| f != PARENT_FIELD)
            .map(|(f, vs)| {
                (
                    f.as_str(),
                    vs.iter().map(|v| v.as_str()).filter(|v| !v.trim().is_empty()).collect::<Vec<_>>(),
                )
            })
            .filter(|(_, vs)| !vs.is_empty())
    }

    pub fn has_predicates(&self) -> bool {
        self.predicates().next().is_some()
    }
}

#[derive(Debug)]
enum Op {
    TextLookup(Lookup, String),
    TextRegex(regex::Regex),
    TextRange(String, String),
    IntEq(i64),
    IntRange(i64, i64),
    BoolEq(bool),
    IdEq(Uuid),
}

#[derive(Debug)]
struct Predicate {
    field: String,
    op: Op,
}

impl Predicate {
    fn compile(field: &str, spec: &FieldSpec, values: &[&str]) -> Result<Option<Self>, DomainError> {
        let op = match values {
            [v] => Self::compile_single(field, spec, v)?,
            [lo, hi] => Self::compile_range(field, spec, lo, hi)?,
            // Three or more values carry no defined meaning; the entry
            // is dropped.
            _ => return Ok(None),
        };
        Ok(Some(Self { field: field.to_string(), op }))
    }

    fn compile_single(field: &str, spec: &FieldSpec, value: &str) -> Result<Op, DomainError> {
        match spec.ty {
            FieldType::Integer => {
                let n = value.parse::<i64>().map_err(|_| invalid(field, value))?;
                Ok(Op::IntEq(n))
            }
            FieldType::Boolean => Ok(Op::BoolEq(parse_bool(field, value)?)),
            FieldType::Uuid => {
                let id = Uuid::parse_str(value).map_err(|_| invalid(field, value))?;
                Ok(Op::IdEq(id))
            }
            FieldType::Text | FieldType::DateTime => match spec.lookup {
                Lookup::IRegex => {
                    let re = RegexBuilder::new(value)
                        .case_insensitive(true)
                        .build()
                        .map_err(|_| invalid(field, value))?;
                    Ok(Op::TextRegex(re))
                }
                lookup => Ok(Op::TextLookup(lookup, value.to_lowercase())),
            },
            FieldType::Json | FieldType::TimeZone => unreachable!("non-filterable fields are skipped"),
        }
    }

    fn compile_range(field: &str, spec: &FieldSpec, lo: &str, hi: &str) -> Result<Op, DomainError> {
        match spec.ty {
            FieldType::Integer => {
                let lo = lo.parse::<i64>().map_err(|_| invalid(field, lo))?;
                let hi = hi.parse::<i64>().map_err(|_| invalid(field, hi))?;
                Ok(Op::IntRange(lo, hi))
            }
            FieldType::Boolean => Err(invalid(field, lo)),
            _ => Ok(Op::TextRange(lo.to_lowercase(), hi.to_lowercase())),
        }
    }

    fn matches(&self, node: &impl Filterable) -> bool {
        let value = node.field_value(&self.field);
        match (&self.op, &value) {
            (_, FieldValue::Null) => false,
            (Op::IntEq(n), FieldValue::Integer(v)) => v == n,
            (Op::IntRange(lo, hi), FieldValue::Integer(v)) => lo <= v && v <= hi,
            (Op::BoolEq(b), FieldValue::Boolean(v)) => v == b,
            (Op::IdEq(id), FieldValue::Id(v)) => v == id,
            (Op::TextRegex(re), v) => v.as_text().map(|t| re.is_match(&t)).unwrap_or(false),
            (Op::TextRange(lo, hi), v) => match v.as_text() {
                Some(t) => {
                    let t = t.to_lowercase();
                    *lo <= t && t <= *hi
                }
                None => false,
            },
            (Op::TextLookup(lookup, needle), v) => match v.as_text() {
                Some(t) => text_matches(*lookup, needle, &t.to_lowercase()),
                None => false,
            },
            _ => false,
        }
    }
}

fn text_matches(lookup: Lookup, needle: &str, haystack: &str) -> bool {
    match lookup {
        Lookup::IExact => haystack == needle,
        Lookup::IStartsWith => haystack.starts_with(needle),
        Lookup::IContains => haystack.contains(needle),
        // Whole-word match; multi-word needles fall back to contains.
        Lookup::Search => {
            if needle.split_whitespace().count() > 1 {
                haystack.contains(needle)
            } else {
                haystack.split(|c: char| !c.is_alphanumeric()).any(|w| w == needle)
            }
        }
        Lookup::IRegex => unreachable!("regex predicates are precompiled"),
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, DomainError> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &str, value: &str) -> DomainError {
    DomainError::InvalidFilterValue { field: field.to_string(), value: value.to_string() }
}

/// Evaluates request predicates against an in-memory base set.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    schema: FilterSchema,
}

impl FilterEngine {
    pub fn new(schema: FilterSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    /// Returns the subset of `base` matching the conjunction of all
    /// effective predicates. An empty predicate set returns `base`
    /// unchanged; the result is always a subset of `base`.
    pub fn apply<T: Filterable + Clone>(
        &self,
        params: &FilterParams,
        base: &[T],
    ) -> Result<Vec<T>, DomainError> {
        let mut predicates = Vec::new();
        for (field, values) in params.predicates() {
            let spec = self.schema.resolve(field)?;
            if !spec.ty.filterable() {
                continue;
            }
            if let Some(p) = Predicate::compile(field, spec, &values)? {
                predicates.push(p);
            }
        }

        if predicates.is_empty() {
            return Ok(base.to_vec());
        }

        Ok(base
            .iter()
            .filter(|node| predicates.iter().all(|p| p.matches(*node)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::schema::FieldType;

    #[derive(Debug, Clone)]
    struct Row {
        name: String,
        status: String,
        sort: i64,
        visible: bool,
        payload: FieldValue,
    }

    impl Row {
        fn new(name: &str, status: &str, sort: i64, visible: bool) -> Self {
            Self {
                name: name.to_string(),
                status: status.to_string(),
                sort,
                visible,
                payload: FieldValue::Null,
            }
        }
    }

    impl Filterable for Row {
        fn field_value(&self, field: &str) -> FieldValue {
            match field {
                "name" => FieldValue::Text(self.name.clone()),
                "status" => FieldValue::Text(self.status.clone()),
                "sort" => FieldValue::Integer(self.sort),
                "visible" => FieldValue::Boolean(self.visible),
                "payload" => self.payload.clone(),
                _ => FieldValue::Null,
            }
        }
    }

    fn engine() -> FilterEngine {
        FilterEngine::new(
            FilterSchema::builder()
                .fuzzy_text()
                .field("name", FieldType::Text)
                .field("=status", FieldType::Text)
                .field("sort", FieldType::Integer)
                .field("visible", FieldType::Boolean)
                .field("payload", FieldType::Json)
                .build(),
        )
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("System", "enabled", 1, true),
            Row::new("User Menu", "enabled", 2, true),
            Row::new("Audit Log", "disabled", 3, false),
        ]
    }

    #[test]
    fn test_identity_on_empty_params() {
        let base = rows();
        let out = engine().apply(&FilterParams::new(), &base).unwrap();
        assert_eq!(out.len(), base.len());
    }

    #[test]
    fn test_subset_property() {
        let base = rows();
        let params = FilterParams::from_pairs([("name", "menu")]);
        let out = engine().apply(&params, &base).unwrap();
        assert!(out.iter().all(|r| base.iter().any(|b| b.name == r.name)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "User Menu");
    }

    #[test]
    fn test_blank_values_are_no_constraint() {
        let base = rows();
        let params = FilterParams::from_pairs([("name", ""), ("status", "  ")]);
        let out = engine().apply(&params, &base).unwrap();
        assert_eq!(out.len(), base.len());
    }

    #[test]
    fn test_conjunction() {
        let base = rows();
        let params = FilterParams::from_pairs([("status", "enabled"), ("visible", "true")]);
        let out = engine().apply(&params, &base).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let base = rows();
        let params = FilterParams::from_pairs([("status", "ENABLED")]);
        let out = engine().apply(&params, &base).unwrap();
        assert_eq!(out.len(), 2);
        // exact, not contains
        let params = FilterParams::from_pairs([("status", "abled")]);
        assert!(engine().apply(&params, &base).unwrap().is_empty());
    }

    #[test]
    fn test_two_values_become_inclusive_range() {
        // scenario: status declared with two date-like values
        let mut base = rows();
        base[0].status = "2024-02-10".to_string();
        base[1].status = "2024-07-01".to_string();
        base[2].status = "2023-12-31".to_string();
        let mut params = FilterParams::new();
        params.push("status".to_string(), "2024-01-01".to_string());
        params.push("status".to_string(), "2024-06-01".to_string());
        let out = engine().apply(&params, &base).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, "2024-02-10");
    }

    #[test]
    fn test_integer_range() {
        let base = rows();
        let mut params = FilterParams::new();
        params.push("sort".to_string(), "2".to_string());
        params.push("sort".to_string(), "3".to_string());
        let out = engine().apply(&params, &base).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_unknown_field_fails_fast() {
        let params = FilterParams::from_pairs([("owner", "root")]);
        assert!(matches!(
            engine().apply(&params, &rows()),
            Err(DomainError::UnknownFilterField(f)) if f == "owner"
        ));
    }

    #[test]
    fn test_json_field_is_skipped_not_error() {
        let params = FilterParams::from_pairs([("payload", "whatever")]);
        let out = engine().apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), rows().len());
    }

    #[test]
    fn test_parent_field_is_mode_not_predicate() {
        let params = FilterParams::from_pairs([("parent", "some-id")]);
        assert!(params.has_parent());
        assert!(!params.has_predicates());
        let out = engine().apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), rows().len());
    }

    #[test]
    fn test_invalid_integer_value() {
        let params = FilterParams::from_pairs([("sort", "abc")]);
        assert!(matches!(
            engine().apply(&params, &rows()),
            Err(DomainError::InvalidFilterValue { .. })
        ));
    }

    #[test]
    fn test_regex_lookup() {
        let schema = FilterSchema::builder().field("$name", FieldType::Text).build();
        let eng = FilterEngine::new(schema);
        let params = FilterParams::from_pairs([("name", "^user .*")]);
        let out = eng.apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "User Menu");

        let params = FilterParams::from_pairs([("name", "[unclosed")]);
        assert!(eng.apply(&params, &rows()).is_err());
    }

    #[test]
    fn test_search_lookup_matches_whole_words() {
        let schema = FilterSchema::builder().field("@name", FieldType::Text).build();
        let eng = FilterEngine::new(schema);
        let params = FilterParams::from_pairs([("name", "menu")]);
        let out = eng.apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), 1);
        // "Log" is a word of "Audit Log"; "Lo" is not
        let params = FilterParams::from_pairs([("name", "lo")]);
        assert!(eng.apply(&params, &rows()).unwrap().is_empty());
    }

    #[test]
    fn test_starts_with_lookup() {
        let schema = FilterSchema::builder().field("^name", FieldType::Text).build();
        let eng = FilterEngine::new(schema);
        let params = FilterParams::from_pairs([("name", "audit")]);
        let out = eng.apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Audit Log");
    }

    #[test]
    fn test_more_than_two_values_is_dropped() {
        let mut params = FilterParams::new();
        for v in ["1", "2", "3"] {
            params.push("sort".to_string(), v.to_string());
        }
        let out = engine().apply(&params, &rows()).unwrap();
        assert_eq!(out.len(), rows().len());
    }
}
