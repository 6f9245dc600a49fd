//! Menu entity and menu-type classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Classifies what a menu node represents. `Button` nodes are
/// fine-grained permission markers, not navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MenuType {
    #[default]
    Null,
    Menu,
    Catalog,
    Extlink,
    Button,
}

impl MenuType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuType::Null => "NULL",
            MenuType::Menu => "MENU",
            MenuType::Catalog => "CATALOG",
            MenuType::Extlink => "EXTLINK",
            MenuType::Button => "BUTTON",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NULL" => Some(MenuType::Null),
            "MENU" => Some(MenuType::Menu),
            "CATALOG" => Some(MenuType::Catalog),
            "EXTLINK" => Some(MenuType::Extlink),
            "BUTTON" => Some(MenuType::Button),
            _ => None,
        }
    }
}

/// A single entry in the navigation/permission tree.
///
/// Nodes form a forest through `parent_id`; all traversal goes through an
/// id -> node arena rather than live references.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Menu {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 64, message = "Menu name must be between 1 and 64 characters"))]
    pub name: String,

    pub menu_type: MenuType,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub redirect: Option<String>,

    /// Permission string aggregated into a user's effective permission set.
    #[validate(length(max = 128, message = "Permission string too long"))]
    pub perm: Option<String>,

    /// Sibling ordering, ascending; ties are stable.
    pub sort: i32,
    /// Whether the node appears in a rendered sidebar.
    pub visible: bool,
    pub keep_alive: bool,
    pub always_show: bool,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Menu {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        parent_id: Option<Uuid>,
        name: String,
        menu_type: MenuType,
        path: Option<String>,
        component: Option<String>,
        perm: Option<String>,
        sort: i32,
    ) -> Result<Self, validator::ValidationErrors> {
        let menu = Self {
            id: Uuid::new_v4(),
            parent_id,
            name: name.trim().to_string(),
            menu_type,
            path,
            component,
            icon: None,
            redirect: None,
            perm,
            sort,
            visible: true,
            keep_alive: false,
            always_show: false,
            created_at: Utc::now(),
            modified_at: None,
        };
        menu.validate()?;
        Ok(menu)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_button(&self) -> bool {
        self.menu_type == MenuType::Button
    }

    /// Non-empty permission string, if any.
    pub fn perm_str(&self) -> Option<&str> {
        self.perm.as_deref().filter(|p| !p.is_empty())
    }
}

impl crate::filter::Filterable for Menu {
    fn field_value(&self, field: &str) -> crate::filter::FieldValue {
        use crate::filter::FieldValue;
        fn opt(v: &Option<String>) -> FieldValue {
            v.clone().map(FieldValue::Text).unwrap_or(FieldValue::Null)
        }
        match field {
            "id" => FieldValue::Id(self.id),
            "name" => FieldValue::Text(self.name.clone()),
            "menu_type" => FieldValue::Text(self.menu_type.as_str().to_string()),
            "path" => opt(&self.path),
            "component" => opt(&self.component),
            "icon" => opt(&self.icon),
            "redirect" => opt(&self.redirect),
            "perm" => opt(&self.perm),
            "sort" => FieldValue::Integer(i64::from(self.sort)),
            "visible" => FieldValue::Boolean(self.visible),
            "keep_alive" => FieldValue::Boolean(self.keep_alive),
            "always_show" => FieldValue::Boolean(self.always_show),
            "created_at" => FieldValue::DateTime(self.created_at.to_rfc3339()),
            _ => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_menu() {
        let menu = Menu::new(
            None,
            "Dashboard".to_string(),
            MenuType::Menu,
            Some("/dashboard".to_string()),
            Some("dashboard/index".to_string()),
            None,
            1,
        );
        assert!(menu.is_ok());
        assert!(menu.unwrap().is_root());
    }

    #[test]
    fn test_empty_name_rejected() {
        let menu = Menu::new(None, "  ".to_string(), MenuType::Menu, None, None, None, 1);
        assert!(menu.is_err());
    }

    #[test]
    fn test_perm_str_skips_empty() {
        let mut menu =
            Menu::new(None, "Users".to_string(), MenuType::Button, None, None, Some("".to_string()), 1)
                .unwrap();
        assert!(menu.perm_str().is_none());
        menu.perm = Some("user:view".to_string());
        assert_eq!(menu.perm_str(), Some("user:view"));
    }

    #[test]
    fn test_menu_type_round_trip() {
        for ty in [MenuType::Null, MenuType::Menu, MenuType::Catalog, MenuType::Extlink, MenuType::Button] {
            assert_eq!(MenuType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(MenuType::from_str("PAGE"), None);
    }
}
