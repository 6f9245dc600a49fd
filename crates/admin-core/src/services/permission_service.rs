//! Permission resolution: effective permission strings and the navigable
//! route tree for a user.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{CurrentUser, Menu};
use crate::error::DomainError;
use crate::repositories::{MenuRepository, RoleRepository};

/// The one "can see everything" check: superuser, or membership in an
/// admin-flagged role. Used everywhere such a decision is made.
pub fn has_unrestricted_access(user: &CurrentUser) -> bool {
    user.is_superuser || user.roles.iter().any(|r| r.admin)
}

/// A node of the navigable route tree handed to the frontend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteNode {
    pub path: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub name: String,
    pub meta: RouteMeta,
    pub children: Vec<RouteNode>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub title: String,
    pub icon: Option<String>,
    pub hidden: bool,
    pub keep_alive: bool,
    pub always_show: bool,
}

pub struct PermissionService {
    menus: Arc<dyn MenuRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl PermissionService {
    pub fn new(menus: Arc<dyn MenuRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { menus, roles }
    }

    /// Effective permission strings: every non-empty `perm` for an
    /// unrestricted user, otherwise the union over the user's roles of
    /// their menus' non-empty perms. Order-preserving, deduplicated.
    pub async fn user_perms(&self, user: &CurrentUser) -> Result<Vec<String>, DomainError> {
        let granted = self.granted_menus(user).await?;
        let mut seen = HashSet::new();
        let mut perms = Vec::new();
        for menu in &granted {
            if let Some(p) = menu.perm_str() {
                if seen.insert(p.to_string()) {
                    perms.push(p.to_string());
                }
            }
        }
        Ok(perms)
    }

    /// The navigable menu tree for a user, rebuilt over the granted
    /// subset: a granted node whose parent is not granted becomes a root.
    /// Button nodes feed permission aggregation only, never navigation.
    pub async fn routes(&self, user: &CurrentUser) -> Result<Vec<RouteNode>, DomainError> {
        let granted = self.granted_menus(user).await?;
        Ok(build_route_tree(&granted))
    }

    /// Role-scoped menu listing: everything for an unrestricted user, the
    /// union of the user's role grants otherwise.
    pub async fn role_menus(&self, user: &CurrentUser) -> Result<Vec<Menu>, DomainError> {
        self.granted_menus(user).await
    }

    async fn granted_menus(&self, user: &CurrentUser) -> Result<Vec<Menu>, DomainError> {
        if has_unrestricted_access(user) {
            return self.menus.find_all().await;
        }
        let mut seen = HashSet::new();
        let mut granted = Vec::new();
        for role in &user.roles {
            // A concurrently deleted role or menu just contributes nothing.
            for menu in self.roles.menus_for_role(&role.id).await? {
                if seen.insert(menu.id) {
                    granted.push(menu);
                }
            }
        }
        granted.sort_by_key(|m| m.sort);
        Ok(granted)
    }
}

fn build_route_tree(granted: &[Menu]) -> Vec<RouteNode> {
    let ids: HashSet<Uuid> = granted.iter().map(|m| m.id).collect();
    let mut children: HashMap<Uuid, Vec<&Menu>> = HashMap::new();
    let mut roots: Vec<&Menu> = Vec::new();
    for menu in granted {
        if menu.is_button() {
            continue;
        }
        match menu.parent_id {
            Some(parent) if ids.contains(&parent) => children.entry(parent).or_default().push(menu),
            _ => roots.push(menu),
        }
    }
    roots.sort_by_key(|m| m.sort);
    for list in children.values_mut() {
        list.sort_by_key(|m| m.sort);
    }
    roots.iter().map(|m| emit(m, &children)).collect()
}

fn emit(menu: &Menu, children: &HashMap<Uuid, Vec<&Menu>>) -> RouteNode {
    RouteNode {
        path: menu.path.clone(),
        component: menu.component.clone(),
        redirect: menu.redirect.clone(),
        name: menu.name.clone(),
        meta: RouteMeta {
            title: menu.name.clone(),
            icon: menu.icon.clone(),
            hidden: !menu.visible,
            keep_alive: menu.keep_alive,
            always_show: menu.always_show,
        },
        children: children
            .get(&menu.id)
            .map(|kids| kids.iter().map(|k| emit(k, children)).collect())
            .unwrap_or_default(),
    }
}
