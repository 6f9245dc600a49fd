//! Menu service: lazy-loaded, filterable menu listing plus CRUD.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::Menu;
use crate::error::DomainError;
use crate::filter::{tree, FieldType, FilterEngine, FilterParams, FilterSchema, NodeArena, RequestMode, PARENT_FIELD};
use crate::repositories::MenuRepository;

/// Filterable menu fields, declared once. Text fields get fuzzy search by
/// default; admins expect contains, not exact, when typing into a search box.
pub fn menu_filter_schema() -> FilterSchema {
    FilterSchema::builder()
        .fuzzy_text()
        .field("id", FieldType::Uuid)
        .field("name", FieldType::Text)
        .field("menu_type", FieldType::Text)
        .field("path", FieldType::Text)
        .field("component", FieldType::Text)
        .field("icon", FieldType::Text)
        .field("redirect", FieldType::Text)
        .field("perm", FieldType::Text)
        .field("sort", FieldType::Integer)
        .field("visible", FieldType::Boolean)
        .field("keep_alive", FieldType::Boolean)
        .field("always_show", FieldType::Boolean)
        .field("created_at", FieldType::DateTime)
        .build()
}

pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    engine: FilterEngine,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepository>) -> Self {
        Self { menus, engine: FilterEngine::new(menu_filter_schema()) }
    }

    /// Lazy-load listing.
    ///
    /// The render level is the `parent` param's children when given, the
    /// whole forest when other params are present, and the root level
    /// otherwise. With effective predicates, matching runs over the whole
    /// forest and the tree reconstructor decides which ids this level must
    /// return; without them the render level passes through unchanged.
    pub async fn lazy_list(&self, params: &FilterParams) -> Result<Vec<Menu>, DomainError> {
        let parent_id = match params.parent_value() {
            Some(v) => Some(Uuid::parse_str(v).map_err(|_| DomainError::InvalidFilterValue {
                field: PARENT_FIELD.to_string(),
                value: v.to_string(),
            })?),
            None => None,
        };

        if !params.has_predicates() {
            return self.menus.children_of(parent_id).await;
        }

        let all = self.menus.find_all().await?;
        let render: Vec<Menu> = match parent_id {
            Some(pid) => self.menus.children_of(Some(pid)).await?,
            None => all.clone(),
        };

        let matched = self.engine.apply(params, &all)?;
        let filter_ids: HashSet<Uuid> = matched.iter().map(|m| m.id).collect();
        let render_ids: HashSet<Uuid> = render.iter().map(|m| m.id).collect();
        let arena = NodeArena::from_nodes(all.iter());
        let mode = if params.has_parent() { RequestMode::Expand } else { RequestMode::Show };
        let keep = tree::resolve(&filter_ids, &render_ids, &arena, mode);

        let mut out: Vec<Menu> = all.into_iter().filter(|m| keep.contains(&m.id)).collect();
        out.sort_by_key(|m| m.sort);
        Ok(out)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Menu, DomainError> {
        self.menus.find_by_id(id).await?.ok_or(DomainError::MenuNotFound)
    }

    pub async fn create(&self, menu: &Menu) -> Result<Menu, DomainError> {
        menu.validate().map_err(|e| DomainError::ValidationError(e.to_string()))?;
        self.menus.create(menu).await
    }

    pub async fn update(&self, menu: &Menu) -> Result<Menu, DomainError> {
        menu.validate().map_err(|e| DomainError::ValidationError(e.to_string()))?;
        self.menus.find_by_id(&menu.id).await?.ok_or(DomainError::MenuNotFound)?;
        self.menus.update(menu).await
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.menus.find_by_id(id).await?.ok_or(DomainError::MenuNotFound)?;
        self.menus.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MenuType;
    use crate::repositories::menu_repository::MockMenuRepository;

    fn node(name: &str, parent: Option<&Menu>, perm: Option<&str>) -> Menu {
        Menu::new(
            parent.map(|p| p.id),
            name.to_string(),
            MenuType::Menu,
            None,
            None,
            perm.map(str::to_string),
            1,
        )
        .unwrap()
    }

    /// Root -> Catalog -> Leaf("Menu"), per the lazy-load scenario.
    fn fixture() -> (Menu, Menu, Menu) {
        let root = node("Root", None, None);
        let catalog = node("Catalog", Some(&root), None);
        let leaf = node("Menu", Some(&catalog), Some("user:view"));
        (root, catalog, leaf)
    }

    #[tokio::test]
    async fn test_no_params_lists_roots() {
        let (root, _catalog, _leaf) = fixture();
        let mut repo = MockMenuRepository::new();
        let roots = vec![root.clone()];
        repo.expect_children_of()
            .withf(|p| p.is_none())
            .returning(move |_| Ok(roots.clone()));

        let service = MenuService::new(Arc::new(repo));
        let out = service.lazy_list(&FilterParams::new()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, root.id);
    }

    #[tokio::test]
    async fn test_filter_without_parent_returns_on_show() {
        let (root, catalog, leaf) = fixture();
        let all = vec![root.clone(), catalog.clone(), leaf.clone()];
        let mut repo = MockMenuRepository::new();
        repo.expect_find_all().returning(move || Ok(all.clone()));

        let service = MenuService::new(Arc::new(repo));
        let params = FilterParams::from_pairs([("name", "Menu")]);
        let out = service.lazy_list(&params).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, leaf.id);
    }

    #[tokio::test]
    async fn test_filter_with_parent_returns_on_expand() {
        // Catalog and leaf both match; render level = children of Catalog.
        let root = node("Root", None, None);
        let catalog = node("User Catalog", Some(&root), None);
        let leaf = node("User Menu", Some(&catalog), None);
        let all = vec![root.clone(), catalog.clone(), leaf.clone()];
        let children = vec![leaf.clone()];

        let mut repo = MockMenuRepository::new();
        repo.expect_find_all().returning(move || Ok(all.clone()));
        let catalog_id = catalog.id;
        repo.expect_children_of()
            .withf(move |p| *p == Some(catalog_id))
            .returning(move |_| Ok(children.clone()));

        let service = MenuService::new(Arc::new(repo));
        let params = FilterParams::from_pairs([("parent", catalog.id.to_string().as_str()), ("name", "user")]);
        let out = service.lazy_list(&params).await.unwrap();
        // The leaf is hidden behind its matched ancestor and belongs to
        // this render level, so expanding the catalog reveals it.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, leaf.id);
    }

    #[tokio::test]
    async fn test_blank_filters_fall_back_to_level_listing() {
        let (root, catalog, _leaf) = fixture();
        let root_id = root.id;
        let children = vec![catalog.clone()];
        let mut repo = MockMenuRepository::new();
        repo.expect_children_of()
            .withf(move |p| *p == Some(root_id))
            .returning(move |_| Ok(children.clone()));

        let service = MenuService::new(Arc::new(repo));
        let params =
            FilterParams::from_pairs([("parent", root.id.to_string().as_str()), ("name", "")]);
        let out = service.lazy_list(&params).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, catalog.id);
    }

    #[tokio::test]
    async fn test_invalid_parent_id_is_client_error() {
        let repo = MockMenuRepository::new();
        let service = MenuService::new(Arc::new(repo));
        let params = FilterParams::from_pairs([("parent", "not-a-uuid"), ("name", "x")]);
        assert!(matches!(
            service.lazy_list(&params).await,
            Err(DomainError::InvalidFilterValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_results_ordered_by_sort() {
        let mut a = node("Alpha Menu", None, None);
        let mut b = node("Beta Menu", None, None);
        a.sort = 2;
        b.sort = 1;
        let all = vec![a.clone(), b.clone()];
        let mut repo = MockMenuRepository::new();
        repo.expect_find_all().returning(move || Ok(all.clone()));

        let service = MenuService::new(Arc::new(repo));
        let params = FilterParams::from_pairs([("name", "menu")]);
        let out = service.lazy_list(&params).await.unwrap();
        assert_eq!(out[0].id, b.id);
        assert_eq!(out[1].id, a.id);
    }

    #[tokio::test]
    async fn test_get_missing_menu() {
        let mut repo = MockMenuRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let service = MenuService::new(Arc::new(repo));
        assert!(matches!(
            service.get(&Uuid::new_v4()).await,
            Err(DomainError::MenuNotFound)
        ));
    }
}
