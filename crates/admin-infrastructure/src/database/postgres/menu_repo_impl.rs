//! PostgreSQL menu repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use admin_core::domain::{Menu, MenuType};
use admin_core::error::DomainError;
use admin_core::repositories::MenuRepository;

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping, shared with the role repository's
// association queries.
#[derive(Debug, FromRow)]
pub(super) struct MenuRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub menu_type: String,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub redirect: Option<String>,
    pub perm: Option<String>,
    pub sort: i32,
    pub visible: bool,
    pub keep_alive: bool,
    pub always_show: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            parent_id: row.parent_id,
            name: row.name,
            menu_type: MenuType::from_str(&row.menu_type).unwrap_or_default(),
            path: row.path,
            component: row.component,
            icon: row.icon,
            redirect: row.redirect,
            perm: row.perm,
            sort: row.sort,
            visible: row.visible,
            keep_alive: row.keep_alive,
            always_show: row.always_show,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

const MENU_COLUMNS: &str = "id, parent_id, name, menu_type, path, component, icon, redirect, \
                            perm, sort, visible, keep_alive, always_show, created_at, modified_at";

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("finding menu by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus ORDER BY sort, created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("listing menus", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = ANY($1) ORDER BY sort, created_at"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("finding menus by ids", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn children_of(&self, parent_id: Option<Uuid>) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = match parent_id {
            Some(pid) => {
                sqlx::query_as(&format!(
                    "SELECT {MENU_COLUMNS} FROM menus WHERE parent_id = $1 ORDER BY sort, created_at"
                ))
                .bind(pid)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {MENU_COLUMNS} FROM menus WHERE parent_id IS NULL ORDER BY sort, created_at"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| db_err("listing menu children", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menus (
                id, parent_id, name, menu_type, path, component, icon, redirect,
                perm, sort, visible, keep_alive, always_show, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(menu.id)
        .bind(menu.parent_id)
        .bind(&menu.name)
        .bind(menu.menu_type.as_str())
        .bind(&menu.path)
        .bind(&menu.component)
        .bind(&menu.icon)
        .bind(&menu.redirect)
        .bind(&menu.perm)
        .bind(menu.sort)
        .bind(menu.visible)
        .bind(menu.keep_alive)
        .bind(menu.always_show)
        .bind(menu.created_at)
        .bind(menu.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("creating menu", e))?;

        Ok(row.into())
    }

    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            UPDATE menus
            SET parent_id = $2, name = $3, menu_type = $4, path = $5, component = $6,
                icon = $7, redirect = $8, perm = $9, sort = $10, visible = $11,
                keep_alive = $12, always_show = $13, modified_at = NOW()
            WHERE id = $1
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(menu.id)
        .bind(menu.parent_id)
        .bind(&menu.name)
        .bind(menu.menu_type.as_str())
        .bind(&menu.path)
        .bind(&menu.component)
        .bind(&menu.icon)
        .bind(&menu.redirect)
        .bind(&menu.perm)
        .bind(menu.sort)
        .bind(menu.visible)
        .bind(menu.keep_alive)
        .bind(menu.always_show)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("updating menu", e))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("deleting menu", e))?;
        Ok(())
    }
}
