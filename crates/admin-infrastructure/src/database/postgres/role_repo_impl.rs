//! PostgreSQL role repository, including the role->menu association

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use admin_core::domain::{Menu, Role};
use admin_core::error::DomainError;
use admin_core::repositories::RoleRepository;

use super::menu_repo_impl::MenuRow;

pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    pub sort: i32,
    pub status: bool,
    pub admin: bool,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
            key: row.key,
            sort: row.sort,
            status: row.status,
            admin: row.admin,
            remark: row.remark,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

const ROLE_COLUMNS: &str = "id, name, key, sort, status, admin, remark, created_at, modified_at";

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("finding role by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("finding role by key", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Role>, DomainError> {
        let rows: Vec<RoleRow> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles ORDER BY sort, created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("listing roles", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, role: &Role) -> Result<Role, DomainError> {
        let row: RoleRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO roles (id, name, key, sort, status, admin, remark, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.key)
        .bind(role.sort)
        .bind(role.status)
        .bind(role.admin)
        .bind(&role.remark)
        .bind(role.created_at)
        .bind(role.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::RoleKeyAlreadyExists(role.key.clone())
            } else {
                db_err("creating role", e)
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, role: &Role) -> Result<Role, DomainError> {
        let row: RoleRow = sqlx::query_as(&format!(
            r#"
            UPDATE roles
            SET name = $2, key = $3, sort = $4, status = $5, admin = $6, remark = $7,
                modified_at = NOW()
            WHERE id = $1
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.key)
        .bind(role.sort)
        .bind(role.status)
        .bind(role.admin)
        .bind(&role.remark)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("updating role", e))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("deleting role", e))?;
        Ok(())
    }

    async fn menus_for_role(&self, role_id: &Uuid) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT m.id, m.parent_id, m.name, m.menu_type, m.path, m.component, m.icon,
                   m.redirect, m.perm, m.sort, m.visible, m.keep_alive, m.always_show,
                   m.created_at, m.modified_at
            FROM menus m
            JOIN role_menus rm ON rm.menu_id = m.id
            WHERE rm.role_id = $1
            ORDER BY m.sort, m.created_at
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("listing menus for role", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_menus(&self, role_id: &Uuid, menu_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_err("starting transaction", e))?;

        sqlx::query("DELETE FROM role_menus WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("clearing role menus", e))?;

        for menu_id in menu_ids {
            sqlx::query("INSERT INTO role_menus (role_id, menu_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(menu_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("assigning role menu", e))?;
        }

        tx.commit().await.map_err(|e| db_err("committing role menus", e))
    }

    async fn roles_for_user(&self, user_id: &Uuid) -> Result<Vec<Role>, DomainError> {
        let rows: Vec<RoleRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.name, r.key, r.sort, r.status, r.admin, r.remark,
                   r.created_at, r.modified_at
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.sort, r.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("listing roles for user", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
