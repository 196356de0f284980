//! PostgreSQL node store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivebox_core::types::{PageRequest, PageResponse};
use drivebox_core::{AppError, AppResult};
use drivebox_entity::{CreateNode, Node};

use crate::store::NodeStore;

use super::map_db_error;

const NODE_COLUMNS: &str =
    "id, storage_id, name, kind, owner_id, parent_id, size_bytes, extension, created_at, updated_at";

/// Node store backed by PostgreSQL.
///
/// Ancestor and descendant queries use recursive CTEs bounded at 64 levels
/// so a corrupted parent cycle cannot hang a query.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn create(&self, input: &CreateNode) -> AppResult<Node> {
        let query = format!(
            "INSERT INTO nodes (id, storage_id, name, kind, owner_id, parent_id, size_bytes, extension) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {NODE_COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.storage_id)
            .bind(&input.name)
            .bind(input.kind)
            .bind(input.owner_id)
            .bind(input.parent_id)
            .bind(input.size_bytes)
            .bind(&input.extension)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to create node"))
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Node>> {
        let query = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1");
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to find node"))
    }

    async fn find_root(&self, owner_id: Uuid) -> AppResult<Option<Node>> {
        let query = format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE owner_id = $1 AND parent_id IS NULL"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to find root folder"))
    }

    async fn children(&self, parent_id: Uuid) -> AppResult<Vec<Node>> {
        let query = format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE parent_id = $1 ORDER BY kind, name"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to list children"))
    }

    async fn children_page(
        &self,
        parent_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Node>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nodes WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to count children"))?;

        let query = format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE parent_id = $1 \
             ORDER BY kind, name LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Node>(&query)
            .bind(parent_id)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to list children page"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Node>> {
        let query = format!(
            "WITH RECURSIVE chain AS ( \
                 SELECT n.*, 0 AS lvl FROM nodes n WHERE n.id = $1 \
                 UNION ALL \
                 SELECT p.*, c.lvl + 1 FROM nodes p \
                 JOIN chain c ON p.id = c.parent_id \
                 WHERE c.lvl < 64 \
             ) \
             SELECT {NODE_COLUMNS} FROM chain ORDER BY lvl DESC"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to walk ancestors"))
    }

    async fn descendants(&self, id: Uuid) -> AppResult<Vec<Node>> {
        let query = format!(
            "WITH RECURSIVE sub AS ( \
                 SELECT n.*, 0 AS lvl FROM nodes n WHERE n.parent_id = $1 \
                 UNION ALL \
                 SELECT c.*, s.lvl + 1 FROM nodes c \
                 JOIN sub s ON c.parent_id = s.id \
                 WHERE s.lvl < 64 \
             ) \
             SELECT {NODE_COLUMNS} FROM sub ORDER BY lvl, name"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to walk descendants"))
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Node> {
        let query = format!(
            "UPDATE nodes SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {NODE_COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to rename node"))?
            .ok_or_else(|| AppError::not_found("node not found"))
    }

    async fn set_parent(&self, id: Uuid, parent_id: Uuid) -> AppResult<Node> {
        let query = format!(
            "UPDATE nodes SET parent_id = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {NODE_COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to move node"))?
            .ok_or_else(|| AppError::not_found("node not found"))
    }

    async fn set_size(&self, id: Uuid, size_bytes: i64) -> AppResult<Node> {
        let query = format!(
            "UPDATE nodes SET size_bytes = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {NODE_COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .bind(size_bytes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to record node size"))?
            .ok_or_else(|| AppError::not_found("node not found"))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to delete nodes"))?;
        Ok(result.rows_affected())
    }
}
