//! PostgreSQL grant store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use drivebox_core::{AppError, AppResult};
use drivebox_entity::{NodeAction, PermissionGrant};

use crate::store::GrantStore;

use super::map_db_error;

/// Row shape with the JSONB action set still wrapped.
#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    id: Uuid,
    user_id: Uuid,
    node_id: Uuid,
    actions: Json<Vec<NodeAction>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GrantRow> for PermissionGrant {
    fn from(row: GrantRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            node_id: row.node_id,
            actions: row.actions.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const GRANT_COLUMNS: &str = "id, user_id, node_id, actions, created_at, updated_at";

/// Grant store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgGrantStore {
    pool: PgPool,
}

impl PgGrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantStore for PgGrantStore {
    async fn find(&self, user_id: Uuid, node_id: Uuid) -> AppResult<Option<PermissionGrant>> {
        let query = format!(
            "SELECT {GRANT_COLUMNS} FROM permission_grants WHERE user_id = $1 AND node_id = $2"
        );
        let row = sqlx::query_as::<_, GrantRow>(&query)
            .bind(user_id)
            .bind(node_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to find grant"))?;
        Ok(row.map(Into::into))
    }

    async fn find_for_node(&self, node_id: Uuid) -> AppResult<Vec<PermissionGrant>> {
        let query = format!(
            "SELECT {GRANT_COLUMNS} FROM permission_grants WHERE node_id = $1 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, GrantRow>(&query)
            .bind(node_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to list grants"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        let query = format!(
            "INSERT INTO permission_grants (id, user_id, node_id, actions) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {GRANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, GrantRow>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(node_id)
            .bind(Json(actions.to_vec()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to create grant"))?;
        Ok(row.into())
    }

    async fn replace(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        let query = format!(
            "UPDATE permission_grants SET actions = $3, updated_at = NOW() \
             WHERE user_id = $1 AND node_id = $2 \
             RETURNING {GRANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, GrantRow>(&query)
            .bind(user_id)
            .bind(node_id)
            .bind(Json(actions.to_vec()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to update grant"))?
            .ok_or_else(|| AppError::not_found("grant not found"))?;
        Ok(row.into())
    }

    async fn delete(&self, user_id: Uuid, node_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM permission_grants WHERE user_id = $1 AND node_id = $2")
                .bind(user_id)
                .bind(node_id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_db_error(e, "failed to delete grant"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_nodes(&self, node_ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM permission_grants WHERE node_id = ANY($1)")
            .bind(node_ids)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "failed to delete grants for nodes"))?;
        Ok(result.rows_affected())
    }
}
