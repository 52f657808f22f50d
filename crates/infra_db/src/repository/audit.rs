//! PostgreSQL adapter for the activity log
//!
//! Append-only by construction: this adapter implements `record` and `find`
//! and nothing else; there is no UPDATE or DELETE statement against the
//! activity_log table anywhere in the workspace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{ActivityId, DomainPort, PortError, UserId};
use domain_audit::{ActivityEntry, ActivityQuery, AuditLog};

use crate::error::DatabaseError;

/// Database row for an activity entry
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    activity_id: Uuid,
    actor_id: Uuid,
    actor_name: String,
    kind: String,
    description: String,
    details: String,
    recorded_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_entry(self) -> Result<ActivityEntry, DatabaseError> {
        Ok(ActivityEntry {
            id: ActivityId::from(self.activity_id),
            actor_id: UserId::from(self.actor_id),
            actor_name: self.actor_name,
            kind: self.kind.parse().map_err(DatabaseError::decode)?,
            description: self.description,
            details: serde_json::from_str(&self.details)
                .map_err(|e| DatabaseError::decode(format!("details: {e}")))?,
            recorded_at: self.recorded_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`AuditLog`]
#[derive(Debug, Clone)]
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgAuditLog {}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), PortError> {
        let details = serde_json::to_string(&entry.details)
            .map_err(|e| PortError::internal(format!("details: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO activity_log (
                activity_id, actor_id, actor_name, kind, description,
                details, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.actor_id.as_uuid())
        .bind(&entry.actor_name)
        .bind(entry.kind.as_str())
        .bind(&entry.description)
        .bind(details)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityEntry>, PortError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT activity_id, actor_id, actor_name, kind, description,
                   details, recorded_at
            FROM activity_log
            WHERE TRUE
            "#,
        );

        if let Some(start) = query.start_date {
            builder.push(" AND recorded_at >= ");
            builder.push_bind(start);
        }
        if let Some(end) = query.end_date {
            builder.push(" AND recorded_at <= ");
            builder.push_bind(end);
        }
        if let Some(ref actor_name) = query.actor_name {
            builder.push(" AND actor_name ILIKE ");
            builder.push_bind(format!("%{actor_name}%"));
        }
        if let Some(kind) = query.kind {
            builder.push(" AND kind = ");
            builder.push_bind(kind.as_str());
        }
        builder.push(" ORDER BY recorded_at DESC");

        let rows: Vec<ActivityRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_entry().map_err(PortError::from))
            .collect()
    }
}
