//! Audit trail repository.
//!
//! Append-only audit entries recording every lifecycle mutation. Entries are
//! written on the caller's transaction so they commit or roll back with it.

use chrono::{DateTime, Utc};
use roll_core::entities::AuditEntry;
use roll_core::enums::{AuditAction, EntityType};
use roll_core::ids::PREFIX_AUDIT;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json, to_sql_datetime};
use crate::service::RollService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

/// Append an audit entry on `conn` (usually an open transaction).
pub(crate) async fn append_audit_on<D: Serialize>(
    conn: &libsql::Connection,
    actor_id: Option<&str>,
    entity_type: EntityType,
    entity_id: &str,
    action: AuditAction,
    detail: Option<&D>,
    now: DateTime<Utc>,
) -> Result<AuditEntry, DatabaseError> {
    let detail = detail
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| DatabaseError::Other(e.into()))?;
    let entry = AuditEntry {
        id: generate_id_on(conn, PREFIX_AUDIT).await?,
        actor_id: actor_id.map(String::from),
        entity_type,
        entity_id: entity_id.to_string(),
        action,
        detail,
        created_at: now,
    };

    conn.execute(
        "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.actor_id.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string),
            to_sql_datetime(entry.created_at)
        ],
    )
    .await?;
    Ok(entry)
}

impl RollService {
    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref aid) = filter.actor_id {
            params.push(libsql::Value::Text(aid.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                actor_id: get_opt_string(&row, 1)?,
                entity_type: parse_enum(&row.get::<String>(2)?)?,
                entity_id: row.get::<String>(3)?,
                action: parse_enum(&row.get::<String>(4)?)?,
                detail: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use roll_core::audit_detail::RedeemedDetail;

    #[tokio::test]
    async fn append_and_filter() {
        let svc = test_service().await;
        let now = svc.now();
        let conn = svc.db().conn();

        append_audit_on(
            conn,
            Some("usr-1"),
            EntityType::ClassSession,
            "cls-1",
            AuditAction::Opened,
            None::<&()>,
            now,
        )
        .await
        .unwrap();
        append_audit_on(
            conn,
            Some("usr-2"),
            EntityType::AttendanceRecord,
            "att-1",
            AuditAction::Redeemed,
            Some(&RedeemedDetail {
                session_id: "cls-1".into(),
                student_id: "usr-2".into(),
            }),
            now,
        )
        .await
        .unwrap();

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        // Same timestamp: insertion order breaks the tie, newest first.
        assert_eq!(all[0].action, AuditAction::Redeemed);

        let redeemed = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Redeemed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(redeemed.len(), 1);
        assert_eq!(redeemed[0].detail.as_ref().unwrap()["student_id"], "usr-2");

        let by_entity = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::ClassSession),
                entity_id: Some("cls-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_entity.len(), 1);
        assert_eq!(by_entity[0].actor_id.as_deref(), Some("usr-1"));
    }
}
