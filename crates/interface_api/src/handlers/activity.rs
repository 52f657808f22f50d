//! Activity log handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use domain_access::Actor;
use domain_audit::{ActivityEntry, ActivityQuery};

use crate::dto::billing::ActivityLogQuery;
use crate::error::ApiError;
use crate::AppState;

/// Lists activity-log entries, newest first (administrators only)
pub async fn list_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let kind = query
        .activity_type
        .map(|k| {
            k.parse()
                .map_err(|e: String| ApiError::Validation(e))
        })
        .transpose()?;

    let entries = state
        .access
        .view_activity(
            &actor,
            &ActivityQuery {
                start_date: query.start_date,
                end_date: query.end_date,
                actor_name: query.user_name,
                kind,
            },
        )
        .await?;
    Ok(Json(entries))
}
