//! Tag and ingredient handlers
//!
//! Both kinds share one implementation; the router binds each handler to a
//! fixed [`AttributeKind`].

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use recipe_core::{
    require_owned, resolve_attributes, Attribute, AttributeAction, AttributeFilter,
    AttributeKind, AttributePayload, OwnerId, WriteMode,
};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::handlers::{parse_entity_id, AppState};
use crate::representation::AttributeRecord;

/// Query parameters for listing tags or ingredients
#[derive(Debug, Default, Deserialize)]
pub struct ListAttributesQuery {
    /// `1` limits the listing to attributes used by at least one recipe
    pub assigned_only: Option<String>,
}

/// GET /api/recipe/{tags,ingredients}
pub async fn list_attributes(
    kind: AttributeKind,
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListAttributesQuery>,
) -> Result<Json<Vec<AttributeRecord>>, ApiError> {
    let filter = AttributeFilter::from_query(query.assigned_only.as_deref())?;

    let snapshot = state.store.fetch_attributes(kind, user.owner).await?;
    let attributes = resolve_attributes(snapshot, filter, user.owner);

    Ok(Json(attributes.iter().map(AttributeRecord::from).collect()))
}

/// PUT /api/recipe/{tags,ingredients}/{id}
pub async fn update_attribute(
    kind: AttributeKind,
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<AttributePayload>, JsonRejection>,
) -> Result<Json<AttributeRecord>, ApiError> {
    write_attribute(kind, &state, user, &id, payload, AttributeAction::Update).await
}

/// PATCH /api/recipe/{tags,ingredients}/{id}
pub async fn partial_update_attribute(
    kind: AttributeKind,
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<AttributePayload>, JsonRejection>,
) -> Result<Json<AttributeRecord>, ApiError> {
    write_attribute(
        kind,
        &state,
        user,
        &id,
        payload,
        AttributeAction::PartialUpdate,
    )
    .await
}

/// DELETE /api/recipe/{tags,ingredients}/{id}
pub async fn destroy_attribute(
    kind: AttributeKind,
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let attribute = load_owned(kind, &state, &id, user.owner).await?;

    if !state.store.delete_attribute(kind, attribute.id).await? {
        return Err(ApiError::not_found(format!("{} not found", kind)));
    }

    tracing::info!(kind = %kind, id = attribute.id, owner = %user.owner, "Attribute deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn write_attribute(
    kind: AttributeKind,
    state: &AppState,
    user: AuthenticatedUser,
    id: &str,
    payload: Result<Json<AttributePayload>, JsonRejection>,
    action: AttributeAction,
) -> Result<Json<AttributeRecord>, ApiError> {
    let attribute = load_owned(kind, state, id, user.owner).await?;

    let Json(payload) = payload?;
    let mode = action.write_mode().unwrap_or(WriteMode::Partial);
    let update = payload.into_update(mode, user.owner)?;

    let updated = state
        .store
        .update_attribute(kind, attribute.id, &update)
        .await?;
    tracing::debug!(kind = %kind, id = updated.id, action = %action, "Attribute updated");

    Ok(Json(AttributeRecord::from(&updated)))
}

async fn load_owned(
    kind: AttributeKind,
    state: &AppState,
    id: &str,
    owner: OwnerId,
) -> Result<Attribute, ApiError> {
    let id = parse_entity_id(id, kind.label())?;
    let found = state.store.find_attribute(kind, id).await?;
    Ok(require_owned(found, id, owner)?)
}
