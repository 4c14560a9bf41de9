use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tags::repo::Tag;

const MAX_TAG_NAME_LEN: usize = 60;

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

fn validate_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("tag name is required".into()));
    }
    if name.chars().count() > MAX_TAG_NAME_LEN {
        return Err(ApiError::BadRequest("tag name too long".into()));
    }
    Ok(name)
}

#[instrument(skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    let name = validate_name(&payload.name)?;
    let tag = Tag::get_or_create(&state.db, name).await?;
    info!(user_id = %user_id, tag_id = %tag.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag.into())))
}

#[instrument(skip(state, query))]
pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<Pagination>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let tags = Tag::list(&state.db, limit, query.offset.max(0)).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_tag(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = Tag::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("tag not found".into()))?;
    Ok(Json(tag.into()))
}

#[instrument(skip(state, payload))]
pub async fn put_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let name = validate_name(&payload.name)?;

    if let Some(existing) = Tag::find_by_name(&state.db, name).await? {
        if existing.id != id {
            return Err(ApiError::BadRequest("tag name already exists".into()));
        }
    }

    let tag = Tag::rename(&state.db, id, name)
        .await?
        .ok_or_else(|| ApiError::NotFound("tag not found".into()))?;
    info!(user_id = %user_id, tag_id = %tag.id, "tag renamed");
    Ok(Json(tag.into()))
}

#[instrument(skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Tag::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("tag not found".into()));
    }
    info!(user_id = %user_id, tag_id = %id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_trims_and_accepts() {
        assert_eq!(validate_name("  travel ").unwrap(), "travel");
    }

    #[test]
    fn validate_name_rejects_empty_and_oversized() {
        assert!(validate_name("   ").is_err());
        let long = "x".repeat(MAX_TAG_NAME_LEN + 1);
        assert!(validate_name(&long).is_err());
    }
}
