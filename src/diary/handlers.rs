use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::diary::dto::{CreateDiaryRequest, DiaryResponse, ListQuery, UpdateDiaryRequest};
use crate::diary::repo::Diary;
use crate::error::ApiError;
use crate::state::AppState;

#[instrument(skip(state, payload))]
pub async fn create_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateDiaryRequest>,
) -> Result<(StatusCode, Json<DiaryResponse>), ApiError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("content is required".into()));
    }

    let diary = Diary::create(
        &state.db,
        user_id,
        content,
        payload.emotion_summary.as_deref(),
        payload.mood.as_deref(),
    )
    .await?;
    let tags = Diary::set_tags(&state.db, diary.id, &payload.tags).await?;

    info!(user_id = %user_id, diary_id = %diary.id, "diary created");
    Ok((
        StatusCode::CREATED,
        Json(DiaryResponse::from_parts(diary, tags)),
    ))
}

#[instrument(skip(state, query))]
pub async fn list_diaries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DiaryResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);
    let diaries = Diary::list_by_user(
        &state.db,
        user_id,
        limit,
        offset,
        query.search.as_deref(),
        query.sort_by,
        query.order,
    )
    .await?;

    let ids: Vec<Uuid> = diaries.iter().map(|d| d.id).collect();
    let mut tag_map = Diary::tags_for_many(&state.db, &ids).await?;
    let items = diaries
        .into_iter()
        .map(|d| {
            let tags = tag_map.remove(&d.id).unwrap_or_default();
            DiaryResponse::from_parts(d, tags)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DiaryResponse>, ApiError> {
    let diary = Diary::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("diary not found".into()))?;
    let tags = Diary::tags_for(&state.db, diary.id).await?;
    Ok(Json(DiaryResponse::from_parts(diary, tags)))
}

#[instrument(skip(state, payload))]
pub async fn patch_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDiaryRequest>,
) -> Result<Json<DiaryResponse>, ApiError> {
    if let Some(content) = payload.content.as_deref() {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest("content must not be empty".into()));
        }
    }

    let diary = Diary::update(
        &state.db,
        user_id,
        id,
        payload.content.as_deref().map(str::trim),
        payload.emotion_summary.as_deref(),
        payload.mood.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        warn!(user_id = %user_id, diary_id = %id, "update for missing diary");
        ApiError::NotFound("diary not found".into())
    })?;

    let tags = match payload.tags {
        Some(tags) => Diary::set_tags(&state.db, diary.id, &tags).await?,
        None => Diary::tags_for(&state.db, diary.id).await?,
    };

    info!(user_id = %user_id, diary_id = %diary.id, "diary updated");
    Ok(Json(DiaryResponse::from_parts(diary, tags)))
}

#[instrument(skip(state))]
pub async fn delete_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Diary::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("diary not found".into()));
    }
    info!(user_id = %user_id, diary_id = %id, "diary deleted");
    Ok(StatusCode::NO_CONTENT)
}
