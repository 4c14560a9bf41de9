use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::diary::repo::Diary;

#[derive(Debug, Deserialize)]
pub struct CreateDiaryRequest {
    pub content: String,
    pub emotion_summary: Option<String>,
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Absent fields keep their stored values; `tags` replaces the whole set.
#[derive(Debug, Deserialize)]
pub struct UpdateDiaryRequest {
    pub content: Option<String>,
    pub emotion_summary: Option<String>,
    pub mood: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DiaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub emotion_summary: Option<String>,
    pub mood: Option<String>,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl DiaryResponse {
    pub fn from_parts(diary: Diary, tags: Vec<String>) -> Self {
        Self {
            id: diary.id,
            user_id: diary.user_id,
            content: diary.content,
            emotion_summary: diary.emotion_summary,
            mood: diary.mood,
            tags,
            created_at: diary.created_at,
            updated_at: diary.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortBy {
    /// Whitelisted column name, safe to splice into ORDER BY.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert!(query.search.is_none());
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn sort_params_deserialize_from_snake_case() {
        let query: ListQuery =
            serde_json::from_str(r#"{"sort_by": "updated_at", "order": "asc"}"#)
                .expect("deserialize");
        assert_eq!(query.sort_by, SortBy::UpdatedAt);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.sort_by.column(), "updated_at");
        assert_eq!(query.order.keyword(), "ASC");
    }

    #[test]
    fn create_request_tags_default_empty() {
        let request: CreateDiaryRequest =
            serde_json::from_str(r#"{"content": "a fine day"}"#).expect("deserialize");
        assert!(request.tags.is_empty());
        assert!(request.mood.is_none());
    }
}
