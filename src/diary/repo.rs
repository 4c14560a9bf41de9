use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::diary::dto::{SortBy, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Diary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub emotion_summary: Option<String>,
    pub mood: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const DIARY_COLUMNS: &str = "id, user_id, content, emotion_summary, mood, created_at, updated_at";

impl Diary {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        content: &str,
        emotion_summary: Option<&str>,
        mood: Option<&str>,
    ) -> anyhow::Result<Diary> {
        let diary = sqlx::query_as::<_, Diary>(&format!(
            "INSERT INTO diaries (user_id, content, emotion_summary, mood) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {DIARY_COLUMNS}"
        ))
        .bind(user_id)
        .bind(content)
        .bind(emotion_summary)
        .bind(mood)
        .fetch_one(db)
        .await?;
        Ok(diary)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
        search: Option<&str>,
        sort_by: SortBy,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Diary>> {
        // sort column and direction come from whitelisted enums
        let sql = format!(
            "SELECT {DIARY_COLUMNS} FROM diaries \
             WHERE user_id = $1 \
               AND ($2::TEXT IS NULL OR content ILIKE '%' || $2 || '%') \
             ORDER BY {} {} \
             LIMIT $3 OFFSET $4",
            sort_by.column(),
            order.keyword()
        );
        let rows = sqlx::query_as::<_, Diary>(&sql)
            .bind(user_id)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Diary>> {
        let diary = sqlx::query_as::<_, Diary>(&format!(
            "SELECT {DIARY_COLUMNS} FROM diaries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(diary)
    }

    /// Owner-scoped update; absent values keep the stored ones.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        content: Option<&str>,
        emotion_summary: Option<&str>,
        mood: Option<&str>,
    ) -> anyhow::Result<Option<Diary>> {
        let diary = sqlx::query_as::<_, Diary>(&format!(
            "UPDATE diaries SET \
                 content = COALESCE($3, content), \
                 emotion_summary = COALESCE($4, emotion_summary), \
                 mood = COALESCE($5, mood), \
                 updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {DIARY_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(content)
        .bind(emotion_summary)
        .bind(mood)
        .fetch_optional(db)
        .await?;
        Ok(diary)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM diaries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the tag set of an entry, creating missing tags. Runs in
    /// one transaction so a failed attach never leaves a half-updated set.
    pub async fn set_tags(
        db: &PgPool,
        diary_id: Uuid,
        tags: &[String],
    ) -> anyhow::Result<Vec<String>> {
        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM diary_tags WHERE diary_id = $1")
            .bind(diary_id)
            .execute(&mut *tx)
            .await?;

        let mut names: Vec<String> = Vec::new();
        for raw in tags {
            let name = raw.trim();
            if name.is_empty() || names.iter().any(|n| n == name) {
                continue;
            }
            let tag_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO tags (name) VALUES ($1) \
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            sqlx::query(
                "INSERT INTO diary_tags (diary_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(diary_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
            names.push(name.to_owned());
        }
        tx.commit().await?;
        Ok(names)
    }

    pub async fn tags_for(db: &PgPool, diary_id: Uuid) -> anyhow::Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT t.name FROM tags t \
             JOIN diary_tags dt ON dt.tag_id = t.id \
             WHERE dt.diary_id = $1 \
             ORDER BY t.name",
        )
        .bind(diary_id)
        .fetch_all(db)
        .await?;
        Ok(names)
    }

    pub async fn tags_for_many(
        db: &PgPool,
        diary_ids: &[Uuid],
    ) -> anyhow::Result<HashMap<Uuid, Vec<String>>> {
        if diary_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT dt.diary_id, t.name FROM tags t \
             JOIN diary_tags dt ON dt.tag_id = t.id \
             WHERE dt.diary_id = ANY($1) \
             ORDER BY t.name",
        )
        .bind(diary_ids)
        .fetch_all(db)
        .await?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (diary_id, name) in rows {
            map.entry(diary_id).or_default().push(name);
        }
        Ok(map)
    }
}
