use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::stories::store::{Story, StoryPage, StoryRepo, TemplateStory};

/// Postgres-backed story store.
///
/// Expected tables:
/// - stories (id uuid pk, user_id uuid fk users(id), font_type text,
///   title_page jsonb, pages jsonb, created_at timestamptz default now())
/// - template_stories (id uuid pk, story_type text, title text,
///   page_descriptions text[], created_at timestamptz default now())
///
/// Pages are stored inline as JSON, in order.
#[derive(Clone, Debug)]
pub struct PgStoryRepo {
    pool: PgPool,
}

impl PgStoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StoryRow {
    id: Uuid,
    user_id: Uuid,
    font_type: String,
    title_page: Json<StoryPage>,
    pages: Json<Vec<StoryPage>>,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Story {
            id: row.id,
            user_id: row.user_id,
            font_type: row.font_type,
            title_page: row.title_page.0,
            pages: row.pages.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct TemplateStoryRow {
    id: Uuid,
    story_type: String,
    title: String,
    page_descriptions: Vec<String>,
}

impl From<TemplateStoryRow> for TemplateStory {
    fn from(row: TemplateStoryRow) -> Self {
        TemplateStory {
            id: row.id,
            story_type: row.story_type,
            title: row.title,
            page_descriptions: row.page_descriptions,
        }
    }
}

#[async_trait]
impl StoryRepo for PgStoryRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Story>> {
        let rows = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT id, user_id, font_type, title_page, pages
            FROM stories
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Story::from).collect())
    }

    async fn find_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<Option<Story>> {
        let row = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT id, user_id, font_type, title_page, pages
            FROM stories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Story::from))
    }

    async fn create(&self, story: &Story) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stories (id, user_id, font_type, title_page, pages)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(story.id)
        .bind(story.user_id)
        .bind(&story.font_type)
        .bind(Json(&story.title_page))
        .bind(Json(&story.pages))
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn update(&self, story: &Story) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE stories
            SET font_type = $3, title_page = $4, pages = $5
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(story.id)
        .bind(story.user_id)
        .bind(&story.font_type)
        .bind(Json(&story.title_page))
        .bind(Json(&story.pages))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM stories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_templates(&self) -> RepoResult<Vec<TemplateStory>> {
        let rows = sqlx::query_as::<_, TemplateStoryRow>(
            r#"
            SELECT id, story_type, title, page_descriptions
            FROM template_stories
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TemplateStory::from).collect())
    }

    async fn create_template(&self, template: &TemplateStory) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO template_stories (id, story_type, title, page_descriptions)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(template.id)
        .bind(&template.story_type)
        .bind(&template.title)
        .bind(&template.page_descriptions)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }
}
