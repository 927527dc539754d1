use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPage {
    pub image_id: Uuid,
    pub image_extension: String,
    pub description: String,
}

/// A story owned by exactly one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub font_type: String,
    pub title_page: StoryPage,
    pub pages: Vec<StoryPage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStory {
    pub id: Uuid,
    pub story_type: String,
    pub title: String,
    pub page_descriptions: Vec<String>,
}

/// Story persistence. Every user-facing operation is scoped by owner id.
#[async_trait]
pub trait StoryRepo: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Story>>;

    async fn find_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<Option<Story>>;

    async fn create(&self, story: &Story) -> RepoResult<()>;

    /// Replaces the stored story. Returns `false` when no story with that id belongs
    /// to `story.user_id`.
    async fn update(&self, story: &Story) -> RepoResult<bool>;

    async fn delete_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    async fn list_templates(&self) -> RepoResult<Vec<TemplateStory>>;

    async fn create_template(&self, template: &TemplateStory) -> RepoResult<()>;
}
