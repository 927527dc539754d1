use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::stories::store::{Story, StoryRepo, TemplateStory};

/// Process-local story store, insertion ordered.
#[derive(Default)]
pub struct MemoryStoryRepo {
    stories: RwLock<Vec<Story>>,
    templates: RwLock<Vec<TemplateStory>>,
}

impl MemoryStoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoryRepo for MemoryStoryRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Story>> {
        let stories = self.stories.read().await;
        Ok(stories
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<Option<Story>> {
        let stories = self.stories.read().await;
        Ok(stories
            .iter()
            .find(|s| s.id == story_id && s.user_id == user_id)
            .cloned())
    }

    async fn create(&self, story: &Story) -> RepoResult<()> {
        let mut stories = self.stories.write().await;
        if stories.iter().any(|s| s.id == story.id) {
            return Err(RepoError::Conflict);
        }
        stories.push(story.clone());
        Ok(())
    }

    async fn update(&self, story: &Story) -> RepoResult<bool> {
        let mut stories = self.stories.write().await;
        match stories
            .iter_mut()
            .find(|s| s.id == story.id && s.user_id == story.user_id)
        {
            Some(existing) => {
                *existing = story.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_for_user(&self, story_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut stories = self.stories.write().await;
        let before = stories.len();
        stories.retain(|s| !(s.id == story_id && s.user_id == user_id));
        Ok(stories.len() < before)
    }

    async fn list_templates(&self) -> RepoResult<Vec<TemplateStory>> {
        Ok(self.templates.read().await.clone())
    }

    async fn create_template(&self, template: &TemplateStory) -> RepoResult<()> {
        let mut templates = self.templates.write().await;
        if templates.iter().any(|t| t.id == template.id) {
            return Err(RepoError::Conflict);
        }
        templates.push(template.clone());
        Ok(())
    }
}
