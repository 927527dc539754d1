/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - credentials / stories / blobs の各 store と TokenService
 * - Clone 前提で持つ (内部は Arc で Clone cheap)
 */
use std::sync::Arc;

use crate::repos::credentials::CredentialStore;
use crate::repos::stories::StoryRepo;
use crate::services::auth::TokenService;
use crate::services::blob::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub stories: Arc<dyn StoryRepo>,
    pub blobs: Arc<dyn BlobStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        stories: Arc<dyn StoryRepo>,
        blobs: Arc<dyn BlobStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            credentials,
            stories,
            blobs,
            tokens,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("credentials", &self.credentials.backend_name())
            .field("stories", &self.stories.backend_name())
            .field("blobs", &self.blobs.backend_name())
            .field("tokens", &self.tokens)
            .finish()
    }
}
