/*
 * Responsibility
 * - GET /api/TemplateStory/Stories (UserPolicy)
 * - POST /api/TemplateStory/Upload (AdminPolicy)
 */
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::api::dto::envelope::Envelope;
use crate::api::dto::stories::{TemplateStoriesDto, TemplateStoryDto, UploadTemplateStoryRequest};
use crate::api::extractors::{AdminAuth, UserAuth, ValidJson};
use crate::error::AppResult;
use crate::state::AppState;

pub async fn list_templates(
    State(state): State<AppState>,
    _auth: UserAuth,
) -> AppResult<Json<TemplateStoriesDto>> {
    let templates = state.stories.list_templates().await?;

    Ok(Json(TemplateStoriesDto {
        stories: templates.into_iter().map(TemplateStoryDto::from).collect(),
    }))
}

pub async fn upload_template(
    State(state): State<AppState>,
    _auth: AdminAuth,
    ValidJson(req): ValidJson<UploadTemplateStoryRequest>,
) -> AppResult<Json<Envelope>> {
    let template = req.into_template(Uuid::new_v4());
    state.stories.create_template(&template).await?;

    Ok(Json(Envelope::single("Successfully stored template story")))
}
