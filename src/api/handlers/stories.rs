/*
 * Responsibility
 * - /api/Story/{Stories,Upload,Update,Delete} handler (UserPolicy)
 * - 全操作は呼び出し元 (AuthCtx.user_id) の story に限定する
 */
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::api::dto::envelope::Envelope;
use crate::api::dto::stories::{
    StoriesDto, StoryDto, StoryQuery, UpdateStoryRequest, UploadStoryRequest,
};
use crate::api::extractors::{UserAuth, ValidJson, ValidQuery};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn missing_story(id: Uuid) -> AppError {
    AppError::not_found(format!("User story doesn't exist: {id}"))
}

pub async fn list_stories(
    State(state): State<AppState>,
    auth: UserAuth,
) -> AppResult<Json<StoriesDto>> {
    let stories = state.stories.list_for_user(auth.ctx.user_id).await?;

    Ok(Json(StoriesDto {
        stories: stories.into_iter().map(StoryDto::from).collect(),
    }))
}

pub async fn upload_story(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidJson(req): ValidJson<UploadStoryRequest>,
) -> AppResult<Json<Envelope>> {
    let story = req.into_story(Uuid::new_v4(), auth.ctx.user_id);
    state.stories.create(&story).await?;

    tracing::debug!(story_id = %story.id, user_id = %story.user_id, "story stored");
    Ok(Json(Envelope::single("Successfully stored user story")))
}

pub async fn update_story(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidJson(req): ValidJson<UpdateStoryRequest>,
) -> AppResult<Json<Envelope>> {
    let story = req.into_story(auth.ctx.user_id);

    if !state.stories.update(&story).await? {
        return Err(missing_story(story.id));
    }

    Ok(Json(Envelope::single("Successfully stored updated user story")))
}

pub async fn delete_story(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidQuery(query): ValidQuery<StoryQuery>,
) -> AppResult<Json<Envelope>> {
    let story_id = query.story_id.unwrap_or_default();

    if !state
        .stories
        .delete_for_user(story_id, auth.ctx.user_id)
        .await?
    {
        return Err(missing_story(story_id));
    }

    Ok(Json(Envelope::single("Successfully deleted user story")))
}
