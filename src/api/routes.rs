/*
 * Responsibility
 * - URL 構造を定義 (/api 配下を nest)
 * - policy は route ではなく handler の extractor (UserAuth / AdminAuth) で表現する
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::handlers::{
    admin::{assign_claim, assign_role},
    auth::{login, register_user},
    files::{delete_file, download_file, file_exists, upload_file},
    setup::initialize,
    stories::{delete_story, list_stories, update_story, upload_story},
    template_stories::{list_templates, upload_template},
    users::fetch_user,
};
use crate::state::AppState;

fn api() -> Router<AppState> {
    Router::new()
        .route("/Auth/Login", post(login))
        .route("/Auth/RegisterUser", post(register_user))
        .route("/internal/Setup/Initialize", post(initialize))
        .route("/User/FetchUser", post(fetch_user))
        .route("/Story/Stories", get(list_stories))
        .route("/Story/Upload", post(upload_story))
        .route("/Story/Update", post(update_story))
        .route("/Story/Delete", delete(delete_story))
        .route("/TemplateStory/Stories", get(list_templates))
        .route("/TemplateStory/Upload", post(upload_template))
        .route("/File/Exists", get(file_exists))
        .route("/File/Upload", post(upload_file))
        .route("/File/Delete", delete(delete_file))
        .route("/File/Download", get(download_file))
        .route("/Admin/AssignRole", post(assign_role))
        .route("/Admin/AssignClaim", post(assign_claim))
}

pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api())
}
