/*
 * Responsibility
 * - /api/File/{Exists,Upload,Delete,Download} handler (UserPolicy)
 * - Base64 <-> bytes の変換と object store (BlobStore) 呼び出し
 * - 拡張子は strip_file_extension で正規化し、key は "{ext}/{id}"
 */
use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::api::dto::envelope::Envelope;
use crate::api::dto::files::{FileQuery, UploadFileRequest};
use crate::api::extractors::{UserAuth, ValidJson, ValidQuery};
use crate::error::{AppError, AppResult};
use crate::services::blob::{BlobError, blob_key, blob_key_for, strip_file_extension};
use crate::state::AppState;

fn key_of(query: &FileQuery) -> String {
    blob_key(strip_file_extension(query.file_extension()), query.file_id())
}

pub async fn file_exists(
    State(state): State<AppState>,
    _auth: UserAuth,
    ValidQuery(query): ValidQuery<FileQuery>,
) -> AppResult<Json<Envelope>> {
    let key = key_of(&query);

    let found = match state.blobs.exists(&key).await {
        Ok(found) => found,
        Err(BlobError::InvalidKey(_)) => false,
        Err(e) => return Err(AppError::internal(e)),
    };

    if !found {
        return Err(AppError::not_found(format!(
            "File: {} was not found",
            query.file_id()
        )));
    }

    Ok(Json(Envelope::single(format!(
        "File: {} exists",
        query.file_id()
    ))))
}

pub async fn upload_file(
    State(state): State<AppState>,
    _auth: UserAuth,
    ValidJson(req): ValidJson<UploadFileRequest>,
) -> AppResult<Json<Envelope>> {
    let data = match STANDARD.decode(req.encoded_data.as_deref().unwrap_or_default()) {
        Ok(data) if !data.is_empty() => data,
        _ => return Err(AppError::business("Failed to parse encoded file data")),
    };

    let id = Uuid::new_v4();
    let extension = strip_file_extension(req.file_extension.as_deref().unwrap_or_default());
    let key = blob_key_for(extension, id);

    if let Err(e) = state.blobs.put(&key, data).await {
        tracing::error!(error = %e, key = %key, backend = state.blobs.backend_name(), "blob upload failed");
        return Err(AppError::business(format!(
            "File: {id} failed upload to storage"
        )));
    }

    Ok(Json(Envelope::new(vec![
        format!("File: {id} uploaded to storage"),
        id.to_string(),
        extension.to_string(),
    ])))
}

pub async fn delete_file(
    State(state): State<AppState>,
    _auth: UserAuth,
    ValidQuery(query): ValidQuery<FileQuery>,
) -> AppResult<Json<Envelope>> {
    let key = key_of(&query);

    if let Err(e) = state.blobs.delete(&key).await {
        tracing::debug!(error = %e, key = %key, "blob delete failed");
        return Err(AppError::business(format!(
            "File: {key} failed to delete from storage"
        )));
    }

    Ok(Json(Envelope::single(format!(
        "File: {key} deleted from storage"
    ))))
}

/// Responds with the object's bytes as a plain Base64 string.
pub async fn download_file(
    State(state): State<AppState>,
    _auth: UserAuth,
    ValidQuery(query): ValidQuery<FileQuery>,
) -> AppResult<Response> {
    let key = key_of(&query);

    let data = match state.blobs.get(&key).await {
        Ok(data) => data,
        Err(BlobError::NotFound(_) | BlobError::InvalidKey(_)) => {
            return Err(AppError::business(format!(
                "Failed to download file: {key}, does NOT exist"
            )));
        }
        Err(e) => return Err(AppError::internal(e)),
    };

    if data.is_empty() {
        return Err(AppError::business("Failed to encode file data as Base64"));
    }

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        STANDARD.encode(data),
    )
        .into_response())
}
