/*
 * Responsibility
 * - File endpoint の request DTO (body / query)
 */
use serde::Deserialize;

use crate::services::validation::{Validate, Validator};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadFileRequest {
    #[serde(alias = "fileExtension")]
    pub file_extension: Option<String>,
    #[serde(alias = "encodedData")]
    pub encoded_data: Option<String>,
}

impl Validate for UploadFileRequest {
    fn validate(&self, v: &mut Validator) {
        v.field("FileExtension", self.file_extension.as_deref())
            .required();
        v.field("EncodedData", self.encoded_data.as_deref())
            .required()
            .base64();
    }
}

/// `?fileId=..&fileExtension=..`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    #[serde(alias = "FileId")]
    pub file_id: Option<String>,
    #[serde(alias = "FileExtension")]
    pub file_extension: Option<String>,
}

impl Validate for FileQuery {
    fn validate(&self, v: &mut Validator) {
        v.field("fileId", self.file_id.as_deref()).required();
        v.field("fileExtension", self.file_extension.as_deref())
            .required();
    }
}

impl FileQuery {
    pub fn file_id(&self) -> &str {
        self.file_id.as_deref().unwrap_or_default()
    }

    pub fn file_extension(&self) -> &str {
        self.file_extension.as_deref().unwrap_or_default()
    }
}
