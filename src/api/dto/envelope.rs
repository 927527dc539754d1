/*
 * Responsibility
 * - 全 endpoint 共通の {"Message": [...]} 応答形
 * - 成功・失敗どちらも同じ形 (status code で区別)
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Message")]
    pub message: Vec<String>,
}

impl Envelope {
    pub fn new(message: Vec<String>) -> Self {
        Self { message }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()])
    }
}
