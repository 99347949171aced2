//! Wire models shared by the pipeline and callers

use serde::{Deserialize, Serialize};

/// Standard response body of the remote API.
///
/// Every field may be missing on the wire; missing flags read as `false` and
/// a missing count as `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResponseData<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    pub is_error: bool,
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_data: Option<T>,
}

impl<T> Default for ApiResponseData<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_error: false,
            is_success: false,
            message: None,
            total_count: 0,
            single_data: None,
        }
    }
}

impl<T> ApiResponseData<T> {
    /// Items of `data`, empty when absent.
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }
}

/// Body of the refresh call.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest<'a> {
    #[serde(rename = "RefreshToken")]
    pub refresh_token: &'a str,
}

/// Success body of the refresh call: `{"Data": {"JwtToken": ..., "Expiry": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenResponse {
    #[serde(rename = "Data")]
    pub data: RefreshTokenData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenData {
    #[serde(rename = "JwtToken")]
    pub jwt_token: String,
    #[serde(rename = "Expiry", default)]
    pub expiry: Option<String>,
}
