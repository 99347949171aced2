//! Fixed values of the remote API contract

/// Prefix of the `Authorization` header value.
pub const TOKEN_TYPE: &str = "Bearer ";

/// Path prepended to every sub-path when no other prefix is configured.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Refresh endpoint, relative to the base path.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh-token";

/// Statuses that trigger the refresh protocol.
pub const UNAUTHORIZED_CODES: &[u16] = &[401];

/// Statuses that raise the not-authorized alert.
pub const FORBIDDEN_CODES: &[u16] = &[403];

/// The only status the refresh endpoint answers with on success.
pub const REFRESH_SUCCESS_STATUS: u16 = 200;

pub const ALERT_TITLE: &str = "Error";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
pub const NOT_AUTHORIZED_MESSAGE: &str = "You are not authorized to perform this action.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";
