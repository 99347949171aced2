//! Remote API access
//!
//! The request pipeline, its transport seam, the refresh protocol and the
//! typed query model that listing calls carry.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod models;
pub mod query;
pub mod result;
pub mod transport;

pub use auth::{
    AlertSink, CredentialProvider, Credentials, MemorySession, RefreshCoordinator, RefreshMode,
    SessionContext, SessionHandler,
};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::RequestConfig;
pub use models::ApiResponseData;
pub use query::{
    BooleanFilter, CollectionFilter, DateTimeFilter, DateTimeValue, Entity, EntityFilter,
    FilterError, FilterNode, Filterable, NumericFilter, OrderBy, OrderKey, Pagination, Query,
    QueryBuilder, QueryEnvelope, ResponseFilter, SortDirection, StringFilter,
};
pub use result::{ApiError, ApiErrorKind, ApiResult};
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
