//! apiquery
//!
//! Data-access layer for REST back-ends that speak a typed filter dialect.
//! Two pieces do the real work:
//!
//! - the filter/query model in [`api::query`], where `#[derive(Filterable)]`
//!   turns any entity struct into its filter shape (operator sets per
//!   primitive, nested expressions, collection quantifiers, `and`/`or`);
//! - the authenticated request pipeline in [`api::client`], which injects
//!   the bearer credential, refreshes it once on a 401 and replays the call,
//!   and folds every outcome into [`ApiResult`].
//!
//! ```ignore
//! use apiquery::prelude::*;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Filterable)]
//! #[serde(rename_all = "camelCase")]
//! struct User {
//!     display_name: String,
//!     age: u32,
//!     active: bool,
//! }
//!
//! let filter = UserFilter {
//!     display_name: Some(StringFilter::default().starts_with("An")),
//!     age: Some(NumericFilter::default().gte(18)),
//!     ..Default::default()
//! };
//! let query: Query<User> = QueryEnvelope::builder()
//!     .page(0, 25)
//!     .order_by(UserField::DisplayName, SortDirection::Asc)
//!     .filter(ResponseFilter::default().with_data(CollectionFilter::some(filter)))
//!     .build();
//!
//! let users: Option<ApiResponseData<User>> = client.list("/users", &query, None).await?;
//! ```

// Lets the derive's `::apiquery::...` paths resolve inside this crate too.
extern crate self as apiquery;

pub mod api;
pub mod config;

pub use api::query;
pub use api::result::{ApiError, ApiErrorKind, ApiResult};
pub use apiquery_macros::Filterable;

/// Everything a caller needs to describe queries and issue requests.
pub mod prelude {
    pub use crate::Filterable;
    pub use crate::api::query::Filterable;
    pub use crate::api::auth::{AlertSink, CredentialProvider, SessionContext, SessionHandler};
    pub use crate::api::client::ApiClient;
    pub use crate::api::config::RequestConfig;
    pub use crate::api::models::ApiResponseData;
    pub use crate::api::query::{
        BooleanFilter, CollectionFilter, DateTimeFilter, DateTimeValue, Entity, EntityFilter,
        FilterNode, NumericFilter, OrderBy, OrderKey, Pagination, Query, QueryEnvelope,
        ResponseFilter, SortDirection, StringFilter,
    };
    pub use crate::api::result::{ApiError, ApiErrorKind, ApiResult};
    pub use serde::{Deserialize, Serialize};
}

#[doc(hidden)]
pub mod __private {
    pub use crate::api::query::{
        Entity, EntityFilter, FilterError, FilterNode, Filterable, OrderKey, field_path,
    };
    pub use serde;
}
