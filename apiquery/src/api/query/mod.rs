//! Typed filter and query model
//!
//! Entities derive their filter shape with `#[derive(Filterable)]`; the
//! envelope types here combine that shape with ordering and pagination into
//! the payload a listing call sends: reusable values (`QueryEnvelope`) plus
//! a fluent builder (`QueryBuilder`).

pub mod builder;
pub mod collection;
pub mod envelope;
pub mod error;
pub mod filterable;
pub mod filters;
pub mod orderby;
pub mod response;

pub use builder::QueryBuilder;
pub use collection::CollectionFilter;
pub use envelope::{Pagination, Query, QueryEnvelope};
pub use error::FilterError;
pub use filterable::{Comparable, Entity, EntityFilter, FilterNode, Filterable, field_path};
pub use filters::{
    BooleanFilter, ComparableFilter, DateTimeFilter, DateTimeValue, NumericFilter, StringFilter,
};
pub use orderby::{OrderBy, OrderKey, SortDirection};
pub use response::ResponseFilter;
