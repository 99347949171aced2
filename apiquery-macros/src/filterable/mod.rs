//! Implementation of the `#[derive(Filterable)]` macro.
//!
//! Maps an entity struct to its filter expression type and field enum.

mod attrs;
mod case;
mod classify;
mod derive;

pub use derive::filterable_derive_impl;
