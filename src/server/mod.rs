//! HTTP adapters for axum routes
//!
//! Routes install their `QueryConfig` as an extension and take the compiled
//! query through [`ValidatedListQuery`] or [`ValidatedRetrieveQuery`].

pub mod extractor;

pub use extractor::{ValidatedListQuery, ValidatedRetrieveQuery};
