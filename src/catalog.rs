//! Catalog provider backed by the iTunes Search API.
//!
//! Fetches an artist's albums and songs and an album's track list. Failures
//! are returned as [`CatalogError`] for the presentation layer to render; the
//! playback engine never sees them.

mod client;
mod error;
mod model;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use model::*;

#[cfg(test)]
mod tests;
