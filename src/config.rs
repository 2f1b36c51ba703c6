//! Configuration loader and schema types.
//!
//! Every section is optional; a missing or partial file is filled in from
//! defaults.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
