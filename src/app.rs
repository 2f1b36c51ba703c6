//! Application module: exposes the presentation model used by the TUI and
//! the runtime.

mod model;

pub use model::*;
