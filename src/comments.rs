//! Comment threads: flat API records in, nested reply trees out.
//!
//! `build_tree` links replies under their parents and keeps every reply list
//! in chronological order. `sort_threads` then ranks only the top-level
//! threads according to the selected `SortPolicy`.

mod display;
mod model;
mod sort;
mod tree;

pub use display::*;
pub use model::*;
pub use sort::*;
pub use tree::*;
