//! Record renderers
//!
//! - [`text`]: human-readable `key=value` lines with optional color
//! - [`json`]: one JSON object per line

pub mod escape;
pub mod json;
pub mod text;

pub use json::{render_json, to_json_map};
pub use text::{flatten, render_text};
