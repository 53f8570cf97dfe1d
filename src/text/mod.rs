//! Width-aware text utilities shared by every renderer.

pub mod extract;
pub mod width;

pub use extract::{THINKING_MARKER, TOOL_RESULT_MARKER, extract_text};
pub use width::{
    ELLIPSIS, char_width, measure_unit, string_width, truncate_to_width, truncate_to_width_strict,
};
