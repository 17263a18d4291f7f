//! Shared building blocks used across feature slices and overlays.

mod text;
mod text_field;

pub use text::{sanitize_for_display, truncate_start_with_ellipsis, truncate_with_ellipsis};
pub use text_field::TextField;
