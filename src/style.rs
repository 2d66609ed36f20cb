//! Lyric style model and range resolution
//!
//! - `types`: style values as delivered with a lyric line
//! - `range`: inclusive character-index ranges
//! - `map`: sorted range → style mapping with overlap detection
//! - `resolver`: completion of partial overrides with a main style

mod color;
mod map;
mod range;
mod resolver;
mod types;

pub use color::{ParseColorError, Rgba};
pub use map::{StyleError, StyleMap};
pub use range::ClosedIndexRange;
pub use resolver::{resolve, resolve_line};
pub use types::{LyricLine, MaskLine, Shadow, Stroke, Style, StyleSpan};
