//! Chart rendering and keyboard input.
//!
//! - `fmt` - byte-rate and time-axis text
//! - `bar_chart` - frame layout from a history slice
//! - `input` - key decoding for the driver loop

pub mod bar_chart;
pub mod fmt;
pub mod input;

pub use bar_chart::{BarChart, FILL_CHAR, RESERVED_ROWS, bar_height, draw_legend};
pub use input::{KeyAction, handle_key, read_keys};
