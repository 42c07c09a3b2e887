//! ifbar - live bandwidth bar chart for one network interface.
//!
//! The library holds everything the `ifbar` binary needs:
//! - `sampling` - counter sources, detection and the per-tick history
//! - `term` - terminal state guards, window size and the drawing surface
//! - `ui` - chart layout, number formatting and key decoding
//! - `app` - the driver loop tying them together

pub mod app;
pub mod interrupt;
pub mod sampling;
pub mod term;
pub mod ui;
