//! Right-anchored vertical bar chart with legend and time axis.

use std::io::Write;

use crate::sampling::TimePoint;
use crate::term::{TerminalControl, TerminalError, TerminalSurface};

use super::fmt::{format_num_byte_rate, format_xaxis};

/// Character used to fill a bar cell.
pub const FILL_CHAR: char = '█';

/// Rows that are not chart rows: title, legend and time axis.
pub const RESERVED_ROWS: u16 = 3;

/// Bar height in cells for `value` scaled against `max` over `height` rows.
///
/// Rounds up, so any non-zero value gets at least one cell.
pub fn bar_height(value: u64, max: u64, height: usize) -> usize {
    if value == 0 || max == 0 || height == 0 {
        return 0;
    }
    let cells = (value as u128 * height as u128).div_ceil(max as u128);
    cells.min(height as u128) as usize
}

/// Legend line with average, maximum and most recent rate.
pub fn draw_legend(avg: u64, max: u64, last: u64) -> String {
    format!(
        "avg {}  max {}  last {}",
        format_num_byte_rate(avg, "s"),
        format_num_byte_rate(max, "s"),
        format_num_byte_rate(last, "s")
    )
}

/// Chart for a single interface. Holds no history of its own.
#[derive(Debug, Clone)]
pub struct BarChart {
    interface: String,
}

impl BarChart {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Builds the frame for `values` (oldest first) with `times` aligned to
    /// them. Only the newest `width` values are shown; fewer values leave the
    /// left side blank.
    pub fn render(
        &self,
        label: &str,
        values: &[u64],
        times: &[TimePoint],
        width: usize,
        height: usize,
    ) -> Vec<String> {
        let visible = &values[values.len().saturating_sub(width)..];
        let visible_times = &times[times.len().saturating_sub(visible.len())..];
        let pad = " ".repeat(width - visible.len());

        let max = visible.iter().copied().max().unwrap_or(0);
        let last = visible.last().copied().unwrap_or(0);
        let avg = if visible.is_empty() {
            0
        } else {
            let sum: u128 = visible.iter().map(|&v| v as u128).sum();
            (sum / visible.len() as u128) as u64
        };

        let mut lines = Vec::with_capacity(height + RESERVED_ROWS as usize);
        lines.push(clip(
            format!(
                "{} {}  [r] received  [t] transmitted  [^C] quit",
                self.interface, label
            ),
            width,
        ));
        lines.push(clip(draw_legend(avg, max, last), width));

        let heights: Vec<usize> = visible.iter().map(|&v| bar_height(v, max, height)).collect();
        for row in (1..=height).rev() {
            let mut line = pad.clone();
            line.extend(
                heights
                    .iter()
                    .map(|&h| if h >= row { FILL_CHAR } else { ' ' }),
            );
            lines.push(line);
        }

        lines.push(format!("{}{}", pad, format_xaxis(visible_times)));
        lines
    }

    /// Renders `values` into the surface, bounded by its current size.
    pub fn draw_bars_from_right<C: TerminalControl, W: Write>(
        &self,
        surface: &mut TerminalSurface<'_, C, W>,
        label: &str,
        values: &[u64],
        times: &[TimePoint],
    ) -> Result<(), TerminalError> {
        let width = surface.width()?;
        let height = surface.height()?;
        surface.draw(self.render(label, values, times, width, height))
    }
}

fn clip(line: String, width: usize) -> String {
    if line.chars().count() <= width {
        line
    } else {
        line.chars().take(width).collect()
    }
}
