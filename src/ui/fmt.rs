//! Text formatting for chart labels and the time axis.
//!
//! All pure formatting functions (no terminal output) live here.

use chrono::Timelike;

use crate::sampling::TimePoint;

/// Binary unit labels, largest first, keyed by their power-of-two exponent.
const UNITS: [(u32, &str); 7] = [
    (60, "Eb"),
    (50, "Pb"),
    (40, "Tb"),
    (30, "Gb"),
    (20, "Mb"),
    (10, "Kb"),
    (0, "b"),
];

// ---------------------------------------------------------------------------
// Byte rates
// ---------------------------------------------------------------------------

/// Format a byte count per `time_unit` as `"<value> <unit>/<time_unit>"`.
///
/// The unit is the largest binary unit whose integer part is non-zero. The
/// next 10 bits below that unit are appended as a base-1000 fraction and the
/// result is truncated, never rounded: `"12.3"`, `"123"`, `"1023"`, `"2.02"`.
/// The numeric part is right-aligned to four columns.
///
/// ```
/// use ifbar::ui::fmt::format_num_byte_rate;
/// assert_eq!(format_num_byte_rate(0, "s"), "   0 b/s");
/// assert_eq!(format_num_byte_rate(1024, "s"), "   1 Kb/s");
/// ```
pub fn format_num_byte_rate(num: u64, time_unit: &str) -> String {
    let mut int_part = 0;
    let mut dec_part = 0;
    let mut unit = "b";

    for (exponent, label) in UNITS {
        let val = num >> exponent;
        if val > 0 {
            int_part = val;
            unit = label;
            if exponent >= 10 {
                dec_part = (num >> (exponent - 10)) - (val << 10);
            }
            break;
        }
    }

    let number = if dec_part == 0 {
        int_part.to_string()
    } else {
        let reconstructed = int_part as f64 + dec_part as f64 / 1000.0;
        let formatted = format!("{:.3}", reconstructed);
        let keep = if (100.0..1000.0).contains(&reconstructed) {
            3
        } else {
            4
        };
        formatted.chars().take(keep).collect()
    };

    format!("{:>4} {}/{}", number, unit, time_unit)
}

// ---------------------------------------------------------------------------
// Time axis
// ---------------------------------------------------------------------------

/// Seconds of the minute as two zero-padded digits.
pub fn format_ss(tp: TimePoint) -> String {
    format!("{:02}", tp.second())
}

/// Build a seconds ruler with one character cell per timestamp.
///
/// Every timestamp whose seconds-of-minute is divisible by 4 prints its
/// two-digit seconds, which also consumes the following cell. A tick is only
/// printed when that following cell exists.
pub fn format_xaxis(points: &[TimePoint]) -> String {
    let mut axis = String::with_capacity(points.len());
    let mut chars_to_skip = 0;

    for (i, tp) in points.iter().enumerate() {
        if chars_to_skip > 0 {
            chars_to_skip -= 1;
            continue;
        }

        let cells_after = points.len() - 1 - i;
        if tp.second() % 4 == 0 && cells_after >= 1 {
            axis.push_str(&format_ss(*tp));
            chars_to_skip = 1;
        } else {
            axis.push(' ');
        }
    }

    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeDelta, TimeZone};

    fn at(minute: u32, second: u32) -> TimePoint {
        Local.with_ymd_and_hms(2024, 1, 15, 12, minute, second).unwrap()
    }

    fn per_second(first: TimePoint, count: i64) -> Vec<TimePoint> {
        (0..count).map(|i| first + TimeDelta::seconds(i)).collect()
    }

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_num_byte_rate(0, "s"), "   0 b/s");
    }

    #[test]
    fn test_plain_bytes() {
        assert_eq!(format_num_byte_rate(512, "s"), " 512 b/s");
        assert_eq!(format_num_byte_rate(1023, "s"), "1023 b/s");
    }

    #[test]
    fn test_exact_kilobyte() {
        assert_eq!(format_num_byte_rate(1024, "s"), "   1 Kb/s");
    }

    #[test]
    fn test_two_digit_value_keeps_one_decimal() {
        // 12 Kb plus 345 of the next 1024ths -> 12.345 -> 12.3
        let num = (12 << 10) + 345;
        assert_eq!(format_num_byte_rate(num, "s"), "12.3 Kb/s");
    }

    #[test]
    fn test_three_digit_value_drops_decimals() {
        let num = (123 << 20) + (456 << 10);
        assert_eq!(format_num_byte_rate(num, "s"), " 123 Mb/s");
    }

    #[test]
    fn test_four_digit_value_drops_decimals() {
        let num = (1023 << 10) + 450;
        assert_eq!(format_num_byte_rate(num, "s"), "1023 Kb/s");
    }

    #[test]
    fn test_single_digit_value_keeps_two_decimals() {
        let num = (2 << 30) + (23 << 20);
        assert_eq!(format_num_byte_rate(num, "s"), "2.02 Gb/s");
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // 9.999 must not become 10.0
        let num = (9 << 10) + 999;
        assert_eq!(format_num_byte_rate(num, "s"), "9.99 Kb/s");
    }

    #[test]
    fn test_time_unit_label() {
        assert_eq!(format_num_byte_rate(2048, "min"), "   2 Kb/min");
    }

    #[test]
    fn test_largest_unit() {
        // 15 Eb plus 1023/1000 of a fraction reconstructs to 16.023
        assert_eq!(format_num_byte_rate(u64::MAX, "s"), "16.0 Eb/s");
    }

    #[test]
    fn test_format_ss() {
        assert_eq!(format_ss(at(3, 7)), "07");
        assert_eq!(format_ss(at(3, 48)), "48");
    }

    #[test]
    fn test_axis_ticks_every_four_seconds() {
        let axis = format_xaxis(&per_second(at(0, 8), 8));
        assert_eq!(axis, "08  12  ");
    }

    #[test]
    fn test_axis_unaligned_start() {
        let axis = format_xaxis(&per_second(at(0, 6), 7));
        // ticks at :08 (index 2) and :12 (index 6 has no room)
        assert_eq!(axis, "  08   ");
        assert_eq!(axis.chars().count(), 7);
    }

    #[test]
    fn test_axis_tick_needs_trailing_cell() {
        assert_eq!(format_xaxis(&per_second(at(0, 4), 1)), " ");
        assert_eq!(format_xaxis(&per_second(at(0, 4), 2)), "04");
    }

    #[test]
    fn test_axis_wraps_minute() {
        let axis = format_xaxis(&per_second(at(0, 58), 4));
        assert_eq!(axis, "  00");
    }

    #[test]
    fn test_axis_empty() {
        assert_eq!(format_xaxis(&[]), "");
    }
}
