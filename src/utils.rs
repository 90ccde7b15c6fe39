//! Utility functions for path handling and number display.

use std::path::PathBuf;

/// Joins a directory path with a file or subdirectory name.
///
/// # Arguments
///
/// * `dir_path` - The base directory path
/// * `subdir_path` - The subdirectory or file name to append
///
/// # Examples
///
/// ```
/// # use wynnbot::utils::get_path;
/// let path = get_path("/home/user", "session");
/// assert_eq!(path, "/home/user/session");
/// ```
pub fn get_path(dir_path: &str, subdir_path: &str) -> String {
    let path_buf: PathBuf = [dir_path, subdir_path].iter().collect();
    path_buf.to_string_lossy().into_owned()
}

const UNITS: [&str; 4] = ["k", "M", "B", "T"];

/// Shortens a large number to at most three significant digits.
///
/// Digits are truncated, never rounded up, so a guild one XP short of a
/// million does not show `1.00M`.
///
/// # Examples
///
/// ```
/// # use wynnbot::utils::truncate_number;
/// assert_eq!(truncate_number(999), "999");
/// assert_eq!(truncate_number(1_234), "1.23k");
/// assert_eq!(truncate_number(45_678_000), "45.6M");
/// ```
pub fn truncate_number(value: u64) -> String {
    if value < 1000 {
        return value.to_string();
    }

    let mut divisor: u64 = 1000;
    let mut unit = 0;
    while unit + 1 < UNITS.len() && value / divisor >= 1000 {
        divisor *= 1000;
        unit += 1;
    }

    let whole = value / divisor;
    let decimals = match whole {
        0..=9 => 2,
        10..=99 => 1,
        _ => 0,
    };
    if decimals == 0 {
        return format!("{}{}", whole, UNITS[unit]);
    }

    let fraction = (value % divisor) * 10u64.pow(decimals) / divisor;
    format!(
        "{}.{:0width$}{}",
        whole,
        fraction,
        UNITS[unit],
        width = decimals as usize
    )
}
