//! Human-readable byte sizes for progress output

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Render a byte count as `"<n> <unit>"`.
///
/// Divides by 1024 while the value is above 1000, so values just over the
/// threshold round down to `0` of the next unit.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes;
    let mut unit = 0;
    while unit + 1 < UNITS.len() && size > 1000 {
        size /= 1024;
        unit += 1;
    }
    format!("{} {}", size, UNITS[unit])
}
