/// `m:ss` countdown display
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Whole-number percentage of `part` in `total`, 0 for an empty total
pub fn percent(part: usize, total: usize) -> u16 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round().min(100.0) as u16
}
