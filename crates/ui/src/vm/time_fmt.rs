/// Countdown label as `mm:ss`. Minutes are not wrapped into hours.
#[must_use]
pub fn format_countdown(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes:02}:{remainder:02}")
}
