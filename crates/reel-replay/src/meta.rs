//! Human-readable rendering of payload metadata.

use crate::payload::ReplayMeta;

/// Format a millisecond duration as `"37s"` or `"2m 05s"`.
///
/// Rounds to the nearest second; an hour-long replay is out of scope
/// for the format, minutes just keep counting up.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ((ms as f64) / 1000.0).round() as u64;
    if total_secs < 60 {
        return format!("{total_secs}s");
    }
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}m {seconds:02}s")
}

/// One-line description of a replay for UI surfaces.
///
/// `None` means no replay has been captured yet. Zero counts are
/// omitted rather than printed as noise.
pub fn describe_meta(meta: Option<&ReplayMeta>) -> String {
    let Some(meta) = meta else {
        return "Replay not captured yet.".to_string();
    };

    let mut parts = vec![format_duration_ms(meta.duration_ms)];
    if meta.tick_count > 0 {
        parts.push(format!("{} ticks", meta.tick_count));
    }
    if meta.action_count > 0 {
        parts.push(format!("{} inputs", meta.action_count));
    }
    format!("Replay: {}", parts.join(" • "))
}
