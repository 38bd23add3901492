//! Duration parsing utilities.
//!
//! This module parses duration strings (e.g., "60s", "1m", "1.5") into
//! seconds for the time-valued experiment settings.

/// Parse duration string (e.g., "60s", "1m", "250ms", "1.5") to seconds
///
/// Supports various duration formats:
/// - Raw seconds: "60", "1.5"
/// - Milliseconds: "250ms", "250msec", "250millis"
/// - Seconds: "60s", "60sec", "60secs", "60second", "60seconds"
/// - Minutes: "1m", "1min", "1mins", "1minute", "1minutes"
/// - Hours: "1h", "1hr", "1hrs", "1hour", "1hours"
///
/// # Arguments
/// * `duration` - The duration string to parse
///
/// # Returns
/// * `Ok(f64)` - The duration in seconds if parsing succeeds
/// * `Err(String)` - An error message if parsing fails
///
/// # Examples
/// ```
/// use fanetsim::utils::duration::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("60"), Ok(60.0));
/// assert_eq!(parse_duration_to_seconds("1m"), Ok(60.0));
/// assert_eq!(parse_duration_to_seconds("500ms"), Ok(0.5));
/// assert!(parse_duration_to_seconds("invalid").is_err());
/// ```
pub fn parse_duration_to_seconds(duration: &str) -> Result<f64, String> {
    let duration = duration.trim();
    let number = extract_number_part(duration);
    let unit = duration[number.len()..].trim();

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid duration format: {}", duration))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Invalid duration format: {}", duration));
    }

    // Check longer suffixes before shorter ones
    let scale = match unit {
        "" => 1.0,
        "ms" | "msec" | "msecs" | "millis" => return Ok(value / 1000.0),
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        _ => return Err(format!("Invalid duration format: {}", duration)),
    };

    Ok(value * scale)
}

/// Extract the leading numeric part (digits and at most one decimal point)
fn extract_number_part(duration: &str) -> &str {
    let mut seen_dot = false;
    for (i, c) in duration.char_indices() {
        if c == '.' && !seen_dot {
            seen_dot = true;
            continue;
        }
        if !c.is_ascii_digit() {
            return &duration[0..i];
        }
    }
    duration // If all characters are digits
}
