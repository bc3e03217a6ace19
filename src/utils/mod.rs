use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

/// Group an unsigned digit string in threes: "1234567" → "1,234,567".
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Format a large integer with thousands separators.
pub fn fmt_number(n: i64) -> String {
    let grouped = group_thousands(&n.unsigned_abs().to_string());
    if n < 0 { format!("-{grouped}") } else { grouped }
}

/// Round to whole units and group: 394328.4 → "394,328", -1234.6 → "-1,235".
pub fn fmt_amount(v: f64) -> String {
    let digits = format!("{:.0}", v.abs());
    let grouped = group_thousands(&digits);
    if v < 0.0 && digits != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `fmt_amount`, or "N/A" for a missing value.
pub fn fmt_opt_amount(v: Option<f64>) -> String {
    v.map(fmt_amount).unwrap_or_else(|| "N/A".to_string())
}
