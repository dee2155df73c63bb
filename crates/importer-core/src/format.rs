//! Display formatting shared by the view models and the CLI.

use crate::types::ImportStatus;

/// Format a number of seconds the way the progress and job views show it.
///
/// `45 -> "45s"`, `125 -> "2m 5s"`, `3725 -> "1h 2m"`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Group digits with commas: `1234567 -> "1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Success-rate text: `"0"` for an empty import, otherwise one decimal.
pub fn format_rate(rate: f64, total: u64) -> String {
    if total == 0 {
        "0".to_string()
    } else {
        format!("{rate:.1}")
    }
}

/// Colour family a front end should use for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTone {
    Neutral,
    Primary,
    Success,
    Warning,
    Danger,
}

impl StatusTone {
    /// Tone for an import status badge.
    pub fn for_status(status: ImportStatus) -> Self {
        match status {
            ImportStatus::Pending => Self::Neutral,
            ImportStatus::Processing => Self::Primary,
            ImportStatus::Completed => Self::Success,
            ImportStatus::Failed => Self::Danger,
        }
    }

    /// Tone for a success-rate badge.
    pub fn for_success_rate(rate: f64) -> Self {
        if rate > 90.0 {
            Self::Success
        } else if rate > 70.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    /// Tone for a recorded webhook response code.
    pub fn for_response_code(code: u16) -> Self {
        if code < 300 { Self::Success } else { Self::Danger }
    }

    /// Short label, used as the terminal colour key by the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Neutral => "secondary",
            Self::Primary => "primary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_bands() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3599), "59m 59s");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(3725), "1h 2m");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("processing"), "Processing");
        assert_eq!(title_case("failed"), "Failed");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0, 0), "0");
        assert_eq!(format_rate(95.0, 200), "95.0");
        assert_eq!(format_rate(33.333, 3), "33.3");
    }

    #[test]
    fn test_tones() {
        assert_eq!(StatusTone::for_status(ImportStatus::Processing), StatusTone::Primary);
        assert_eq!(StatusTone::for_status(ImportStatus::Failed), StatusTone::Danger);
        assert_eq!(StatusTone::for_success_rate(95.0), StatusTone::Success);
        assert_eq!(StatusTone::for_success_rate(90.0), StatusTone::Warning);
        assert_eq!(StatusTone::for_success_rate(70.0), StatusTone::Danger);
        assert_eq!(StatusTone::for_response_code(204), StatusTone::Success);
        assert_eq!(StatusTone::for_response_code(500), StatusTone::Danger);
    }
}
