//! CLI theme and styling.

use colored::Colorize;
use honeytrap_audit::ThreatLevel;
use honeytrap_monitor::HealthState;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("  {:<20} {}", format!("{key}:").bold(), value)
    }

    /// Format the security state.
    pub(crate) fn threat_level(level: ThreatLevel) -> String {
        match level {
            ThreatLevel::Safe => "SAFE".green().bold().to_string(),
            ThreatLevel::UnderAttack => "UNDER_ATTACK".red().bold().to_string(),
        }
    }

    /// Format the supervisor health.
    pub(crate) fn health(state: HealthState) -> String {
        let label = state.to_string();
        match state {
            HealthState::Healthy => label.green().to_string(),
            HealthState::Degraded => label.yellow().to_string(),
            HealthState::Unhealthy => label.red().to_string(),
            HealthState::Stopped => label.dimmed().to_string(),
        }
    }

    /// Format a timestamp.
    pub(crate) fn timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
        dt.format("%Y-%m-%d %H:%M:%S").to_string().dimmed().to_string()
    }

    /// Format a duration in seconds as `1h 2m 3s`.
    pub(crate) fn uptime(secs: u64) -> String {
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{h}h {m}m {s}s")
        } else if m > 0 {
            format!("{m}m {s}s")
        } else {
            format!("{s}s")
        }
    }
}

/// Print the startup banner.
pub(crate) fn print_banner() {
    println!("{}", Theme::header("honeytrap :: decoy file monitor"));
    println!("{}", Theme::separator());
}
