//! Economic calendar configuration.
//!
//! The calendar is a static indicator set maintained by hand; entries are
//! served as-is, no upstream call is made.

use serde::{Deserialize, Serialize};

/// Economic calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar entries, in display order.
    #[serde(default = "default_entries")]
    pub entries: Vec<CalendarEntry>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            entries: default_entries(),
        }
    }
}

/// A single economic indicator shown on the market page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Stable key (`fed_rate`, `inflation`, ...).
    pub key: String,
    /// Display label.
    pub label: String,
    /// Current value, preformatted ("4.50%", "256K").
    pub value: String,
    /// Previous value, if meaningful.
    #[serde(default)]
    pub previous: Option<String>,
    /// Release or next-meeting date (ISO 8601 date).
    #[serde(default)]
    pub date: Option<String>,
    /// Display icon.
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_entries() -> Vec<CalendarEntry> {
    vec![
        CalendarEntry {
            key: "fed_rate".to_string(),
            label: "FED Interest Rate".to_string(),
            value: "4.50%".to_string(),
            previous: None,
            date: Some("2025-03-19".to_string()),
            icon: Some("🏦".to_string()),
        },
        CalendarEntry {
            key: "nonfarm_payroll".to_string(),
            label: "Nonfarm Payrolls".to_string(),
            value: "256K".to_string(),
            previous: Some("227K".to_string()),
            date: Some("2025-02-07".to_string()),
            icon: Some("👷".to_string()),
        },
        CalendarEntry {
            key: "unemployment".to_string(),
            label: "Unemployment Rate".to_string(),
            value: "4.1%".to_string(),
            previous: Some("4.2%".to_string()),
            date: Some("2025-02-07".to_string()),
            icon: Some("📉".to_string()),
        },
        CalendarEntry {
            key: "inflation".to_string(),
            label: "Inflation (CPI)".to_string(),
            value: "2.9%".to_string(),
            previous: Some("2.7%".to_string()),
            date: Some("2025-02-12".to_string()),
            icon: Some("📈".to_string()),
        },
    ]
}
