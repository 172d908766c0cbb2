//! Economic calendar.
//!
//! A hand-maintained indicator set from configuration. No upstream call; the
//! endpoint serves whatever the config carries, in order.

use serde::Serialize;

use crate::config::CalendarConfig;

/// One indicator as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorView {
    /// Stable key.
    pub key: String,
    /// Display label.
    pub name: String,
    /// Current value, preformatted.
    pub current: String,
    /// Previous value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Release or next-meeting date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_release: Option<String>,
    /// Display icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Build the calendar view from configuration.
#[must_use]
pub fn indicator_views(config: &CalendarConfig) -> Vec<IndicatorView> {
    config
        .entries
        .iter()
        .map(|entry| IndicatorView {
            key: entry.key.clone(),
            name: entry.label.clone(),
            current: entry.value.clone(),
            previous: entry.previous.clone(),
            next_release: entry.date.clone(),
            icon: entry.icon.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calendar_has_four_indicators() {
        let views = indicator_views(&CalendarConfig::default());
        assert_eq!(views.len(), 4);
        assert_eq!(views[0].key, "fed_rate");
        assert!(views.iter().any(|v| v.key == "inflation"));
    }
}
