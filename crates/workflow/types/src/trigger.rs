//! Triggers: what starts a workflow
//!
//! A trigger is either a schedule, a named application event, or a manual
//! button. Each sub-type carries its own configuration record.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Trigger sub-type tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Time,
    Event,
    Manual,
}

/// Trigger configuration, discriminated by `triggerType`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "triggerType", content = "config", rename_all = "lowercase")]
pub enum TriggerConfig {
    Time(TimeTriggerConfig),
    Event(EventTriggerConfig),
    Manual(ManualTriggerConfig),
}

impl TriggerConfig {
    /// Default configuration for a trigger sub-type
    pub fn for_type(trigger_type: TriggerType) -> Self {
        match trigger_type {
            TriggerType::Time => Self::Time(TimeTriggerConfig::default()),
            TriggerType::Event => Self::Event(EventTriggerConfig::default()),
            TriggerType::Manual => Self::Manual(ManualTriggerConfig::default()),
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::Time(_) => TriggerType::Time,
            Self::Event(_) => TriggerType::Event,
            Self::Manual(_) => TriggerType::Manual,
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::for_type(TriggerType::default())
    }
}

// ── Time ─────────────────────────────────────────────────────────────

/// How often a scheduled trigger fires
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Schedule-based trigger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTriggerConfig {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<NaiveTime>,
    /// Only meaningful for weekly schedules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Weekday>,
    /// Only meaningful for monthly schedules (1-31)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
}

impl TimeTriggerConfig {
    pub fn daily() -> Self {
        Self::default()
    }

    pub fn weekly(day: Weekday) -> Self {
        Self {
            frequency: Frequency::Weekly,
            day_of_week: Some(day),
            ..Self::default()
        }
    }

    pub fn monthly(day_of_month: u8) -> Self {
        Self {
            frequency: Frequency::Monthly,
            day_of_month: Some(day_of_month),
            ..Self::default()
        }
    }

    pub fn at(mut self, time_of_day: NaiveTime) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    /// Check the schedule fields are in range
    pub fn is_valid(&self) -> bool {
        self.day_of_month.map_or(true, |d| (1..=31).contains(&d))
    }
}

// ── Event ────────────────────────────────────────────────────────────

/// Fires when the application emits a matching event
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTriggerConfig {
    /// Event category, e.g. `invoice`, `violation`, `arc_request`
    pub event_type: String,
    /// Event name within the category, e.g. `created`, `overdue`
    pub event_name: String,
}

impl EventTriggerConfig {
    pub fn new(event_type: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            event_name: event_name.into(),
        }
    }
}

// ── Manual ───────────────────────────────────────────────────────────

/// Who may press a manual trigger
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Admin,
    Manager,
    Board,
}

/// Started by a person from a button in the UI
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTriggerConfig {
    pub label: String,
    pub access_level: AccessLevel,
}

impl ManualTriggerConfig {
    pub fn new(label: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            label: label.into(),
            access_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_daily_time_trigger() {
        let config = TriggerConfig::default();
        assert_eq!(config.trigger_type(), TriggerType::Time);
        assert_eq!(config, TriggerConfig::Time(TimeTriggerConfig::daily()));
    }

    #[test]
    fn test_for_type_matches_tag() {
        for t in [TriggerType::Time, TriggerType::Event, TriggerType::Manual] {
            assert_eq!(TriggerConfig::for_type(t).trigger_type(), t);
        }
    }

    #[test]
    fn test_day_of_month_range() {
        assert!(TimeTriggerConfig::monthly(1).is_valid());
        assert!(TimeTriggerConfig::monthly(31).is_valid());
        assert!(!TimeTriggerConfig::monthly(0).is_valid());
        assert!(!TimeTriggerConfig::monthly(32).is_valid());
    }

    #[test]
    fn test_serialized_shape() {
        let config = TriggerConfig::Event(EventTriggerConfig::new("invoice", "overdue"));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["triggerType"], "event");
        assert_eq!(json["config"]["eventType"], "invoice");
        assert_eq!(json["config"]["eventName"], "overdue");
    }
}
