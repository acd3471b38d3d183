use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// How often a planned transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// Two-letter weekday code used in weekly recurrence rules (iCalendar BYDAY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekdayCode {
    #[serde(rename = "MO")]
    Mo,
    #[serde(rename = "TU")]
    Tu,
    #[serde(rename = "WE")]
    We,
    #[serde(rename = "TH")]
    Th,
    #[serde(rename = "FR")]
    Fr,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "SU")]
    Su,
}

impl WeekdayCode {
    pub fn to_weekday(self) -> Weekday {
        match self {
            WeekdayCode::Mo => Weekday::Mon,
            WeekdayCode::Tu => Weekday::Tue,
            WeekdayCode::We => Weekday::Wed,
            WeekdayCode::Th => Weekday::Thu,
            WeekdayCode::Fr => Weekday::Fri,
            WeekdayCode::Sa => Weekday::Sat,
            WeekdayCode::Su => Weekday::Sun,
        }
    }
}

/// A recurrence rule attached to a planned transaction.
///
/// `by_day` applies to weekly rules only; `by_month_day` to monthly rules
/// only. Both are ignored for other frequencies. The scheduler treats this
/// struct as read-only — plans are created and edited by the web frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Step between occurrences in units of `frequency`. Must be ≥ 1.
    pub interval: u32,
    /// Weekday filter for weekly rules, e.g. `[MO, WE]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_day: Vec<WeekdayCode>,
    /// Day-of-month filter for monthly rules, e.g. `[1, 15]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_month_day: Vec<u32>,
    /// First instant the rule can produce. Occurrences never precede this.
    pub start_date: DateTime<Utc>,
    /// Inclusive end of the rule's life, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Recurrence {
    /// Check the rule invariants: `interval ≥ 1` and `end_date ≥ start_date`.
    pub fn validate(&self) -> Result<()> {
        if self.interval < 1 {
            return Err(CoreError::InvalidRecurrence(
                "interval must be >= 1".to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(CoreError::InvalidRecurrence(format!(
                    "end_date {} precedes start_date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }
}

/// A planned (recurring) transaction owned by a user.
///
/// Description, category, and amount are opaque to the scheduler — they are
/// only threaded through into the reminder payload. Plans are deactivated
/// rather than deleted when their recurrence ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrencePlan {
    /// UUID v4 string — primary key.
    pub id: String,
    /// Owning user identifier.
    pub owner: String,
    /// Only active plans are considered by the reminder cycle.
    pub active: bool,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Amount in minor units (cents); sign encodes income vs expense.
    pub amount_minor: i64,
    pub currency: String,
    /// Plans without a rule exist (one-off entries); the scheduler skips them.
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// RFC3339 timestamp of the last metadata update.
    pub updated_at: String,
}

/// Opaque Web Push credential material captured by the subscribe flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A registered push endpoint for one device of one user.
///
/// Created by the frontend subscribe flow; removed by the dispatcher when a
/// delivery reports the endpoint gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    /// UUID v4 string — primary key.
    pub id: String,
    /// Owning user identifier.
    pub owner: String,
    /// Push service URL, unique per device within one owner.
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rule(interval: u32, end_offset_days: Option<i64>) -> Recurrence {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Recurrence {
            frequency: Frequency::Daily,
            interval,
            by_day: vec![],
            by_month_day: vec![],
            start_date: start,
            end_date: end_offset_days.map(|d| start + chrono::Duration::days(d)),
        }
    }

    #[test]
    fn validate_accepts_well_formed_rule() {
        assert!(rule(1, Some(30)).validate().is_ok());
        assert!(rule(1, None).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        assert!(rule(0, None).validate().is_err());
    }

    #[test]
    fn validate_rejects_end_before_start() {
        assert!(rule(1, Some(-1)).validate().is_err());
    }

    #[test]
    fn recurrence_json_roundtrip() {
        let r = Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            by_day: vec![WeekdayCode::Mo, WeekdayCode::We],
            by_month_day: vec![],
            start_date: Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
            end_date: None,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"MO\""));
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(back.by_day, r.by_day);
        assert_eq!(back.frequency, Frequency::Weekly);
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        let json = r#"{"frequency":"fortnightly","interval":1,
                       "start_date":"2026-03-01T09:00:00Z"}"#;
        assert!(serde_json::from_str::<Recurrence>(json).is_err());
        assert!("fortnightly".parse::<Frequency>().is_err());
    }
}
