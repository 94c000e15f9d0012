//! Typed scheduling configuration.
//!
//! Loaded from a TOML document or from environment variables. Missing
//! keys fall back to a Monday to Friday week without holidays.
//!
//! ```toml
//! working_days = [1, 2, 3, 4, 5]
//! non_working_dates = ["2025-12-25", "2025-12-26"]
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Calendar, WorkingDays};

/// Environment variable holding comma-separated ISO weekday numbers.
pub const WORKING_DAYS_VAR: &str = "WP_SCHEDULE_WORKING_DAYS";
/// Environment variable holding comma-separated `YYYY-MM-DD` holidays.
pub const NON_WORKING_DATES_VAR: &str = "WP_SCHEDULE_NON_WORKING_DATES";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub working_days: WorkingDays,
    pub non_working_dates: Vec<NaiveDate>,
}

impl SchedulingConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads configuration from environment variables.
    ///
    /// An empty `WP_SCHEDULE_WORKING_DAYS` means every weekday is a working
    /// day; an unset one keeps the default week.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Loads configuration through a variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(WORKING_DAYS_VAR) {
            config.working_days = raw.parse()?;
        }
        if let Some(raw) = lookup(NON_WORKING_DATES_VAR) {
            config.non_working_dates = parse_dates(&raw)?;
        }
        Ok(config)
    }

    /// Builds the calendar value object.
    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.working_days.clone())
            .with_non_working_dates(self.non_working_dates.iter().copied())
    }
}

fn parse_dates(raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::InvalidDate(format!("{NON_WORKING_DATES_VAR}: {s}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_is_monday_to_friday() {
        let config = SchedulingConfig::default();
        assert_eq!(config.working_days, WorkingDays::monday_to_friday());
        assert!(config.non_working_dates.is_empty());
        assert!(!config.calendar().is_working(date(2025, 3, 8)));
    }

    #[test]
    fn test_from_toml_str() {
        let config = SchedulingConfig::from_toml_str(
            r#"
            working_days = [1, 2, 3, 4]
            non_working_dates = ["2025-12-25"]
            "#,
        )
        .unwrap();
        let cal = config.calendar();
        assert!(cal.is_working(date(2025, 3, 6)));
        assert!(!cal.is_working(date(2025, 3, 7))); // Friday
        assert!(!cal.is_working(date(2025, 12, 25)));
    }

    #[test]
    fn test_from_toml_str_defaults_missing_keys() {
        let config = SchedulingConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulingConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_weekday() {
        let err = SchedulingConfig::from_toml_str("working_days = [0, 8]").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_from_vars() {
        let config = SchedulingConfig::from_vars(vars(&[
            (WORKING_DAYS_VAR, "1,2,3,4,5,6"),
            (NON_WORKING_DATES_VAR, "2025-01-01, 2025-12-25"),
        ]))
        .unwrap();
        assert!(config.calendar().is_working(date(2025, 3, 8)));
        assert_eq!(
            config.non_working_dates,
            vec![date(2025, 1, 1), date(2025, 12, 25)]
        );
    }

    #[test]
    fn test_from_vars_empty_working_days_is_unrestricted() {
        let config = SchedulingConfig::from_vars(vars(&[(WORKING_DAYS_VAR, "")])).unwrap();
        assert!(config.working_days.is_unrestricted());
        assert!(config.calendar().is_working(date(2025, 3, 9)));
    }

    #[test]
    fn test_from_vars_unset_keeps_defaults() {
        let config = SchedulingConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, SchedulingConfig::default());
    }

    #[test]
    fn test_from_vars_rejects_bad_values() {
        let err = SchedulingConfig::from_vars(vars(&[(WORKING_DAYS_VAR, "1,9")])).unwrap_err();
        assert!(matches!(err, Error::InvalidWeekday(9)));

        let err =
            SchedulingConfig::from_vars(vars(&[(NON_WORKING_DATES_VAR, "2025-13-01")])).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(ref msg) if msg.contains("2025-13-01")));

        let err = SchedulingConfig::from_vars(vars(&[(WORKING_DAYS_VAR, "mon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(WORKING_DAYS_VAR, "1,2,3");
        std::env::set_var(NON_WORKING_DATES_VAR, "2025-03-04");

        let config = SchedulingConfig::from_env().unwrap();
        assert_eq!(config.working_days.iso_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(config.non_working_dates, vec![date(2025, 3, 4)]);

        std::env::remove_var(WORKING_DAYS_VAR);
        std::env::remove_var(NON_WORKING_DATES_VAR);
    }

    #[test]
    fn test_serde_json_shape() {
        let config = SchedulingConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["working_days"], serde_json::json!([1, 2, 3, 4, 5]));
    }
}
