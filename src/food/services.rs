use std::collections::BTreeMap;

use serde::{
    ser::{Error as _, SerializeMap},
    Serialize, Serializer,
};
use time::{macros::format_description, Date, Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, error};

use super::repo::{FoodLogEntry, FoodLogStore};
use crate::{config::CaloriesConfig, error::ApiError};

/// Fixed reference timezone and window length used to bucket entries by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaloriePolicy {
    pub offset: UtcOffset,
    pub window_days: u16,
}

impl CaloriePolicy {
    pub fn from_config(cfg: &CaloriesConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let offset = UtcOffset::from_hms(cfg.utc_offset_hours, 0, 0)?;
        Ok(Self {
            offset,
            window_days: cfg.window_days,
        })
    }

    pub fn local_date(&self, ts: OffsetDateTime) -> Date {
        ts.to_offset(self.offset).date()
    }
}

/// Daily totals, newest date first. Serializes as a JSON object keyed by `YYYY-MM-DD`
/// with keys in that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyCalories(Vec<(Date, i64)>);

#[cfg(test)]
impl DailyCalories {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.0.iter().map(|(d, _)| *d)
    }

    pub fn get(&self, date: Date) -> Option<i64> {
        self.0.iter().find(|(d, _)| *d == date).map(|(_, c)| *c)
    }

    pub fn sum(&self) -> i64 {
        self.0.iter().map(|(_, c)| c).sum()
    }
}

impl Serialize for DailyCalories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (date, calories) in &self.0 {
            let key = date
                .format(format_description!("[year]-[month]-[day]"))
                .map_err(S::Error::custom)?;
            map.serialize_entry(&key, calories)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieReport {
    pub daily_calories: DailyCalories,
    pub weekly_calories: BTreeMap<u32, i64>,
    pub total_calories: i64,
}

/// Sunday-based week of the year:
/// `ceil((weekday_from_sunday + 1 + days_since_jan_1) / 7)`.
pub fn week_number(date: Date) -> u32 {
    let weekday = u32::from(date.weekday().number_days_from_sunday());
    let days_since_jan_1 = u32::from(date.ordinal()) - 1;
    (weekday + 1 + days_since_jan_1).div_ceil(7)
}

fn add_calories(acc: &mut i64, calories: i64) -> Result<(), ApiError> {
    *acc = acc
        .checked_add(calories)
        .ok_or_else(|| ApiError::Internal("calorie total overflow".into()))?;
    Ok(())
}

/// Buckets `entries` into the trailing window ending at `now`'s local date.
///
/// `total_calories` covers every entry, including those that fall outside the window.
pub fn aggregate(
    user_id: &str,
    entries: &[FoodLogEntry],
    now: OffsetDateTime,
    policy: &CaloriePolicy,
) -> Result<CalorieReport, ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::AuthenticationMissing);
    }

    let mut total_calories = 0i64;
    let mut by_date: BTreeMap<Date, i64> = BTreeMap::new();
    let mut weekly_calories: BTreeMap<u32, i64> = BTreeMap::new();

    for entry in entries {
        let date = policy.local_date(entry.created_at);
        add_calories(&mut total_calories, entry.calories)?;
        add_calories(by_date.entry(date).or_insert(0), entry.calories)?;
        add_calories(weekly_calories.entry(week_number(date)).or_insert(0), entry.calories)?;
    }

    // Counting down from today yields the dates newest first.
    let today = policy.local_date(now);
    let daily: Vec<(Date, i64)> = (0..i64::from(policy.window_days))
        .filter_map(|i| today.checked_sub(Duration::days(i)))
        .map(|date| (date, by_date.get(&date).copied().unwrap_or(0)))
        .collect();

    debug!(
        %user_id,
        entries = entries.len(),
        total_calories,
        %today,
        "calories aggregated"
    );

    Ok(CalorieReport {
        daily_calories: DailyCalories(daily),
        weekly_calories,
        total_calories,
    })
}

/// Loads the caller's entries and aggregates them. The identity is checked
/// before the store is touched.
pub async fn calorie_report(
    store: &dyn FoodLogStore,
    user_id: &str,
    now: OffsetDateTime,
    policy: &CaloriePolicy,
) -> Result<CalorieReport, ApiError> {
    // Repeats the check in `aggregate` so a missing identity never reaches the store.
    if user_id.trim().is_empty() {
        return Err(ApiError::AuthenticationMissing);
    }

    let entries = store.fetch_entries(user_id).await.map_err(|e| {
        error!(error = %e, %user_id, "fetch food log failed");
        ApiError::storage("Error retrieving calories", format!("{e:#}"))
    })?;

    aggregate(user_id, &entries, now, policy)
}
