use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Shift {
    pub id: u64,
    #[schema(example = "Morning")]
    pub name: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:30:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = 30)]
    pub break_minutes: i64,
    #[schema(example = 15)]
    pub grace_minutes: i64,
}

/// Payable minutes of a shift: span minus break. An end time at or before
/// the start wraps past midnight.
pub fn scheduled_minutes(start: NaiveTime, end: NaiveTime, break_minutes: i64) -> i64 {
    let span = if end > start {
        (end - start).num_minutes()
    } else {
        1440 - (start - end).num_minutes()
    };
    (span - break_minutes).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn day_shift_minus_break() {
        assert_eq!(scheduled_minutes(t(9, 0), t(17, 30), 30), 480);
    }

    #[test]
    fn night_shift_wraps_midnight() {
        assert_eq!(scheduled_minutes(t(22, 0), t(6, 0), 60), 420);
    }

    #[test]
    fn break_never_goes_negative() {
        assert_eq!(scheduled_minutes(t(9, 0), t(9, 30), 60), 0);
    }
}
