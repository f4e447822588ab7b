use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest overtime claim accepted for a single day, in minutes.
pub const MAX_OVERTIME_MINUTES: i64 = 720;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OvertimeRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(example = 90)]
    pub minutes: i64,
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

/// TOIL hours credited when an overtime claim is approved.
pub fn toil_credit_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

pub fn valid_overtime_minutes(minutes: i64) -> bool {
    (1..=MAX_OVERTIME_MINUTES).contains(&minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_converts_to_hours() {
        assert_eq!(toil_credit_hours(90), 1.5);
        assert_eq!(toil_credit_hours(60), 1.0);
    }

    #[test]
    fn minutes_bounds() {
        assert!(!valid_overtime_minutes(0));
        assert!(valid_overtime_minutes(1));
        assert!(valid_overtime_minutes(720));
        assert!(!valid_overtime_minutes(721));
    }
}
