use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
    Toil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: String,
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Hours of TOIL debited per requested leave day.
pub const TOIL_HOURS_PER_DAY: f64 = 8.0;

/// Calendar days covered by a request, inclusive of both ends.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// TOIL hours a request will consume once approved.
pub fn toil_debit_hours(start: NaiveDate, end: NaiveDate) -> f64 {
    leave_days(start, end) as f64 * TOIL_HOURS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn single_day_counts_as_one() {
        assert_eq!(leave_days(d("2026-01-05"), d("2026-01-05")), 1);
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(leave_days(d("2026-01-01"), d("2026-01-03")), 3);
    }

    #[test]
    fn toil_debit_follows_day_count() {
        assert_eq!(toil_debit_hours(d("2026-01-01"), d("2026-01-02")), 16.0);
    }

    #[test]
    fn type_strings_match_db_values() {
        assert_eq!(LeaveType::Toil.to_string(), "toil");
        assert_eq!("annual".parse::<LeaveType>().unwrap(), LeaveType::Annual);
        assert_eq!(RequestStatus::Pending.to_string(), "pending");
    }
}
