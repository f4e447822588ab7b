use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A day cannot hold more than 24h of booked time across all projects.
pub const DAY_CAP_MINUTES: i64 = 1440;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Project {
    pub id: u64,
    #[schema(example = "Mobile App")]
    pub name: String,
    #[schema(example = "MOB-01")]
    pub code: String,
    #[schema(example = "active")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeEntry {
    pub id: u64,
    pub employee_id: u64,
    pub project_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(example = 120)]
    pub minutes: i64,
    pub note: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AllocationError {
    /// Minutes outside 1..=1440
    InvalidMinutes,
    /// Booking would push the day's total past 24h
    DayOverflow { already_booked: i64 },
}

/// Check a new booking against what the employee already logged that day.
pub fn check_allocation(new_minutes: i64, booked_today: i64) -> Result<(), AllocationError> {
    if !(1..=DAY_CAP_MINUTES).contains(&new_minutes) {
        return Err(AllocationError::InvalidMinutes);
    }
    if booked_today + new_minutes > DAY_CAP_MINUTES {
        return Err(AllocationError::DayOverflow {
            already_booked: booked_today,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_negative_minutes() {
        assert_eq!(check_allocation(0, 0), Err(AllocationError::InvalidMinutes));
        assert_eq!(
            check_allocation(-30, 0),
            Err(AllocationError::InvalidMinutes)
        );
    }

    #[test]
    fn rejects_single_entry_over_a_day() {
        assert_eq!(
            check_allocation(1441, 0),
            Err(AllocationError::InvalidMinutes)
        );
    }

    #[test]
    fn day_total_caps_at_24h() {
        assert_eq!(check_allocation(480, 900), Ok(()));
        assert_eq!(check_allocation(540, 900), Ok(())); // exactly 1440
        assert_eq!(
            check_allocation(541, 900),
            Err(AllocationError::DayOverflow { already_booked: 900 })
        );
    }
}
