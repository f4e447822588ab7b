use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:02:11", value_type = String)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:31:40", value_type = String)]
    pub check_out: Option<NaiveTime>,
    #[schema(example = "gps")]
    pub method: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(example = "present")]
    pub status: String,
    pub worked_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub auto_checked_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckMethod {
    Gps,
    Biometric,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

/// Minutes between check-in and check-out on the same day.
pub fn worked_minutes(check_in: NaiveTime, check_out: NaiveTime) -> i64 {
    (check_out - check_in).num_minutes().max(0)
}

pub fn overtime_minutes(worked: i64, scheduled: i64) -> i64 {
    (worked - scheduled).max(0)
}

/// Status as derived at check-in time: late once past shift start plus grace.
pub fn status_at_check_in(
    check_in: NaiveTime,
    shift_start: NaiveTime,
    grace_minutes: i64,
) -> AttendanceStatus {
    if check_in > shift_start + Duration::minutes(grace_minutes) {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Final status once the day is closed. A short day (under half the
/// scheduled minutes) downgrades to half-day, otherwise the check-in
/// status stands.
pub fn status_at_check_out(
    check_in_status: AttendanceStatus,
    worked: i64,
    scheduled: i64,
) -> AttendanceStatus {
    if worked * 2 < scheduled {
        AttendanceStatus::HalfDay
    } else {
        check_in_status
    }
}

/// Great-circle distance in meters between two WGS84 coordinates.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn worked_minutes_spans_the_day() {
        assert_eq!(worked_minutes(t(9, 0), t(17, 30)), 510);
        assert_eq!(worked_minutes(t(9, 0), t(9, 0)), 0);
        // clock skew between devices must not go negative
        assert_eq!(worked_minutes(t(9, 5), t(9, 0)), 0);
    }

    #[test]
    fn overtime_only_counts_past_schedule() {
        assert_eq!(overtime_minutes(510, 480), 30);
        assert_eq!(overtime_minutes(480, 480), 0);
        assert_eq!(overtime_minutes(200, 480), 0);
    }

    #[test]
    fn late_after_grace_window() {
        assert_eq!(
            status_at_check_in(t(9, 10), t(9, 0), 15),
            AttendanceStatus::Present
        );
        assert_eq!(
            status_at_check_in(t(9, 15), t(9, 0), 15),
            AttendanceStatus::Present
        );
        assert_eq!(
            status_at_check_in(t(9, 16), t(9, 0), 15),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn short_day_downgrades_to_half_day() {
        assert_eq!(
            status_at_check_out(AttendanceStatus::Present, 200, 480),
            AttendanceStatus::HalfDay
        );
        assert_eq!(
            status_at_check_out(AttendanceStatus::Late, 230, 480),
            AttendanceStatus::HalfDay
        );
        // exactly half keeps the check-in status
        assert_eq!(
            status_at_check_out(AttendanceStatus::Late, 240, 480),
            AttendanceStatus::Late
        );
        assert_eq!(
            status_at_check_out(AttendanceStatus::Present, 510, 480),
            AttendanceStatus::Present
        );
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_distance_m(23.7808, 90.4218, 23.7808, 90.4218) < 1e-6);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        // one degree of latitude is roughly 111 km everywhere
        let d = haversine_distance_m(23.0, 90.0, 24.0, 90.0);
        assert!((d - 111_195.0).abs() < 200.0, "got {}", d);
    }

    #[test]
    fn status_strings_match_db_values() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half_day");
        assert_eq!(CheckMethod::Gps.to_string(), "gps");
        assert_eq!(
            "biometric".parse::<CheckMethod>().unwrap(),
            CheckMethod::Biometric
        );
    }
}
