use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::{
    Attendance, AttendanceStatus, CheckMethod, haversine_distance_m, overtime_minutes,
    status_at_check_in, status_at_check_out, worked_minutes,
};
use crate::model::shift::scheduled_minutes;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = "gps")]
    pub method: CheckMethod,
    #[schema(example = 23.7808)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4218)]
    pub longitude: Option<f64>,
    #[schema(example = "terminal-lobby-1")]
    pub device_id: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Shift parameters in effect for one employee on one day, falling back
/// to the configured default workday when nothing is assigned.
pub(crate) struct DaySchedule {
    pub start: NaiveTime,
    pub scheduled_minutes: i64,
    pub grace_minutes: i64,
}

pub(crate) async fn day_schedule(
    pool: &MySqlPool,
    config: &Config,
    employee_id: u64,
    date: NaiveDate,
) -> Result<DaySchedule, sqlx::Error> {
    let assigned = sqlx::query_as::<_, (NaiveTime, NaiveTime, i64, i64)>(
        r#"
        SELECT s.start_time, s.end_time, s.break_minutes, s.grace_minutes
        FROM shift_assignments a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.employee_id = ? AND a.work_date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(match assigned {
        Some((start, end, break_minutes, grace)) => DaySchedule {
            start,
            scheduled_minutes: scheduled_minutes(start, end, break_minutes),
            grace_minutes: grace,
        },
        None => DaySchedule {
            start: config.workday_start,
            scheduled_minutes: config.workday_minutes,
            grace_minutes: config.grace_minutes,
        },
    })
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "message": "Checked in successfully", "status": "present"
        })),
        (status = 400, description = "Already checked in, outside the geofence, or payload incomplete"),
        (status = 401),
        (status = 403, description = "No employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id_or_forbidden()?;

    match payload.method {
        CheckMethod::Gps => {
            let (lat, lng) = match (payload.latitude, payload.longitude) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "GPS check-in requires latitude and longitude"
                    })));
                }
            };

            let distance = haversine_distance_m(lat, lng, config.office_lat, config.office_lng);
            if distance > config.geofence_radius_m {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Outside the office geofence",
                    "distance_m": distance.round()
                })));
            }
        }
        CheckMethod::Biometric => {
            if payload.device_id.as_deref().map_or(true, str::is_empty) {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Biometric check-in requires a device id"
                })));
            }
        }
        // manual entries are an HR correction tool
        CheckMethod::Manual => auth.require_hr_or_admin()?,
    }

    let now = Local::now().naive_local();
    let today = now.date();

    let schedule = day_schedule(pool.get_ref(), config.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to resolve shift");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let status = status_at_check_in(now.time(), schedule.start, schedule.grace_minutes);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, method, latitude, longitude, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(now.time())
    .bind(payload.method.to_string())
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(status.to_string())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully",
            "status": status.to_string()
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, employee_id, "Check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "message": "Checked out successfully",
            "worked_minutes": 512,
            "overtime_minutes": 32,
            "status": "present"
        })),
        (status = 400, description = "No active check-in found for today"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id_or_forbidden()?;

    let now = Local::now().naive_local();
    let today = now.date();

    let open = sqlx::query_as::<_, (u64, NaiveTime, String)>(
        r#"
        SELECT id, check_in, status
        FROM attendance
        WHERE employee_id = ? AND date = ? AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out lookup failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let (row_id, check_in, status) = match open {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "No active check-in found for today"
            })));
        }
    };

    let check_in_status = status
        .parse::<AttendanceStatus>()
        .unwrap_or(AttendanceStatus::Present);

    let schedule = day_schedule(pool.get_ref(), config.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to resolve shift");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let worked = worked_minutes(check_in, now.time());
    let overtime = overtime_minutes(worked, schedule.scheduled_minutes);
    let final_status = status_at_check_out(check_in_status, worked, schedule.scheduled_minutes);

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, worked_minutes = ?, overtime_minutes = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(now.time())
    .bind(worked)
    .bind(overtime)
    .bind(final_status.to_string())
    .bind(row_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "worked_minutes": worked,
        "overtime_minutes": overtime,
        "status": final_status.to_string()
    })))
}

/// Caller's attendance record for today
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, null when absent", body = Attendance),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id_or_forbidden()?;

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, method, latitude, longitude,
               status, worked_minutes, overtime_minutes, auto_checked_out
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(Local::now().date_naive())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch today's attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(record))
}

/// Attendance history (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance records", body = AttendanceListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut ids: Vec<u64> = Vec::new();
    let mut dates: Vec<NaiveDate> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        ids.push(emp_id);
    }
    if let Some(from) = query.from {
        where_sql.push_str(" AND date >= ?");
        dates.push(from);
    }
    if let Some(to) = query.to {
        where_sql.push_str(" AND date <= ?");
        dates.push(to);
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for id in &ids {
        count_q = count_q.bind(*id);
    }
    for d in &dates {
        count_q = count_q.bind(*d);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, check_in, check_out, method, latitude, longitude,
               status, worked_minutes, overtime_minutes, auto_checked_out
        FROM attendance
        {}
        ORDER BY date DESC, employee_id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for id in &ids {
        data_q = data_q.bind(*id);
    }
    for d in &dates {
        data_q = data_q.bind(*d);
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
