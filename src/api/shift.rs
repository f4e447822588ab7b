use crate::auth::auth::AuthUser;
use crate::model::shift::Shift;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
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

#[derive(Deserialize, ToSchema)]
pub struct AssignShift {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 2)]
    pub shift_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct ScheduleQuery {
    pub employee_id: Option<u64>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct ScheduleDay {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,
    pub shift_id: u64,
    #[schema(example = "Morning")]
    pub name: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:30:00", value_type = String)]
    pub end_time: NaiveTime,
    pub break_minutes: i64,
}

/// Create a shift template (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created"),
        (status = 400, description = "Bad payload"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Shift name must not be empty"
        })));
    }

    if payload.break_minutes < 0 || payload.grace_minutes < 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "break_minutes and grace_minutes must not be negative"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO shifts (name, start_time, end_time, break_minutes, grace_minutes)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(payload.break_minutes)
    .bind(payload.grace_minutes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create shift");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Shift created",
        "id": result.last_insert_id()
    })))
}

/// Shift template catalogue
#[utoipa::path(
    get,
    path = "/api/shifts",
    responses((status = 200, body = Vec<Shift>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let shifts = sqlx::query_as::<_, Shift>(
        "SELECT id, name, start_time, end_time, break_minutes, grace_minutes FROM shifts ORDER BY start_time",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch shifts");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(shifts))
}

/// Partial update of a shift template (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/shifts/{shift_id}",
    params(("shift_id" = u64, Path, description = "Shift ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Shift updated"),
        (status = 400, description = "Empty or malformed payload"),
        (status = 404, description = "Shift not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let shift_id = path.into_inner();

    let update = build_update_sql("shifts", &body, "id", shift_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Shift not found"));
    }

    Ok(HttpResponse::Ok().body("Shift updated successfully"))
}

/// Delete a shift template (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/shifts/{shift_id}",
    params(("shift_id" = u64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted"),
        (status = 400, description = "Shift still assigned"),
        (status = 404, description = "Shift not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn delete_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let shift_id = path.into_inner();

    let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
        .bind(shift_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Shift not found"
                })));
            }
            Ok(HttpResponse::Ok().json(json!({
                "message": "Shift deleted"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Shift is still assigned to employees"
                    })));
                }
            }

            error!(error = %e, shift_id, "Failed to delete shift");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Assign a shift to an employee for a day (HR/Admin). Re-assigning the
/// same day replaces the previous shift.
#[utoipa::path(
    post,
    path = "/api/shifts/assign",
    request_body = AssignShift,
    responses(
        (status = 200, description = "Shift assigned"),
        (status = 400, description = "Unknown employee or shift"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn assign_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO shift_assignments (employee_id, shift_id, work_date)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE shift_id = VALUES(shift_id)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.shift_id)
    .bind(payload.work_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Shift assigned"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Unknown employee or shift"
                    })));
                }
            }

            error!(error = %e, "Failed to assign shift");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Assigned schedule over a date range. Employees get their own;
/// managers and above may pass employee_id.
#[utoipa::path(
    get,
    path = "/api/shifts/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, body = Vec<ScheduleDay>),
        (status = 400, description = "Bad date range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ScheduleQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(id) if auth.require_manager_or_above().is_ok() => id,
        _ => auth.employee_id_or_forbidden()?,
    };

    if query.from > query.to {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "from cannot be after to"
        })));
    }

    let days = sqlx::query_as::<_, ScheduleDay>(
        r#"
        SELECT a.work_date, a.shift_id, s.name, s.start_time, s.end_time, s.break_minutes
        FROM shift_assignments a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.employee_id = ? AND a.work_date BETWEEN ? AND ?
        ORDER BY a.work_date
        "#,
    )
    .bind(employee_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch schedule");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(days))
}
