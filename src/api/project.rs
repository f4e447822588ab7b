use crate::auth::auth::AuthUser;
use crate::model::project::{AllocationError, Project, TimeEntry, check_allocation};
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateProject {
    #[schema(example = "Mobile App")]
    pub name: String,
    #[schema(example = "MOB-01")]
    pub code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LogTimeReq {
    #[schema(example = 3)]
    pub project_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(example = 120)]
    pub minutes: i64,
    #[schema(example = "API integration")]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TimesheetQuery {
    pub employee_id: Option<u64>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct TimesheetResponse {
    pub data: Vec<TimeEntry>,
    #[schema(example = 2400)]
    pub total_minutes: i64,
}

/// Create a project (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created"),
        (status = 400, description = "Empty name or duplicate code"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn create_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProject>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.name.trim().is_empty() || payload.code.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "name and code must not be empty"
        })));
    }

    let result = sqlx::query(
        "INSERT INTO projects (name, code, status) VALUES (?, ?, 'active')",
    )
    .bind(payload.name.trim())
    .bind(payload.code.trim())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "message": "Project created",
            "id": res.last_insert_id()
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Project code already in use"
                    })));
                }
            }

            error!(error = %e, "Failed to create project");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Project catalogue
#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, body = Vec<Project>), (status = 401)),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn list_projects(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let projects =
        sqlx::query_as::<_, Project>("SELECT id, name, code, status FROM projects ORDER BY name")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch projects");
                ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Partial project update, e.g. archiving (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/projects/{project_id}",
    params(("project_id" = u64, Path, description = "Project ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Project updated"),
        (status = 400, description = "Empty or malformed payload"),
        (status = 404, description = "Project not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn update_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let project_id = path.into_inner();

    let update = build_update_sql("projects", &body, "id", project_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Project not found"));
    }

    Ok(HttpResponse::Ok().body("Project updated successfully"))
}

/// Book time against a project. The day's total across all projects is
/// capped at 24 hours.
#[utoipa::path(
    post,
    path = "/api/projects/time",
    request_body = LogTimeReq,
    responses(
        (status = 201, description = "Time entry created", body = Object, example = json!({
            "message": "Time logged", "id": 55, "day_total_minutes": 480
        })),
        (status = 400, description = "Minutes out of range, day overflow, or inactive project"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn log_time(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<LogTimeReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id_or_forbidden()?;

    let project_status = sqlx::query_scalar::<_, String>(
        "SELECT status FROM projects WHERE id = ?",
    )
    .bind(payload.project_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch project");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match project_status.as_deref() {
        Some("active") => {}
        Some(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Project is not active"
            })));
        }
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Unknown project"
            })));
        }
    }

    let booked_today = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT CAST(COALESCE(SUM(minutes), 0) AS SIGNED)
        FROM time_entries
        WHERE employee_id = ? AND work_date = ?
        "#,
    )
    .bind(employee_id)
    .bind(payload.work_date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to sum day's time entries");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if let Err(reason) = check_allocation(payload.minutes, booked_today) {
        let message = match reason {
            AllocationError::InvalidMinutes => "minutes must be between 1 and 1440".to_string(),
            AllocationError::DayOverflow { already_booked } => format!(
                "day total would exceed 24h ({} minutes already booked)",
                already_booked
            ),
        };
        return Ok(HttpResponse::BadRequest().json(json!({ "message": message })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO time_entries (employee_id, project_id, work_date, minutes, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.project_id)
    .bind(payload.work_date)
    .bind(payload.minutes)
    .bind(&payload.note)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to insert time entry");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Time logged",
        "id": result.last_insert_id(),
        "day_total_minutes": booked_today + payload.minutes
    })))
}

/// Timesheet over a date range. Employees get their own; managers and
/// above may pass employee_id.
#[utoipa::path(
    get,
    path = "/api/projects/timesheet",
    params(TimesheetQuery),
    responses(
        (status = 200, description = "Entries plus range total", body = TimesheetResponse),
        (status = 400, description = "Bad date range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn timesheet(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TimesheetQuery>,
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

    let entries = sqlx::query_as::<_, TimeEntry>(
        r#"
        SELECT id, employee_id, project_id, work_date, minutes, note, created_at
        FROM time_entries
        WHERE employee_id = ? AND work_date BETWEEN ? AND ?
        ORDER BY work_date, project_id
        "#,
    )
    .bind(employee_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch timesheet");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let total_minutes = entries.iter().map(|e| e.minutes).sum();

    Ok(HttpResponse::Ok().json(TimesheetResponse {
        data: entries,
        total_minutes,
    }))
}
