use crate::auth::auth::AuthUser;
use crate::model::overtime::{OvertimeRequest, toil_credit_hours, valid_overtime_minutes};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateOvertime {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(example = 90)]
    pub minutes: i64,
    #[schema(example = "Release night")]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct OvertimeFilter {
    pub employee_id: Option<u64>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct OvertimeListResponse {
    pub data: Vec<OvertimeRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// File an overtime claim
#[utoipa::path(
    post,
    path = "/api/overtime",
    request_body = CreateOvertime,
    responses(
        (status = 200, description = "Overtime claim submitted", body = Object, example = json!({
            "message": "Overtime claim submitted", "status": "pending"
        })),
        (status = 400, description = "Minutes out of range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn create_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOvertime>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id_or_forbidden()?;

    if !valid_overtime_minutes(payload.minutes) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Overtime minutes must be between 1 and 720"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO overtime_requests (employee_id, work_date, minutes, reason, status)
        VALUES (?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(employee_id)
    .bind(payload.work_date)
    .bind(payload.minutes)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to create overtime claim");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime claim submitted",
        "status": "pending"
    })))
}

/// Overtime claims listing. Employees see their own; managers and above
/// may filter across the company.
#[utoipa::path(
    get,
    path = "/api/overtime",
    params(OvertimeFilter),
    responses(
        (status = 200, description = "Paginated overtime list", body = OvertimeListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn list_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OvertimeFilter>,
) -> actix_web::Result<impl Responder> {
    // employees are pinned to their own claims
    let employee_filter = if auth.require_manager_or_above().is_ok() {
        query.employee_id
    } else {
        Some(auth.employee_id_or_forbidden()?)
    };

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut ids: Vec<u64> = Vec::new();
    let mut statuses: Vec<&str> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        ids.push(emp_id);
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        statuses.push(status);
    }

    let count_sql = format!("SELECT COUNT(*) FROM overtime_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for id in &ids {
        count_q = count_q.bind(*id);
    }
    for s in &statuses {
        count_q = count_q.bind(*s);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count overtime claims");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, work_date, minutes, reason, status, created_at
        FROM overtime_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, OvertimeRequest>(&data_sql);
    for id in &ids {
        data_q = data_q.bind(*id);
    }
    for s in &statuses {
        data_q = data_q.bind(*s);
    }

    let claims = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch overtime list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(OvertimeListResponse {
        data: claims,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Approve an overtime claim (HR/Admin). The claimed minutes convert to
/// TOIL hours on the employee's balance in the same transaction.
#[utoipa::path(
    put,
    path = "/api/overtime/{overtime_id}/approve",
    params(("overtime_id" = u64, Path, description = "ID of the overtime claim")),
    responses(
        (status = 200, description = "Overtime approved"),
        (status = 400, description = "Not found or already processed"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn approve_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let overtime_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, overtime_id, "Failed to open transaction");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let pending = sqlx::query_as::<_, (u64, i64)>(
        r#"
        SELECT employee_id, minutes
        FROM overtime_requests
        WHERE id = ? AND status = 'pending'
        FOR UPDATE
        "#,
    )
    .bind(overtime_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, overtime_id, "Approve overtime lookup failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let (employee_id, minutes) = match pending {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Overtime claim not found or already processed"
            })));
        }
    };

    sqlx::query(
        "UPDATE overtime_requests SET status = 'approved' WHERE id = ? AND status = 'pending'",
    )
    .bind(overtime_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, overtime_id, "Approve overtime failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let credit = toil_credit_hours(minutes);

    sqlx::query(
        r#"
        INSERT INTO leave_balances (employee_id, toil_hours)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE toil_hours = toil_hours + VALUES(toil_hours)
        "#,
    )
    .bind(employee_id)
    .bind(credit)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, overtime_id, "TOIL credit failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, overtime_id, "Failed to commit approval");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime approved",
        "toil_credited_hours": credit
    })))
}

/// Reject an overtime claim (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/overtime/{overtime_id}/reject",
    params(("overtime_id" = u64, Path, description = "ID of the overtime claim")),
    responses(
        (status = 200, description = "Overtime rejected"),
        (status = 400, description = "Not found or already processed"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn reject_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let overtime_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE overtime_requests SET status = 'rejected' WHERE id = ? AND status = 'pending'",
    )
    .bind(overtime_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, overtime_id, "Reject overtime failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Overtime claim not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Overtime rejected"
    })))
}
