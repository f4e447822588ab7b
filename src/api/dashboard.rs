use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Duration, Local};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    #[schema(example = 120)]
    pub total_employees: i64,
    #[schema(example = 96)]
    pub checked_in_today: i64,
    #[schema(example = 7)]
    pub late_today: i64,
    #[schema(example = 4)]
    pub on_leave_today: i64,
    #[schema(example = 20)]
    pub absent_today: i64,
    #[schema(example = 3)]
    pub pending_leave_requests: i64,
    #[schema(example = 2)]
    pub pending_overtime_requests: i64,
    #[schema(example = 18240)]
    pub minutes_logged_this_week: i64,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct ProjectUsage {
    pub id: u64,
    #[schema(example = "Mobile App")]
    pub name: String,
    #[schema(example = "MOB-01")]
    pub code: String,
    #[schema(example = 5400)]
    pub total_minutes: i64,
    #[schema(example = 4)]
    pub contributors: i64,
}

async fn count(pool: &MySqlPool, sql: &str, binds: &[&str]) -> Result<i64, sqlx::Error> {
    let mut q = sqlx::query_scalar::<_, i64>(sql);
    for b in binds {
        q = q.bind(*b);
    }
    q.fetch_one(pool).await
}

/// Company-wide operational snapshot (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Headcount, attendance and request counters", body = DashboardSummary),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let today = Local::now().date_naive();
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let today_s = today.to_string();
    let week_start_s = week_start.to_string();

    let pool = pool.get_ref();

    let result: Result<DashboardSummary, sqlx::Error> = async {
        let total_employees = count(
            pool,
            "SELECT COUNT(*) FROM employees WHERE status = 'active'",
            &[],
        )
        .await?;

        let checked_in_today = count(
            pool,
            "SELECT COUNT(*) FROM attendance WHERE date = ?",
            &[&today_s],
        )
        .await?;

        let late_today = count(
            pool,
            "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'late'",
            &[&today_s],
        )
        .await?;

        let on_leave_today = count(
            pool,
            r#"
            SELECT COUNT(DISTINCT employee_id) FROM leave_requests
            WHERE status = 'approved' AND start_date <= ? AND end_date >= ?
            "#,
            &[&today_s, &today_s],
        )
        .await?;

        let pending_leave_requests = count(
            pool,
            "SELECT COUNT(*) FROM leave_requests WHERE status = 'pending'",
            &[],
        )
        .await?;

        let pending_overtime_requests = count(
            pool,
            "SELECT COUNT(*) FROM overtime_requests WHERE status = 'pending'",
            &[],
        )
        .await?;

        let minutes_logged_this_week = count(
            pool,
            r#"
            SELECT CAST(COALESCE(SUM(minutes), 0) AS SIGNED) FROM time_entries
            WHERE work_date >= ? AND work_date <= ?
            "#,
            &[&week_start_s, &today_s],
        )
        .await?;

        Ok(DashboardSummary {
            total_employees,
            checked_in_today,
            late_today,
            on_leave_today,
            absent_today: (total_employees - checked_in_today - on_leave_today).max(0),
            pending_leave_requests,
            pending_overtime_requests,
            minutes_logged_this_week,
        })
    }
    .await;

    match result {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e) => {
            error!(error = %e, "Failed to build dashboard summary");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Logged minutes and contributor counts per project (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/dashboard/projects",
    responses(
        (status = 200, body = Vec<ProjectUsage>),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn projects(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let usage = sqlx::query_as::<_, ProjectUsage>(
        r#"
        SELECT p.id, p.name, p.code,
               CAST(COALESCE(SUM(t.minutes), 0) AS SIGNED) AS total_minutes,
               COUNT(DISTINCT t.employee_id) AS contributors
        FROM projects p
        LEFT JOIN time_entries t ON t.project_id = p.id
        GROUP BY p.id, p.name, p.code
        ORDER BY total_minutes DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to aggregate project usage");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(usage))
}
