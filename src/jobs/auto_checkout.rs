use crate::config::Config;
use crate::model::attendance::{overtime_minutes, worked_minutes};
use crate::model::shift::scheduled_minutes;
use anyhow::Result;
use chrono::{Duration, Local, NaiveTime};
use sqlx::MySqlPool;
use tracing::{error, info};

/// Midnight sweep: any attendance row from a previous day still missing
/// a check-out gets closed at its shift end. Runs for the lifetime of
/// the server; a failed sweep is logged and retried the next night.
pub async fn run(pool: MySqlPool, config: Config) {
    loop {
        let now = Local::now().naive_local();
        let next_midnight = match (now.date() + Duration::days(1)).and_hms_opt(0, 0, 0) {
            Some(t) => t,
            None => {
                error!("could not compute next midnight");
                return;
            }
        };
        let wait = (next_midnight - now).to_std().unwrap_or_default();

        tokio::time::sleep(wait).await;

        if let Err(e) = close_open_rows(&pool, &config).await {
            error!(error = %e, "auto-checkout sweep failed");
        }
    }
}

pub(crate) async fn close_open_rows(pool: &MySqlPool, config: &Config) -> Result<()> {
    let today = Local::now().date_naive();

    // open rows with their day's shift, if one was assigned
    let rows = sqlx::query_as::<
        _,
        (
            u64,
            NaiveTime,
            Option<NaiveTime>,
            Option<NaiveTime>,
            Option<i64>,
        ),
    >(
        r#"
        SELECT a.id, a.check_in, s.start_time, s.end_time, s.break_minutes
        FROM attendance a
        LEFT JOIN shift_assignments sa
            ON sa.employee_id = a.employee_id AND sa.work_date = a.date
        LEFT JOIN shifts s ON s.id = sa.shift_id
        WHERE a.check_out IS NULL AND a.date < ?
        "#,
    )
    .bind(today)
    .fetch_all(pool)
    .await?;

    let mut closed = 0u64;

    for (id, check_in, start, end, break_minutes) in rows {
        let (end_time, scheduled) = match (start, end, break_minutes) {
            (Some(start), Some(end), Some(brk)) => (end, scheduled_minutes(start, end, brk)),
            _ => (
                config.workday_start + Duration::minutes(config.workday_minutes),
                config.workday_minutes,
            ),
        };

        // never close a row before its own check-in
        let check_out = end_time.max(check_in);
        let worked = worked_minutes(check_in, check_out);
        let overtime = overtime_minutes(worked, scheduled);

        sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, worked_minutes = ?, overtime_minutes = ?, auto_checked_out = TRUE
            WHERE id = ? AND check_out IS NULL
            "#,
        )
        .bind(check_out)
        .bind(worked)
        .bind(overtime)
        .bind(id)
        .execute(pool)
        .await?;

        closed += 1;
    }

    if closed > 0 {
        info!(closed, "auto-checkout closed open attendance rows");
    }

    Ok(())
}
