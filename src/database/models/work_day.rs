use chrono::NaiveTime;
use sqlx::FromRow;

use crate::error::{RentalError, RentalResult};
use crate::scheduling::WorkDay;
use crate::utils::logging::log_database_operation;

#[derive(Debug, Clone, FromRow)]
pub struct WorkDayRow {
    pub id: i64,
    pub day: i64,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl TryFrom<WorkDayRow> for WorkDay {
    type Error = RentalError;

    fn try_from(row: WorkDayRow) -> Result<Self, Self::Error> {
        let index = u8::try_from(row.day)
            .map_err(|_| RentalError::integrity(format!("work day {} has day {}", row.id, row.day)))?;
        Ok(WorkDay::from_index(index, row.start_time, row.end_time)?.with_id(row.id))
    }
}

impl WorkDay {
    /// Stores a window; an existing (day, start, end) triple is an `Integrity` error.
    pub async fn create(pool: &sqlx::SqlitePool, work_day: &WorkDay) -> RentalResult<WorkDay> {
        log_database_operation("INSERT", "work_days", Some(&work_day.to_string()));

        let result = sqlx::query("INSERT INTO work_days (day, start_time, end_time) VALUES (?, ?, ?)")
            .bind(i64::from(work_day.day_index()))
            .bind(work_day.start_time)
            .bind(work_day.end_time)
            .execute(pool)
            .await
            .map_err(|e| RentalError::from_unique_violation(e, format!("work day {} already exists", work_day)))?;

        Ok(work_day.clone().with_id(result.last_insert_rowid()))
    }

    pub async fn find_all(pool: &sqlx::SqlitePool) -> RentalResult<Vec<WorkDay>> {
        let rows = sqlx::query_as::<_, WorkDayRow>(
            "SELECT id, day, start_time, end_time FROM work_days ORDER BY day, start_time, end_time"
        )
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(WorkDay::try_from).collect()
    }

    pub async fn find_by_location(pool: &sqlx::SqlitePool, location_id: i64) -> RentalResult<Vec<WorkDay>> {
        let rows = sqlx::query_as::<_, WorkDayRow>(
            r#"
            SELECT w.id, w.day, w.start_time, w.end_time
            FROM work_days w
            JOIN service_location_work_days lw ON lw.work_day_id = w.id
            WHERE lw.service_location_id = ?
            ORDER BY w.day, w.start_time, w.end_time
            "#
        )
        .bind(location_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(WorkDay::try_from).collect()
    }

    /// Removes a window; location links go with it.
    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> RentalResult<bool> {
        log_database_operation("DELETE", "work_days", Some(&id.to_string()));

        let result = sqlx::query("DELETE FROM work_days WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
