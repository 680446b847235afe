use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::errors::AppError;
use crate::models::participant;
use crate::models::period::DateRange;
use super::types::{CellReport, LostParticipant, Phase, ReportInput};

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    leader_id: i64,
    week_start: NaiveDate,
    members_present: Vec<i64>,
    attendees_present: Vec<i64>,
    phase: String,
    multiplication_date: Option<NaiveDate>,
    observations: String,
    visitor_count: Option<i32>,
    lost_participants: Json<Vec<LostParticipant>>,
}

impl TryFrom<Row> for CellReport {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let phase = Phase::parse(&row.phase).ok_or_else(|| {
            AppError::Malformed(format!("report {} has phase {:?}", row.id, row.phase))
        })?;
        let visitor_count = row
            .visitor_count
            .map(u32::try_from)
            .transpose()
            .map_err(|_| AppError::Malformed(format!("report {} has negative visitor count", row.id)))?;
        Ok(CellReport {
            id: row.id,
            leader_id: row.leader_id,
            week_start: row.week_start,
            members_present: row.members_present,
            attendees_present: row.attendees_present,
            phase,
            multiplication_date: row.multiplication_date,
            observations: row.observations,
            visitor_count,
            lost_participants: row.lost_participants.0,
        })
    }
}

const SELECT_REPORT: &str = "\
    SELECT id, leader_id, week_start, members_present, attendees_present, phase, \
           multiplication_date, observations, visitor_count, lost_participants \
    FROM cell_reports";

fn collect(rows: Vec<Row>) -> Result<Vec<CellReport>, AppError> {
    rows.into_iter().map(CellReport::try_from).collect()
}

/// Insert after checking every participant against the leader's roster,
/// inside one transaction.
pub async fn create(pool: &PgPool, input: &ReportInput) -> Result<CellReport, AppError> {
    let mut tx = pool.begin().await?;

    let roster = participant::queries::find_by_leader(&mut *tx, input.leader_id).await?;
    input.check_roster(&roster)?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO cell_reports \
            (leader_id, week_start, members_present, attendees_present, phase, \
             multiplication_date, observations, visitor_count, lost_participants) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(input.leader_id)
    .bind(input.week_start)
    .bind(&input.members_present)
    .bind(&input.attendees_present)
    .bind(input.phase.label())
    .bind(input.multiplication_date)
    .bind(&input.observations)
    .bind(input.visitor_count.map(|n| n as i32))
    .bind(Json(&input.lost_participants))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(CellReport::from_input(id, input))
}

/// Full replacement of every field.
pub async fn update(pool: &PgPool, id: i64, input: &ReportInput) -> Result<CellReport, AppError> {
    let mut tx = pool.begin().await?;

    let roster = participant::queries::find_by_leader(&mut *tx, input.leader_id).await?;
    input.check_roster(&roster)?;

    let result = sqlx::query(
        "UPDATE cell_reports SET \
            leader_id = $2, week_start = $3, members_present = $4, attendees_present = $5, \
            phase = $6, multiplication_date = $7, observations = $8, visitor_count = $9, \
            lost_participants = $10 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(input.leader_id)
    .bind(input.week_start)
    .bind(&input.members_present)
    .bind(&input.attendees_present)
    .bind(input.phase.label())
    .bind(input.multiplication_date)
    .bind(&input.observations)
    .bind(input.visitor_count.map(|n| n as i32))
    .bind(Json(&input.lost_participants))
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("report {id}")));
    }
    tx.commit().await?;
    Ok(CellReport::from_input(id, input))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM cell_reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("report {id}")));
    }
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<CellReport>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_REPORT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(CellReport::try_from).transpose()
}

/// Reports of the given leaders with `week_start` in range, newest first.
pub async fn find_by_leaders(
    pool: &PgPool,
    leader_ids: &[i64],
    range: &DateRange,
) -> Result<Vec<CellReport>, AppError> {
    if leader_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_REPORT} WHERE leader_id = ANY($1) AND week_start BETWEEN $2 AND $3 \
         ORDER BY week_start DESC, id DESC"
    ))
    .bind(leader_ids)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;
    collect(rows)
}

/// Every report in range, newest first.
pub async fn find_in_range(pool: &PgPool, range: &DateRange) -> Result<Vec<CellReport>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_REPORT} WHERE week_start BETWEEN $1 AND $2 ORDER BY week_start DESC, id DESC"
    ))
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;
    collect(rows)
}

pub async fn find_latest_for_leader(
    pool: &PgPool,
    leader_id: i64,
) -> Result<Option<CellReport>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_REPORT} WHERE leader_id = $1 ORDER BY week_start DESC, id DESC LIMIT 1"
    ))
    .bind(leader_id)
    .fetch_optional(pool)
    .await?;
    row.map(CellReport::try_from).transpose()
}
