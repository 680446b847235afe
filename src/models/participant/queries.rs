use sqlx::PgPool;

use crate::errors::AppError;
use super::types::{NewParticipant, Participant, ParticipantKind};

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    leader_id: i64,
    name: String,
    kind: String,
}

impl TryFrom<Row> for Participant {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let kind = ParticipantKind::parse(&row.kind).ok_or_else(|| {
            AppError::Malformed(format!("participant {} has kind {:?}", row.id, row.kind))
        })?;
        Ok(Participant {
            id: row.id,
            leader_id: row.leader_id,
            name: row.name,
            kind,
        })
    }
}

pub async fn create(
    pool: &PgPool,
    leader_id: i64,
    new: &NewParticipant,
) -> Result<Participant, AppError> {
    let row = sqlx::query_as::<_, Row>(
        "INSERT INTO participants (leader_id, name, kind) VALUES ($1, $2, $3) \
         RETURNING id, leader_id, name, kind",
    )
    .bind(leader_id)
    .bind(new.name.trim())
    .bind(new.kind.as_str())
    .fetch_one(pool)
    .await?;
    row.try_into()
}

/// A leader's roster, ordered by id.
pub async fn find_by_leader<'e, E>(executor: E, leader_id: i64) -> Result<Vec<Participant>, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, leader_id, name, kind FROM participants WHERE leader_id = $1 ORDER BY id",
    )
    .bind(leader_id)
    .fetch_all(executor)
    .await?;
    rows.into_iter().map(Participant::try_from).collect()
}
