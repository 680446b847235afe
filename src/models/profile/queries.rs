use sqlx::PgPool;

use crate::errors::AppError;
use super::types::{NewProfile, Profile, SupervisorLink, SupervisorRefs};

const SELECT_PROFILE: &str = "\
    SELECT id, name, role_label, discipler_id, obreiro_id, pastor_id \
    FROM profiles";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Profile>, AppError> {
    let profile = sqlx::query_as::<_, Profile>(&format!("{SELECT_PROFILE} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

/// Profiles whose `link` reference points at `supervisor_id`, regardless of role.
/// Role filtering happens after normalization, never in SQL.
pub async fn find_by_supervisor(
    pool: &PgPool,
    link: SupervisorLink,
    supervisor_id: i64,
) -> Result<Vec<Profile>, AppError> {
    let sql = format!("{SELECT_PROFILE} WHERE {} = $1 ORDER BY id", link.column());
    let profiles = sqlx::query_as::<_, Profile>(&sql)
        .bind(supervisor_id)
        .fetch_all(pool)
        .await?;
    Ok(profiles)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Profile>, AppError> {
    let profiles = sqlx::query_as::<_, Profile>(&format!("{SELECT_PROFILE} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(profiles)
}

pub async fn create(pool: &PgPool, new: &NewProfile) -> Result<Profile, AppError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO profiles (name, role_label, discipler_id, obreiro_id, pastor_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(new.name.trim())
    .bind(new.role_label.as_deref())
    .bind(new.supervisors.discipler_id)
    .bind(new.supervisors.obreiro_id)
    .bind(new.supervisors.pastor_id)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))
}

pub async fn update_supervisors(
    pool: &PgPool,
    id: i64,
    refs: &SupervisorRefs,
) -> Result<Profile, AppError> {
    let result = sqlx::query(
        "UPDATE profiles SET discipler_id = $2, obreiro_id = $3, pastor_id = $4 WHERE id = $1",
    )
    .bind(id)
    .bind(refs.discipler_id)
    .bind(refs.obreiro_id)
    .bind(refs.pastor_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("profile {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))
}
