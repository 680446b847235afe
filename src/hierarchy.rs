//! Leadership hierarchy: visibility scopes and supervisor-reference rules.
//!
//! A profile's upward references (`disciplerRef`, `obreiroRef`, `pastorRef`)
//! must resolve to profiles of the matching role and of strictly higher rank. Scopes are computed
//! fresh on every call and are always returned as a de-duplicated,
//! ordered set of leader ids.

use std::collections::BTreeSet;

use crate::errors::AppError;
use crate::models::profile::{NewProfile, Profile, SupervisorLink, SupervisorRefs};
use crate::models::role::{self, Role};
use crate::store::ProfileDirectory;

fn leader_ids(profiles: &[Profile]) -> impl Iterator<Item = i64> + '_ {
    profiles
        .iter()
        .filter(|p| p.role() == Some(Role::Lider))
        .map(|p| p.id)
}

/// Leader ids whose reports `profile` may aggregate when acting as `role`.
pub async fn visibility_scope(
    directory: &dyn ProfileDirectory,
    profile: &Profile,
    role: Option<Role>,
) -> Result<BTreeSet<i64>, AppError> {
    let mut scope = BTreeSet::new();
    match role {
        Some(Role::Lider) => {
            scope.insert(profile.id);
        }
        Some(Role::Discipulador) => {
            let led = directory
                .profiles_by_supervisor(SupervisorLink::Discipler, profile.id)
                .await?;
            scope.extend(leader_ids(&led));
        }
        Some(Role::Obreiro) => {
            // One read returns both the direct leaders and the disciplers.
            let supervised = directory
                .profiles_by_supervisor(SupervisorLink::Obreiro, profile.id)
                .await?;
            scope.extend(leader_ids(&supervised));

            for discipler in supervised
                .iter()
                .filter(|p| p.role() == Some(Role::Discipulador))
            {
                let led = directory
                    .profiles_by_supervisor(SupervisorLink::Discipler, discipler.id)
                    .await?;
                scope.extend(leader_ids(&led));
            }
        }
        Some(Role::Pastor) => {
            let everyone = directory.all_profiles().await?;
            scope.extend(leader_ids(&everyone));
        }
        Some(Role::Membro) | None => {}
    }
    Ok(scope)
}

/// Profiles of canonical `role` that report directly to `supervisor_id`. The
/// reference followed is chosen by the supervisor's own canonical role.
pub async fn profiles_by_role_and_supervisor(
    directory: &dyn ProfileDirectory,
    role: Role,
    supervisor_id: i64,
) -> Result<Vec<Profile>, AppError> {
    let supervisor = directory
        .find_profile(supervisor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {supervisor_id}")))?;

    let Some(link) = supervisor.role().and_then(SupervisorLink::for_role) else {
        return Ok(Vec::new());
    };

    let mut profiles = directory.profiles_by_supervisor(link, supervisor_id).await?;
    profiles.retain(|p| p.role() == Some(role));
    Ok(profiles)
}

/// Every present reference must resolve to a profile holding that
/// reference's own role (`disciplerRef` a discipulador, and so on) and
/// ranked strictly above `role_label`'s canonical role. Unresolved labels
/// rank as membro.
pub async fn validate_supervisors(
    directory: &dyn ProfileDirectory,
    role_label: Option<&str>,
    refs: &SupervisorRefs,
) -> Result<(), AppError> {
    let own = role::effective_role(role_label);
    let mut errors = Vec::new();

    for (link, id) in refs.present() {
        let expected = link.role();
        match directory.find_profile(id).await? {
            None => errors.push(format!("{} {id} does not exist", link.field())),
            Some(supervisor) if supervisor.role() != Some(expected) => {
                errors.push(format!(
                    "{} {id} is a {}, expected a {expected}",
                    link.field(),
                    supervisor.effective_role()
                ));
            }
            Some(_) if expected <= own => {
                errors.push(format!(
                    "{} {id} is a {expected}, which does not rank above {own}",
                    link.field()
                ));
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub async fn register_profile(
    directory: &dyn ProfileDirectory,
    new: &NewProfile,
) -> Result<Profile, AppError> {
    if new.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    validate_supervisors(directory, new.role_label.as_deref(), &new.supervisors).await?;
    let profile = directory.insert_profile(new).await?;
    log::info!(
        "Registered profile {} ({}) as {}",
        profile.id,
        profile.name,
        profile.effective_role()
    );
    Ok(profile)
}

/// Administrative reassignment of a profile's upward references.
pub async fn reassign_supervisors(
    directory: &dyn ProfileDirectory,
    id: i64,
    refs: &SupervisorRefs,
) -> Result<Profile, AppError> {
    let profile = directory
        .find_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
    validate_supervisors(directory, profile.role_label.as_deref(), refs).await?;
    let updated = directory.set_supervisors(id, refs).await?;
    log::info!("Reassigned supervisors of profile {id}: {refs:?}");
    Ok(updated)
}

/// Who may write a report for `leader_id`: the leader, or a pastor acting on
/// the leader's behalf.
pub async fn authorize_submission(
    directory: &dyn ProfileDirectory,
    leader_id: i64,
    submitted_by: Option<i64>,
) -> Result<(), AppError> {
    let leader = directory
        .find_profile(leader_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("leader {leader_id}")))?;
    if leader.role() != Some(Role::Lider) {
        return Err(AppError::validation(format!(
            "Profile {leader_id} is not a leader (role {})",
            leader.effective_role()
        )));
    }

    match submitted_by {
        None => Ok(()),
        Some(id) if id == leader_id => Ok(()),
        Some(id) => {
            let submitter = directory
                .find_profile(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;
            if submitter.role() == Some(Role::Pastor) {
                Ok(())
            } else {
                Err(AppError::PermissionDenied(format!(
                    "profile {id} may not submit reports for leader {leader_id}"
                )))
            }
        }
    }
}
