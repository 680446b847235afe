//! Visibility scopes, supervisor validation and report authorization.

use std::collections::BTreeSet;

use celulas::errors::AppError;
use celulas::hierarchy;
use celulas::models::profile::{NewProfile, SupervisorRefs};
use celulas::models::role::Role;
use celulas::store::ProfileDirectory;

mod common;
use common::{add_profile, organization, refs};

#[tokio::test]
async fn test_lider_scope_is_self() {
    let org = organization().await;
    let scope = hierarchy::visibility_scope(&*org.store, &org.l2, Some(Role::Lider))
        .await
        .expect("scope");
    assert_eq!(scope, BTreeSet::from([org.l2.id]));
}

#[tokio::test]
async fn test_discipulador_scope_covers_only_their_leaders() {
    let org = organization().await;
    let scope = hierarchy::visibility_scope(&*org.store, &org.d1, Some(Role::Discipulador))
        .await
        .expect("scope");
    // The membro M also points at D1 but is not a leader.
    assert_eq!(scope, BTreeSet::from([org.l1.id, org.l2.id]));
}

#[tokio::test]
async fn test_obreiro_scope_unions_direct_and_transitive_leaders() {
    let org = organization().await;
    let scope = hierarchy::visibility_scope(&*org.store, &org.obreiro, Some(Role::Obreiro))
        .await
        .expect("scope");
    assert_eq!(
        scope,
        BTreeSet::from([org.l1.id, org.l2.id, org.l3.id, org.l4.id])
    );
    assert!(!scope.contains(&org.outsider.id));
}

#[tokio::test]
async fn test_leader_reachable_by_two_paths_counted_once() {
    let org = organization().await;
    let scope = hierarchy::visibility_scope(&*org.store, &org.obreiro, Some(Role::Obreiro))
        .await
        .expect("scope");
    let ids: Vec<i64> = scope.into_iter().collect();
    assert_eq!(ids.iter().filter(|id| **id == org.l1.id).count(), 1);
}

#[tokio::test]
async fn test_pastor_scope_is_every_leader() {
    let org = organization().await;
    let scope = hierarchy::visibility_scope(&*org.store, &org.pastor, Some(Role::Pastor))
        .await
        .expect("scope");
    assert_eq!(
        scope,
        BTreeSet::from([org.l1.id, org.l2.id, org.l3.id, org.l4.id, org.outsider.id])
    );
}

#[tokio::test]
async fn test_membro_and_unresolved_have_empty_scope() {
    let org = organization().await;
    for role in [Some(Role::Membro), None] {
        let scope = hierarchy::visibility_scope(&*org.store, &org.member, role)
            .await
            .expect("scope");
        assert!(scope.is_empty(), "{role:?} should see nothing");
    }
}

#[tokio::test]
async fn test_scope_does_not_mutate_profiles() {
    let org = organization().await;
    let before = org.store.all_profiles().await.expect("profiles");
    hierarchy::visibility_scope(&*org.store, &org.pastor, Some(Role::Pastor))
        .await
        .expect("scope");
    let after = org.store.all_profiles().await.expect("profiles");
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_profiles_by_role_and_supervisor() {
    let org = organization().await;

    let leaders = hierarchy::profiles_by_role_and_supervisor(&*org.store, Role::Lider, org.d1.id)
        .await
        .expect("list");
    let ids: Vec<i64> = leaders.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![org.l1.id, org.l2.id]);

    let disciplers =
        hierarchy::profiles_by_role_and_supervisor(&*org.store, Role::Discipulador, org.obreiro.id)
            .await
            .expect("list");
    let ids: Vec<i64> = disciplers.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![org.d1.id, org.d2.id]);

    // A leader supervises nobody.
    let none = hierarchy::profiles_by_role_and_supervisor(&*org.store, Role::Membro, org.l1.id)
        .await
        .expect("list");
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_supervisor_must_outrank_profile() {
    let org = organization().await;

    // A leader cannot supervise another leader.
    let new = NewProfile {
        name: "Bruno".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: SupervisorRefs {
            discipler_id: Some(org.l1.id),
            ..Default::default()
        },
    };
    let result = hierarchy::register_profile(&*org.store, &new).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Equal rank is rejected too.
    let new = NewProfile {
        name: "Ana".to_string(),
        role_label: Some("discipulador".to_string()),
        supervisors: SupervisorRefs {
            discipler_id: Some(org.d1.id),
            ..Default::default()
        },
    };
    assert!(hierarchy::register_profile(&*org.store, &new).await.is_err());
}

#[tokio::test]
async fn test_reference_must_hold_its_fields_role() {
    let org = organization().await;

    // D1 outranks a leader but is not an obreiro.
    let new = NewProfile {
        name: "Bruno".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: SupervisorRefs {
            obreiro_id: Some(org.d1.id),
            ..Default::default()
        },
    };
    match hierarchy::register_profile(&*org.store, &new).await {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("obreiroRef"), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // A pastor in the discipler slot is rejected as well.
    let new = NewProfile {
        name: "Bruno".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: SupervisorRefs {
            discipler_id: Some(org.pastor.id),
            ..Default::default()
        },
    };
    assert!(matches!(
        hierarchy::register_profile(&*org.store, &new).await,
        Err(AppError::Validation(_))
    ));

    // Reassignment applies the same rule.
    let result =
        hierarchy::reassign_supervisors(&*org.store, org.l2.id, &refs(None, Some(&org.d2), None))
            .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let ok = NewProfile {
        name: "Bruno".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: refs(Some(&org.d2), Some(&org.obreiro), Some(&org.pastor)),
    };
    assert!(hierarchy::register_profile(&*org.store, &ok).await.is_ok());
}

#[tokio::test]
async fn test_missing_supervisor_is_rejected() {
    let org = organization().await;
    let new = NewProfile {
        name: "Bruno".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: SupervisorRefs {
            obreiro_id: Some(424_242),
            ..Default::default()
        },
    };
    match hierarchy::register_profile(&*org.store, &new).await {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("424242"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unresolved_role_ranks_as_membro() {
    let org = organization().await;
    // "Visitante" resolves to no role; any discipler outranks it.
    let guest = add_profile(&org.store, "Gil", "Visitante", refs(Some(&org.d1), None, None)).await;
    assert_eq!(guest.role(), None);
    assert_eq!(guest.effective_role(), Role::Membro);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let org = organization().await;
    let new = NewProfile {
        name: "   ".to_string(),
        role_label: Some("lider".to_string()),
        supervisors: SupervisorRefs::default(),
    };
    assert!(matches!(
        hierarchy::register_profile(&*org.store, &new).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_reassign_supervisors_moves_leader_between_disciplers() {
    let org = organization().await;
    let moved = hierarchy::reassign_supervisors(
        &*org.store,
        org.l2.id,
        &refs(Some(&org.d2), None, None),
    )
    .await
    .expect("reassign");
    assert_eq!(moved.supervisors(), refs(Some(&org.d2), None, None));

    let d2_scope = hierarchy::visibility_scope(&*org.store, &org.d2, Some(Role::Discipulador))
        .await
        .expect("scope");
    assert_eq!(d2_scope, BTreeSet::from([org.l2.id, org.l3.id]));
}

#[tokio::test]
async fn test_reassign_unknown_profile_is_not_found() {
    let org = organization().await;
    let result =
        hierarchy::reassign_supervisors(&*org.store, 777_777, &SupervisorRefs::default()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_authorize_submission() {
    let org = organization().await;
    let s = &*org.store;

    assert!(hierarchy::authorize_submission(s, org.l1.id, None).await.is_ok());
    assert!(hierarchy::authorize_submission(s, org.l1.id, Some(org.l1.id)).await.is_ok());
    assert!(hierarchy::authorize_submission(s, org.l1.id, Some(org.pastor.id)).await.is_ok());

    let by_discipler = hierarchy::authorize_submission(s, org.l1.id, Some(org.d1.id)).await;
    assert!(matches!(by_discipler, Err(AppError::PermissionDenied(_))));

    let for_non_leader = hierarchy::authorize_submission(s, org.d1.id, None).await;
    assert!(matches!(for_non_leader, Err(AppError::Validation(_))));

    let unknown = hierarchy::authorize_submission(s, 5_555, None).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}
