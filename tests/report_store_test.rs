//! Report CRUD and roster enforcement against `MemoryStore`.

use celulas::errors::AppError;
use celulas::models::participant::ParticipantKind;
use celulas::models::period::DateRange;
use celulas::models::report::{LostParticipant, LostReason, Phase};
use celulas::store::{ParticipantRoster, ReportStore};

mod common;
use common::{add_roster, date, input, organization};

#[tokio::test]
async fn test_create_then_read_is_field_for_field_equal() {
    let org = organization().await;
    let members = add_roster(&org.store, org.l1.id, ParticipantKind::Membro, 3).await;
    let visitors = add_roster(&org.store, org.l1.id, ParticipantKind::Frequentador, 2).await;

    let mut new = input(org.l1.id, date(2024, 3, 4), &members, &visitors);
    new.phase = Phase::Multiplicacao;
    new.multiplication_date = Some(date(2024, 6, 1));
    new.observations = "  Louvor e oração  ".to_string();
    new.visitor_count = Some(4);
    new.lost_participants = vec![LostParticipant {
        participant_id: members[0],
        reason: LostReason::Amarelo,
    }];

    let created = org.store.create_report(&new).await.expect("create");
    let read = org
        .store
        .find_report(created.id)
        .await
        .expect("read")
        .expect("exists");

    assert_eq!(read, created);
    assert_eq!(read.observations, "  Louvor e oração  ");
    assert_eq!(read.members_present, members);
    assert_eq!(read.effective_member_count(), 2);
}

#[tokio::test]
async fn test_cross_roster_reference_is_rejected() {
    let org = organization().await;
    let own = add_roster(&org.store, org.l1.id, ParticipantKind::Membro, 2).await;
    let foreign = add_roster(&org.store, org.l2.id, ParticipantKind::Membro, 1).await;

    let mut members = own.clone();
    members.push(foreign[0]);
    let result = org
        .store
        .create_report(&input(org.l1.id, date(2024, 3, 4), &members, &[]))
        .await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains(&foreign[0].to_string()));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lost_entry_must_be_on_roster() {
    let org = organization().await;
    let own = add_roster(&org.store, org.l1.id, ParticipantKind::Membro, 1).await;
    let mut new = input(org.l1.id, date(2024, 3, 4), &own, &[]);
    new.lost_participants.push(LostParticipant {
        participant_id: 987_654,
        reason: LostReason::Critico,
    });
    assert!(matches!(
        org.store.create_report(&new).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_replaces_and_rechecks_roster() {
    let org = organization().await;
    let own = add_roster(&org.store, org.l1.id, ParticipantKind::Membro, 3).await;
    let created = org
        .store
        .create_report(&input(org.l1.id, date(2024, 3, 4), &own, &[]))
        .await
        .expect("create");

    let mut replacement = input(org.l1.id, date(2024, 3, 11), &own[..1], &[]);
    replacement.phase = Phase::Evangelismo;
    let updated = org
        .store
        .update_report(created.id, &replacement)
        .await
        .expect("update");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.week_start, date(2024, 3, 11));
    assert_eq!(updated.members_present, own[..1].to_vec());
    assert_eq!(updated.phase, Phase::Evangelismo);

    let foreign = add_roster(&org.store, org.l3.id, ParticipantKind::Membro, 1).await;
    let bad = input(org.l1.id, date(2024, 3, 11), &foreign, &[]);
    assert!(matches!(
        org.store.update_report(created.id, &bad).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_and_delete_missing_report_are_not_found() {
    let org = organization().await;
    let missing = input(org.l1.id, date(2024, 3, 4), &[], &[]);
    assert!(matches!(
        org.store.update_report(31_337, &missing).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        org.store.delete_report(31_337).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_report() {
    let org = organization().await;
    let report = common::submit(&org.store, org.l1.id, date(2024, 3, 4), 2, 1).await;
    org.store.delete_report(report.id).await.expect("delete");
    assert!(org.store.find_report(report.id).await.expect("read").is_none());
}

#[tokio::test]
async fn test_list_by_leader_and_period_newest_first() {
    let org = organization().await;
    let a = common::submit(&org.store, org.l1.id, date(2024, 2, 26), 1, 0).await;
    let b = common::submit(&org.store, org.l1.id, date(2024, 3, 11), 1, 0).await;
    let c = common::submit(&org.store, org.l1.id, date(2024, 3, 4), 1, 0).await;
    common::submit(&org.store, org.l2.id, date(2024, 3, 4), 1, 0).await;

    let march = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).expect("range");
    let listed = org
        .store
        .list_by_leader_and_period(org.l1.id, &march)
        .await
        .expect("list");
    let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![b.id, c.id]);

    let everything = org
        .store
        .list_by_leader_and_period(org.l1.id, &DateRange::unbounded())
        .await
        .expect("list");
    let ids: Vec<i64> = everything.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn test_latest_report_is_by_week_start() {
    let org = organization().await;
    let newer = common::submit(&org.store, org.l1.id, date(2024, 4, 1), 1, 0).await;
    common::submit(&org.store, org.l1.id, date(2024, 3, 4), 1, 0).await;
    let latest = org
        .store
        .latest_report(org.l1.id)
        .await
        .expect("latest")
        .expect("exists");
    assert_eq!(latest.id, newer.id);
}

#[tokio::test]
async fn test_roster_lists_only_own_participants() {
    let org = organization().await;
    let own = add_roster(&org.store, org.l1.id, ParticipantKind::Frequentador, 2).await;
    add_roster(&org.store, org.l2.id, ParticipantKind::Membro, 3).await;
    let roster = org.store.roster(org.l1.id).await.expect("roster");
    let ids: Vec<i64> = roster.iter().map(|p| p.id).collect();
    assert_eq!(ids, own);
    assert!(roster.iter().all(|p| p.kind == ParticipantKind::Frequentador));
}

#[tokio::test]
async fn test_offline_store_fails_writes() {
    let org = organization().await;
    org.store.set_unavailable(true);
    let result = org
        .store
        .create_report(&input(org.l1.id, date(2024, 3, 4), &[], &[]))
        .await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}
