use super::common::*;
use chrono::Duration;
use std::sync::Arc;

use crate::workflows::board::{
    ApplicationStatus, BoardError, Caller, JobBoardService, JobId, JobPatch, RepositoryError,
};

#[test]
fn capacity_one_closes_after_first_applicant() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (first, _) = register_seeker(&service, "seeker-a");
    let (second, _) = register_seeker(&service, "seeker-b");
    let job = post_job(&service, &employer, Some(1), None);

    let accepted = apply(&service, &first, job.id).expect("first applicant accepted");
    assert_eq!(accepted.status, ApplicationStatus::Pending);
    assert!(!stored_job(&store, job.id).is_active, "job closes at capacity");

    match apply(&service, &second, job.id) {
        Err(BoardError::JobFull { capacity: 1 }) => {}
        other => panic!("expected job full, got {other:?}"),
    }
    assert_eq!(stored_applications(&store, job.id).len(), 1);
    assert!(!stored_job(&store, job.id).is_active);
}

#[test]
fn full_jobs_keep_rejecting_without_creating_rows() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let job = post_job(&service, &employer, Some(2), None);

    for user in ["s1", "s2"] {
        let (seeker, _) = register_seeker(&service, user);
        apply(&service, &seeker, job.id).expect("under capacity");
    }
    for user in ["s3", "s4", "s5"] {
        let (seeker, _) = register_seeker(&service, user);
        let err = apply(&service, &seeker, job.id).expect_err("over capacity");
        assert_eq!(err.code(), "JOB_FULL");
    }

    assert_eq!(stored_applications(&store, job.id).len(), 2);
    assert!(!stored_job(&store, job.id).is_active);
}

#[test]
fn second_apply_by_same_seeker_is_a_duplicate() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let job = post_job(&service, &employer, None, None);

    apply(&service, &seeker, job.id).expect("first apply");
    match apply(&service, &seeker, job.id) {
        Err(BoardError::DuplicateApplication) => {}
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(stored_applications(&store, job.id).len(), 1);
}

#[test]
fn duplicate_is_reported_before_capacity() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let job = post_job(&service, &employer, Some(1), None);

    apply(&service, &seeker, job.id).expect("fills the job");
    let err = apply(&service, &seeker, job.id).expect_err("reapply");
    assert_eq!(err.code(), "ALREADY_APPLIED");
}

#[test]
fn unlimited_jobs_accept_concurrent_seekers() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let job = post_job(&service, &employer, Some(0), None);
    let seekers: Vec<Caller> = (0..10)
        .map(|n| register_seeker(&service, &format!("seeker-{n}")).0)
        .collect();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = seekers
            .iter()
            .map(|seeker| scope.spawn(|| apply(&service, seeker, job.id)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    assert!(results.iter().all(Result::is_ok), "every seeker is admitted");
    assert_eq!(stored_applications(&store, job.id).len(), 10);
    assert!(stored_job(&store, job.id).is_active);
}

#[test]
fn concurrent_applies_never_exceed_capacity() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let job = post_job(&service, &employer, Some(3), None);
    let seekers: Vec<Caller> = (0..10)
        .map(|n| register_seeker(&service, &format!("seeker-{n}")).0)
        .collect();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = seekers
            .iter()
            .map(|seeker| scope.spawn(|| apply(&service, seeker, job.id)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let full = results
        .iter()
        .filter(|result| matches!(result, Err(BoardError::JobFull { capacity: 3 })))
        .count();
    assert_eq!(accepted, 3);
    assert_eq!(full, 7);
    assert_eq!(stored_applications(&store, job.id).len(), 3);
    assert!(!stored_job(&store, job.id).is_active);
}

#[test]
fn deadline_day_still_accepts_and_the_next_day_closes() {
    let (service, store, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (early, _) = register_seeker(&service, "early");
    let (late, _) = register_seeker(&service, "late");
    let job = post_job(&service, &employer, None, Some(today()));

    apply(&service, &early, job.id).expect("deadline day is open");

    clock.advance(Duration::days(1));
    let err = apply(&service, &late, job.id).expect_err("past deadline");
    assert_eq!(err.code(), "JOB_CLOSED");

    let stored = stored_job(&store, job.id);
    assert!(!stored.is_active, "expiry rejection closes the job");
    assert_eq!(stored_applications(&store, job.id).len(), 1);
}

#[test]
fn manually_closed_jobs_reject_applications() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let job = post_job(&service, &employer, Some(5), None);

    service
        .update_job(
            &employer,
            job.id,
            JobPatch {
                is_active: Some(false),
                ..JobPatch::default()
            },
        )
        .expect("employer closes job");

    match apply(&service, &seeker, job.id) {
        Err(BoardError::JobClosed) => {}
        other => panic!("expected job closed, got {other:?}"),
    }
    assert!(stored_applications(&store, job.id).is_empty());
}

#[test]
fn capacity_closure_survives_withdrawals_and_reactivation_requests() {
    let (service, store, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let job = post_job(&service, &employer, Some(1), None);

    let application = apply(&service, &seeker, job.id).expect("fills the job");

    let reopened = service
        .update_job(
            &employer,
            job.id,
            JobPatch {
                is_active: Some(true),
                ..JobPatch::default()
            },
        )
        .expect("update runs");
    assert!(!reopened.is_active, "a full job cannot be reopened");

    service
        .delete_application(&seeker, application.id)
        .expect("seeker withdraws");
    assert!(stored_applications(&store, job.id).is_empty());
    assert!(
        !stored_job(&store, job.id).is_active,
        "withdrawal does not reopen a closed job"
    );
}

#[test]
fn raising_capacity_allows_reopening() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (first, _) = register_seeker(&service, "seeker-a");
    let (second, _) = register_seeker(&service, "seeker-b");
    let job = post_job(&service, &employer, Some(1), None);
    apply(&service, &first, job.id).expect("fills the job");

    let reopened = service
        .update_job(
            &employer,
            job.id,
            JobPatch {
                max_applicants: Some(Some(3)),
                is_active: Some(true),
                ..JobPatch::default()
            },
        )
        .expect("update runs");
    assert!(reopened.is_active);
    apply(&service, &second, job.id).expect("room again");
}

#[test]
fn explicit_nulls_clear_cap_and_deadline() {
    let (service, _, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (first, _) = register_seeker(&service, "seeker-a");
    let (second, _) = register_seeker(&service, "seeker-b");
    let job = post_job(&service, &employer, Some(1), Some(today()));

    let keep: JobPatch = serde_json::from_value(serde_json::json!({ "title": "Loader" }))
        .expect("patch parses");
    assert_eq!(keep.max_applicants, None);
    let edited = service.update_job(&employer, job.id, keep).expect("update runs");
    assert_eq!(edited.max_applicants, Some(1));
    assert_eq!(edited.deadline, Some(today()));

    let clear: JobPatch = serde_json::from_value(serde_json::json!({
        "max_applicants": null,
        "deadline": null,
    }))
    .expect("patch parses");
    assert_eq!(clear.max_applicants, Some(None));
    let cleared = service.update_job(&employer, job.id, clear).expect("update runs");
    assert_eq!(cleared.max_applicants, None);
    assert_eq!(cleared.deadline, None);

    clock.advance(Duration::days(3));
    apply(&service, &first, job.id).expect("no deadline any more");
    apply(&service, &second, job.id).expect("no cap any more");
}

#[test]
fn apply_requires_a_seeker_profile_and_an_existing_job() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let job = post_job(&service, &employer, None, None);

    let err = apply(&service, &Caller::seeker("no-profile"), job.id).expect_err("no profile");
    assert!(matches!(err, BoardError::NotFound("seeker profile")));

    let (seeker, _) = register_seeker(&service, "seeker-a");
    let err = apply(&service, &seeker, JobId(999)).expect_err("missing job");
    assert!(matches!(err, BoardError::NotFound("job")));
}

#[test]
fn profiles_are_unique_per_user_and_role_checked() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");

    let err = service
        .register_employer(&employer, employer_registration("Again"))
        .expect_err("second profile");
    assert_eq!(err.code(), "PROFILE_EXISTS");

    let err = service
        .register_employer(&Caller::seeker("s"), employer_registration("Wrong role"))
        .expect_err("seeker cannot register employer");
    assert_eq!(err.code(), "FORBIDDEN");
}

#[test]
fn job_management_is_limited_to_owner_or_staff() {
    let (service, _, _) = build_service();
    let (owner, _) = register_employer(&service, "owner");
    let (other, _) = register_employer(&service, "other");
    let job = post_job(&service, &owner, None, None);

    let err = service
        .update_job(&other, job.id, JobPatch::default())
        .expect_err("not the owner");
    assert!(matches!(err, BoardError::NotFound("job")));

    let staff = Caller::seeker("admin").staff();
    let updated = service
        .update_job(
            &staff,
            job.id,
            JobPatch {
                title: Some("Shift lead".to_string()),
                ..JobPatch::default()
            },
        )
        .expect("staff edits any job");
    assert_eq!(updated.title, "Shift lead");

    service.delete_job(&owner, job.id).expect("owner deletes");
    assert!(matches!(service.job(job.id), Err(BoardError::NotFound("job"))));
}

#[test]
fn blank_titles_fail_validation() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let err = service
        .create_job(&employer, job_input("   "))
        .expect_err("blank title");
    assert_eq!(err.code(), "VALIDATION_FAILED");

    let err = service
        .create_job(&employer, job_input(&"x".repeat(256)))
        .expect_err("title too long");
    assert_eq!(err.code(), "VALIDATION_FAILED");
}

#[test]
fn listing_closes_expired_jobs_and_scopes_by_role() {
    let (service, store, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let open = post_job(&service, &employer, None, None);
    let expiring = post_job(&service, &employer, None, Some(today()));

    clock.advance(Duration::days(2));
    let visible = service.list_jobs(&seeker).expect("seeker lists");
    let ids: Vec<JobId> = visible.iter().map(|job| job.id).collect();
    assert_eq!(ids, vec![open.id]);
    assert!(!stored_job(&store, expiring.id).is_active);

    let own = service.list_jobs(&employer).expect("employer lists");
    assert_eq!(own.len(), 2, "employers see their closed jobs too");
}

#[test]
fn listing_writes_only_when_a_job_has_expired() {
    let (service, store, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    post_job(&service, &employer, None, None);
    post_job(&service, &employer, None, Some(today()));

    let replica = JobBoardService::new(
        Arc::new(ReadOnlyStore(store.as_ref().clone())),
        clock.clone(),
    );
    let listed = replica.list_jobs(&employer).expect("nothing to sweep");
    assert_eq!(listed.len(), 2);

    clock.advance(Duration::days(1));
    let err = replica
        .list_jobs(&employer)
        .expect_err("expired job needs a write");
    assert_eq!(err.code(), "STORE_UNAVAILABLE");

    service.list_jobs(&employer).expect("sweep commits");
    let listed = replica.list_jobs(&employer).expect("already swept");
    assert_eq!(listed.iter().filter(|job| job.is_active).count(), 1);
}

#[test]
fn store_failures_surface_as_unavailable() {
    let service = JobBoardService::new(
        Arc::new(UnavailableStore),
        Arc::new(crate::workflows::board::ManualClock::new(start())),
    );
    let err = service
        .apply(&Caller::seeker("s"), JobId(1), Default::default())
        .expect_err("store is down");
    assert!(matches!(
        err,
        BoardError::Repository(RepositoryError::Unavailable(_))
    ));
    assert_eq!(err.code(), "STORE_UNAVAILABLE");
}
