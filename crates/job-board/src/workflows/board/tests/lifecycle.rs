use super::common::*;
use chrono::Duration;

use crate::workflows::board::{
    BoardError, Caller, CategoryInput, EmployerId, EmployerPatch, JobInput, JobPatch,
    JobPriority, JobSearch,
};

fn category(service: &TestService, caller: &Caller, name: &str) -> crate::workflows::board::JobCategory {
    service
        .create_category(
            caller,
            CategoryInput {
                name: name.to_string(),
            },
        )
        .expect("category created")
}

#[test]
fn search_ranks_by_priority_then_recency() {
    let (service, _, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let drivers = category(&service, &employer, "Drivers");

    let normal = service
        .create_job(&employer, job_input("Route driver"))
        .expect("posted");
    clock.advance(Duration::minutes(1));
    let featured = service
        .create_job(
            &employer,
            JobInput {
                priority: JobPriority::Featured,
                location: "Ames".to_string(),
                ..job_input("Dock supervisor")
            },
        )
        .expect("posted");
    clock.advance(Duration::minutes(1));
    let urgent = service
        .create_job(
            &employer,
            JobInput {
                priority: JobPriority::Urgent,
                category: Some(drivers.id),
                ..job_input("Yard jockey")
            },
        )
        .expect("posted");
    clock.advance(Duration::minutes(1));
    let newest_normal = service
        .create_job(&employer, job_input("Packer"))
        .expect("posted");

    let results = service.search_jobs(&JobSearch::default()).expect("search");
    let ids: Vec<_> = results.results.iter().map(|hit| hit.id).collect();
    assert_eq!(ids, vec![featured.id, urgent.id, newest_normal.id, normal.id]);
    assert_eq!(results.count, 4);

    let by_category = service
        .search_jobs(&JobSearch {
            q: Some("DRIVERS".to_string()),
            loc: None,
        })
        .expect("search");
    let ids: Vec<_> = by_category.results.iter().map(|hit| hit.id).collect();
    assert_eq!(ids, vec![urgent.id], "category names are searchable");

    let in_ames = service
        .search_jobs(&JobSearch {
            q: None,
            loc: Some("ames".to_string()),
        })
        .expect("search");
    assert_eq!(in_ames.count, 1);
    assert_eq!(in_ames.results[0].id, featured.id);
}

#[test]
fn search_skips_closed_and_expired_jobs() {
    let (service, _, clock) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let open = post_job(&service, &employer, None, None);
    post_job(&service, &employer, None, Some(today()));
    let closed = post_job(&service, &employer, None, None);
    service
        .update_job(
            &employer,
            closed.id,
            JobPatch {
                is_active: Some(false),
                ..JobPatch::default()
            },
        )
        .expect("close job");

    clock.advance(Duration::days(1));
    let results = service.search_jobs(&JobSearch::default()).expect("search");
    let ids: Vec<_> = results.results.iter().map(|hit| hit.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[test]
fn categories_are_scoped_to_their_owner() {
    let (service, store, _) = build_service();
    let (owner, _) = register_employer(&service, "owner");
    let (other, _) = register_employer(&service, "other");
    let warehouse = category(&service, &owner, "Warehouse");
    category(&service, &other, "Retail");

    let listed = service.list_categories(&owner).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Warehouse");

    let staff = Caller::employer("admin").staff();
    assert_eq!(service.list_categories(&staff).expect("list").len(), 2);

    let err = service
        .list_categories(&Caller::seeker("s"))
        .expect_err("seekers cannot list categories");
    assert_eq!(err.code(), "FORBIDDEN");

    let err = service
        .category(&other, warehouse.id)
        .expect_err("not the owner");
    assert!(matches!(err, BoardError::NotFound("category")));

    let renamed = service
        .rename_category(
            &owner,
            warehouse.id,
            CategoryInput {
                name: "Distribution".to_string(),
            },
        )
        .expect("rename");
    assert_eq!(renamed.name, "Distribution");

    let job = service
        .create_job(
            &owner,
            JobInput {
                category: Some(warehouse.id),
                ..job_input("Picker")
            },
        )
        .expect("posted");
    assert_eq!(job.category_name.as_deref(), Some("Distribution"));

    service
        .delete_category(&owner, warehouse.id)
        .expect("delete");
    assert_eq!(stored_job(&store, job.id).category_id, None);
}

#[test]
fn jobs_reject_unknown_categories() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let err = service
        .create_job(
            &employer,
            JobInput {
                category: Some(crate::workflows::board::CategoryId(77)),
                ..job_input("Picker")
            },
        )
        .expect_err("unknown category");
    assert_eq!(err.code(), "VALIDATION_FAILED");
}

#[test]
fn companies_report_job_counts() {
    let (service, _, _) = build_service();
    let (busy, busy_profile) = register_employer(&service, "busy");
    register_employer(&service, "quiet");
    post_job(&service, &busy, None, None);
    post_job(&service, &busy, None, None);

    let companies = service.companies().expect("companies");
    assert_eq!(companies.len(), 2);
    let busy_view = companies
        .iter()
        .find(|company| company.id == busy_profile.id)
        .expect("busy company listed");
    assert_eq!(busy_view.job_count, 2);

    let jobs = service.company_jobs(busy_profile.id).expect("company jobs");
    assert_eq!(jobs.jobs.len(), 2);
    assert_eq!(jobs.company.business_name, "busy Freight");

    let err = service
        .company_jobs(EmployerId(999))
        .expect_err("unknown company");
    assert!(matches!(err, BoardError::NotFound("company")));
}

#[test]
fn employer_profile_updates_are_partial() {
    let (service, _, clock) = build_service();
    let (employer, profile) = register_employer(&service, "emp-1");
    clock.advance(Duration::hours(1));

    let updated = service
        .update_employer_profile(
            &employer,
            EmployerPatch {
                website: Some("https://freight.example".to_string()),
                ..EmployerPatch::default()
            },
        )
        .expect("update");
    assert_eq!(updated.website.as_deref(), Some("https://freight.example"));
    assert_eq!(updated.business_name, profile.business_name);
    assert!(updated.updated_at > profile.updated_at);

    let err = service
        .update_employer_profile(
            &employer,
            EmployerPatch {
                city: Some(" ".to_string()),
                ..EmployerPatch::default()
            },
        )
        .expect_err("blank city");
    assert_eq!(err.code(), "VALIDATION_FAILED");
    assert_eq!(
        service.employer_profile(&employer).expect("profile").city,
        profile.city
    );
}

#[test]
fn application_detail_is_visible_to_involved_parties() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (outsider, _) = register_employer(&service, "emp-2");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let (other_seeker, _) = register_seeker(&service, "seeker-b");
    let job = post_job(&service, &employer, None, None);
    let application = apply(&service, &seeker, job.id).expect("applies");

    for caller in [&employer, &seeker] {
        let view = service
            .application(caller, application.id)
            .expect("visible");
        assert_eq!(view.job_title, job.title);
        assert_eq!(view.seeker_name, "Seeker seeker-a");
    }
    service
        .application(&Caller::seeker("admin").staff(), application.id)
        .expect("staff see everything");

    for caller in [&outsider, &other_seeker] {
        let err = service
            .application(caller, application.id)
            .expect_err("not involved");
        assert!(matches!(err, BoardError::Forbidden(_)));
    }

    let err = service
        .delete_application(&other_seeker, application.id)
        .expect_err("cannot withdraw others");
    assert_eq!(err.code(), "FORBIDDEN");
    service
        .delete_application(&employer, application.id)
        .expect("owning employer removes");
}

#[test]
fn seekers_see_only_their_own_applications() {
    let (service, _, _) = build_service();
    let (employer, _) = register_employer(&service, "emp-1");
    let (seeker, _) = register_seeker(&service, "seeker-a");
    let (other, _) = register_seeker(&service, "seeker-b");
    let first = post_job(&service, &employer, None, None);
    let second = post_job(&service, &employer, None, None);
    apply(&service, &seeker, first.id).expect("applies");
    apply(&service, &seeker, second.id).expect("applies");
    apply(&service, &other, first.id).expect("applies");

    let mine = service.seeker_applications(&seeker).expect("listing");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|view| view.seeker_name == "Seeker seeker-a"));

    let for_job = service
        .job_applications(&employer, first.id)
        .expect("owner lists job applications");
    assert_eq!(for_job.len(), 2);

    let err = service
        .job_applications(&seeker, first.id)
        .expect_err("seekers cannot list a job's applicants");
    assert!(matches!(err, BoardError::Forbidden(_)));
}
