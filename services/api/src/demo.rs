use crate::infra::{in_memory_service, parse_date, BoardService};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use job_board::config::BoardConfig;
use job_board::error::AppError;
use job_board::workflows::board::{
    ApplicationBucket, ApplyRequest, BoardError, Caller, Clock, EmployerRegistration, JobInput,
    JobPriority, ManualClock, SeekerRegistration,
};
use std::sync::Arc;

const STATUS_SCRIPT: [&str; 4] = ["review", "shortlisted", "hired", "rejected"];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Applicant cap for the demo posting (0 means unlimited)
    #[arg(long, default_value_t = 2)]
    pub(crate) capacity: u32,
    /// Number of job seekers who try to apply
    #[arg(long, default_value_t = 3)]
    pub(crate) seekers: usize,
    /// Calendar date the demo runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        capacity,
        seekers,
        date,
    } = args;

    let max_applicants = i32::try_from(capacity).map_err(|_| {
        BoardError::ValidationFailed(format!(
            "capacity {capacity} exceeds the largest applicant cap ({})",
            i32::MAX
        ))
    })?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let clock = Arc::new(ManualClock::new(
        date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(9),
    ));
    let service = in_memory_service(clock.clone(), BoardConfig::default());

    println!("Job board demo ({date})");
    let employer = Caller::employer("demo-employer");
    let profile = service.register_employer(&employer, demo_registration())?;
    let capped = service.create_job(
        &employer,
        JobInput {
            title: "Warehouse associate".to_string(),
            description: "Night shift, forklift certification a plus".to_string(),
            location: "Des Moines".to_string(),
            job_type: "full_time".to_string(),
            priority: JobPriority::Urgent,
            salary: Some(41_000),
            max_applicants: Some(max_applicants),
            deadline: Some(date + Duration::days(7)),
            category: None,
        },
    )?;
    println!(
        "- {} posted job {} '{}' (cap {})",
        profile.business_name,
        capped.id,
        capped.title,
        if capacity == 0 {
            "unlimited".to_string()
        } else {
            capacity.to_string()
        }
    );

    println!("\nApplications");
    let mut accepted = Vec::new();
    let mut applicants = Vec::new();
    for n in 1..=seekers {
        clock.advance(Duration::minutes(5));
        let seeker = register_seeker(&service, n)?;
        match service.apply(&seeker, capped.id, ApplyRequest::default()) {
            Ok(view) => {
                println!("  - {} -> accepted as application {}", seeker.user_id, view.id);
                accepted.push(view.id);
            }
            Err(err) => println!("  - {} -> rejected [{}] {}", seeker.user_id, err.code(), err),
        }
        applicants.push(seeker);
    }
    let job = service.job(capped.id)?;
    println!(
        "  Job {} is now {}",
        job.id,
        if job.is_active { "open" } else { "closed" }
    );

    println!("\nStatus updates");
    for (application, label) in accepted.iter().zip(STATUS_SCRIPT.iter().cycle()) {
        clock.advance(Duration::minutes(30));
        let change = service.update_status(&employer, *application, label)?;
        println!(
            "  - application {}: {} -> {} (via '{}')",
            change.application_id,
            change.previous.code(),
            change.status.code(),
            label
        );
    }
    if let Some(application) = accepted.first() {
        if let Err(err) = service.update_status(&employer, *application, "archived") {
            println!("  - 'archived' refused [{}] {}", err.code(), err);
        }
    }

    println!("\nBuckets");
    for bucket in ApplicationBucket::ALL {
        let views = service.applications_in_bucket(&employer, bucket)?;
        println!("  - {:<10} {}", bucket.slug(), views.len());
    }

    println!("\nDeadline");
    let expiring = service.create_job(
        &employer,
        JobInput {
            title: "Seasonal picker".to_string(),
            description: String::new(),
            location: "Ames".to_string(),
            job_type: "seasonal".to_string(),
            priority: JobPriority::Normal,
            salary: None,
            max_applicants: None,
            deadline: Some(clock.today()),
            category: None,
        },
    )?;
    clock.advance(Duration::days(1));
    if let Some(seeker) = applicants.first() {
        match service.apply(seeker, expiring.id, ApplyRequest::default()) {
            Ok(view) => println!("  - late application {} accepted", view.id),
            Err(err) => println!("  - late application refused [{}] {}", err.code(), err),
        }
    }

    let dashboard = service.dashboard(&employer)?;
    println!(
        "\nDashboard: {} jobs ({} active, {} expired), {} applications",
        dashboard.total_jobs,
        dashboard.active_jobs,
        dashboard.expired_jobs,
        dashboard.total_applications
    );

    Ok(())
}

fn register_seeker(service: &BoardService<ManualClock>, n: usize) -> Result<Caller, AppError> {
    let caller = Caller::seeker(format!("seeker-{n}"));
    service.register_seeker(
        &caller,
        SeekerRegistration {
            full_name: format!("Demo Seeker {n}"),
            headline: None,
            city: None,
        },
    )?;
    Ok(caller)
}

fn demo_registration() -> EmployerRegistration {
    EmployerRegistration {
        first_name: "Avery".to_string(),
        last_name: "Nguyen".to_string(),
        business_name: "Heartland Distribution".to_string(),
        city: "Des Moines".to_string(),
        phone: None,
        size: Some("51-200".to_string()),
        website: None,
        industry: Some("Logistics".to_string()),
        founded_year: Some(2004),
        contact_email: None,
        description: None,
    }
}
