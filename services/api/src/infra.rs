use chrono::NaiveDate;
use job_board::config::BoardConfig;
use job_board::workflows::board::{Clock, InMemoryBoardStore, JobBoardService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type BoardService<C> = JobBoardService<InMemoryBoardStore, C>;

pub(crate) fn in_memory_service<C>(clock: Arc<C>, config: BoardConfig) -> Arc<BoardService<C>>
where
    C: Clock + 'static,
{
    let store = Arc::new(InMemoryBoardStore::default());
    Arc::new(JobBoardService::with_config(store, clock, config))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
