use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{info, warn};

use crate::model::{GeneSearchResult, HpcSummary, NarrativeResult, NaturalSize, SelectionRect};

use super::{AppContext, GeneDataset, SlideImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Analysis,
    Narrative,
    GeneSearch,
    LoadSlide,
}

impl JobKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Narrative => "narrative",
            Self::GeneSearch => "gene-search",
            Self::LoadSlide => "load-slide",
        }
    }
}

/// Identifies one submitted job and the session generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    pub id: u64,
    pub kind: JobKind,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum JobRequest {
    Analysis(SelectionRect),
    Narrative(HpcSummary),
    GeneSearch {
        query: String,
        natural: NaturalSize,
        loaded: Option<Arc<GeneDataset>>,
    },
    LoadSlide(String),
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Analysis(_) => JobKind::Analysis,
            Self::Narrative(_) => JobKind::Narrative,
            Self::GeneSearch { .. } => JobKind::GeneSearch,
            Self::LoadSlide(_) => JobKind::LoadSlide,
        }
    }
}

#[derive(Debug, Clone)]
pub enum JobOutcome {
    Analysis(HpcSummary),
    Narrative(NarrativeResult),
    GeneSearch(GeneSearchResult),
    Slide(Result<Arc<SlideImage>, String>),
}

#[derive(Debug, Clone)]
pub struct JobEvent {
    pub ticket: JobTicket,
    pub outcome: JobOutcome,
}

/// Executes a request on the calling thread.
pub fn execute(context: &AppContext, request: JobRequest) -> JobOutcome {
    match request {
        JobRequest::Analysis(region) => JobOutcome::Analysis(context.analysis().run(region)),
        JobRequest::Narrative(summary) => JobOutcome::Narrative(context.narrative().enrich(&summary)),
        JobRequest::GeneSearch {
            query,
            natural,
            loaded,
        } => JobOutcome::GeneSearch(context.genes().search(&query, natural, loaded.as_deref())),
        JobRequest::LoadSlide(source) => JobOutcome::Slide(
            context
                .slides()
                .load(&source)
                .map(Arc::new)
                .map_err(|error| error.to_string()),
        ),
    }
}

/// Runs requests on background threads and hands completions back to the UI thread.
pub struct JobRunner {
    context: AppContext,
    tx: Sender<JobEvent>,
    rx: Receiver<JobEvent>,
}

impl JobRunner {
    pub fn new(context: AppContext) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { context, tx, rx }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Starts `request` on its own thread. On error no event will ever arrive for `ticket`.
    pub fn spawn(&self, ticket: JobTicket, request: JobRequest) -> io::Result<()> {
        let context = self.context.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("job-{}-{}", ticket.kind.as_str(), ticket.id))
            .spawn(move || {
                let outcome = execute(&context, request);
                // The receiver is gone only when the app is shutting down.
                let _ = tx.send(JobEvent { ticket, outcome });
            });
        match spawned {
            Ok(_) => {
                info!(job_id = ticket.id, kind = ticket.kind.as_str(), "job started");
                Ok(())
            }
            Err(error) => {
                warn!(job_id = ticket.id, %error, "failed to spawn job thread");
                Err(error)
            }
        }
    }

    /// Drains completions without blocking.
    pub fn poll(&self) -> Vec<JobEvent> {
        self.rx.try_iter().collect()
    }

    /// Blocks until the next completion arrives.
    pub fn wait(&self) -> Option<JobEvent> {
        self.rx.recv().ok()
    }
}
