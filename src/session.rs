use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::{
    AnalysisResult, GeneSearchResult, Hotspot, HotspotId, NaturalSize, Point, SelectionRect,
    ViewportSize,
};
use crate::runtime::{GeneDataset, JobEvent, JobKind, JobOutcome, JobRequest, JobTicket};
use crate::ui::interaction::{PointerEvent, SelectionChange, SelectionController, ViewportMapping};


/// Nominal hotspot diameter, in natural units.
pub const HOTSPOT_SIZE: f64 = 20.0;

/// Smallest radius a hotspot marker is drawn and hit-tested with, in display pixels.
pub const MIN_HOTSPOT_RADIUS: f64 = 3.0;

/// Display-space radius of a hotspot marker at `scale`.
pub fn hotspot_radius(scale: f64) -> f64 {
    (HOTSPOT_SIZE * scale * 0.5).max(MIN_HOTSPOT_RADIUS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideInfo {
    pub source: String,
    pub natural: NaturalSize,
}

/// Single owner of the explorer's state. Every mutation goes through a named operation.
#[derive(Debug)]
pub struct Session {
    slide: Option<SlideInfo>,
    selection: SelectionController,
    reported_selection: Option<SelectionRect>,
    analysis: Option<AnalysisResult>,
    gene_search: Option<GeneSearchResult>,
    selected_hotspot: Option<HotspotId>,
    gene_data: Option<Arc<GeneDataset>>,
    gene_query: String,
    overlay_visible: bool,
    pending: HashMap<JobKind, JobTicket>,
    generation: u64,
    next_job_id: u64,
    status: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            slide: None,
            selection: SelectionController::new(),
            reported_selection: None,
            analysis: None,
            gene_search: None,
            selected_hotspot: None,
            gene_data: None,
            gene_query: String::new(),
            overlay_visible: true,
            pending: HashMap::new(),
            generation: 0,
            next_job_id: 0,
            status: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slide(source: impl Into<String>, natural: NaturalSize) -> Self {
        let mut session = Self::new();
        session.load_slide(source, natural);
        session
    }

    pub fn slide(&self) -> Option<&SlideInfo> {
        self.slide.as_ref()
    }

    pub fn natural(&self) -> Option<NaturalSize> {
        self.slide.as_ref().map(|slide| slide.natural)
    }

    /// The reported (committed) selection.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.reported_selection
    }

    /// Rectangle to draw, including an in-progress drag.
    pub fn visible_selection(&self) -> Option<SelectionRect> {
        self.selection.visible_rect()
    }

    pub fn is_dragging(&self) -> bool {
        self.selection.is_dragging()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn gene_search(&self) -> Option<&GeneSearchResult> {
        self.gene_search.as_ref()
    }

    pub fn selected_hotspot_id(&self) -> Option<HotspotId> {
        self.selected_hotspot
    }

    pub fn selected_hotspot(&self) -> Option<&Hotspot> {
        let id = self.selected_hotspot?;
        self.gene_search.as_ref()?.hotspot(id)
    }

    pub fn gene_data(&self) -> Option<&GeneDataset> {
        self.gene_data.as_deref()
    }

    pub fn gene_query(&self) -> &str {
        &self.gene_query
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn is_pending(&self, kind: JobKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Mapping for the current slide, or `None` while the surface is degenerate.
    pub fn mapping(&self, viewport: ViewportSize) -> Option<ViewportMapping> {
        let slide = self.slide.as_ref()?;
        let mapping = ViewportMapping::new(slide.natural, viewport);
        mapping.is_valid().then_some(mapping)
    }

    pub fn load_slide(&mut self, source: impl Into<String>, natural: NaturalSize) {
        let source = source.into();
        info!(
            source = %source,
            width = natural.width,
            height = natural.height,
            "slide replaced"
        );
        self.slide = Some(SlideInfo { source, natural });
        self.reset();
    }

    pub fn clear_all(&mut self) {
        debug!("clearing session state");
        self.reset();
        self.gene_query.clear();
    }

    fn reset(&mut self) {
        self.selection.clear();
        self.reported_selection = None;
        self.analysis = None;
        self.gene_search = None;
        self.selected_hotspot = None;
        self.gene_data = None;
        self.pending.retain(|kind, _| *kind == JobKind::LoadSlide);
        self.generation = self.generation.saturating_add(1);
    }

    fn observe(&mut self, change: Option<SelectionChange>) {
        if let Some(change) = change {
            self.reported_selection = change.selection();
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, viewport: ViewportSize) {
        match event {
            PointerEvent::Press(display) => self.pointer_down(display, viewport),
            PointerEvent::Drag(display) => self.pointer_move(display, viewport),
            PointerEvent::Release => self.pointer_up(),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, display: Point, viewport: ViewportSize) {
        let Some(mapping) = self.mapping(viewport) else {
            return;
        };

        if let Some(id) = self.hotspot_at(display, &mapping) {
            self.toggle_hotspot(id);
            return;
        }

        let Some(natural) = mapping.to_natural(display) else {
            return;
        };

        self.selected_hotspot = None;
        let change = self.selection.begin(natural);
        self.observe(change);
    }

    pub fn pointer_move(&mut self, display: Point, viewport: ViewportSize) {
        if !self.selection.is_dragging() {
            return;
        }
        if let Some(natural) = self
            .mapping(viewport)
            .and_then(|mapping| mapping.to_natural(display))
        {
            self.selection.update(natural);
        }
    }

    pub fn pointer_up(&mut self) {
        let change = self.selection.finish();
        self.observe(change);
    }

    pub fn pointer_leave(&mut self) {
        if self.selection.is_dragging() {
            let change = self.selection.abort();
            self.observe(change);
        }
    }

    pub fn clear_selection(&mut self) {
        let change = self.selection.clear();
        self.observe(change);
    }

    /// Topmost hotspot whose drawn marker contains the display point.
    pub fn hotspot_at(&self, display: Point, mapping: &ViewportMapping) -> Option<HotspotId> {
        let radius = hotspot_radius(mapping.scale);
        self.gene_search
            .as_ref()?
            .hotspots
            .iter()
            .rev()
            .find(|hotspot| {
                mapping.to_display(hotspot.position()).is_some_and(|center| {
                    let (dx, dy) = (display.x - center.x, display.y - center.y);
                    dx * dx + dy * dy <= radius * radius
                })
            })
            .map(|hotspot| hotspot.id)
    }

    pub fn toggle_hotspot(&mut self, id: HotspotId) {
        if self.selected_hotspot == Some(id) {
            self.selected_hotspot = None;
        } else if self
            .gene_search
            .as_ref()
            .is_some_and(|result| result.hotspot(id).is_some())
        {
            self.selected_hotspot = Some(id);
        }
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    pub fn set_gene_query(&mut self, query: impl Into<String>) {
        self.gene_query = query.into();
    }

    pub fn set_gene_data(&mut self, dataset: GeneDataset) {
        self.set_status(format!("Loaded {} gene data points", dataset.len()));
        self.gene_data = Some(Arc::new(dataset));
    }

    pub fn clear_analysis(&mut self) {
        self.analysis = None;
        self.pending.remove(&JobKind::Narrative);
    }

    pub fn clear_gene_search(&mut self) {
        self.gene_search = None;
        self.selected_hotspot = None;
        self.gene_query.clear();
        self.pending.remove(&JobKind::GeneSearch);
    }

    fn issue(&mut self, kind: JobKind) -> Option<JobTicket> {
        if self.pending.contains_key(&kind) {
            return None;
        }
        self.next_job_id = self.next_job_id.saturating_add(1);
        let ticket = JobTicket {
            id: self.next_job_id,
            kind,
            generation: self.generation,
        };
        self.pending.insert(kind, ticket);
        Some(ticket)
    }

    pub fn begin_analysis(&mut self) -> Option<(JobTicket, JobRequest)> {
        let region = self.reported_selection?;
        let ticket = self.issue(JobKind::Analysis)?;
        self.analysis = None;
        self.pending.remove(&JobKind::Narrative);
        Some((ticket, JobRequest::Analysis(region)))
    }

    pub fn begin_narrative(&mut self) -> Option<(JobTicket, JobRequest)> {
        let summary = self.analysis.as_ref()?.hpc.clone();
        let ticket = self.issue(JobKind::Narrative)?;
        Some((ticket, JobRequest::Narrative(summary)))
    }

    pub fn begin_gene_search(&mut self) -> Option<(JobTicket, JobRequest)> {
        let query = self.gene_query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        let natural = self.natural()?;
        let ticket = self.issue(JobKind::GeneSearch)?;
        Some((
            ticket,
            JobRequest::GeneSearch {
                query,
                natural,
                loaded: self.gene_data.clone(),
            },
        ))
    }

    pub fn begin_load_slide(&mut self, source: impl Into<String>) -> Option<(JobTicket, JobRequest)> {
        let source = source.into();
        if source.trim().is_empty() {
            return None;
        }
        let ticket = self.issue(JobKind::LoadSlide)?;
        self.set_status(format!("Loading {source}"));
        Some((ticket, JobRequest::LoadSlide(source)))
    }

    /// Forgets a job that will never report back, re-enabling its trigger.
    pub fn abandon(&mut self, ticket: JobTicket, reason: &str) -> bool {
        if self.pending.get(&ticket.kind) != Some(&ticket) {
            return false;
        }
        self.pending.remove(&ticket.kind);
        warn!(job_id = ticket.id, kind = ticket.kind.as_str(), reason, "job abandoned");
        self.set_status(format!("Could not start {}: {reason}", ticket.kind.as_str()));
        true
    }

    /// Applies a completed job. Returns false for stale or unknown completions.
    pub fn apply(&mut self, event: &JobEvent) -> bool {
        let ticket = event.ticket;
        let current = self.pending.get(&ticket.kind).copied();
        if current != Some(ticket) {
            debug!(job_id = ticket.id, kind = ticket.kind.as_str(), "dropping stale job result");
            return false;
        }
        if ticket.kind != JobKind::LoadSlide && ticket.generation != self.generation {
            self.pending.remove(&ticket.kind);
            return false;
        }
        self.pending.remove(&ticket.kind);

        match &event.outcome {
            JobOutcome::Analysis(summary) => {
                self.analysis = Some(AnalysisResult::new(summary.clone()));
            }
            JobOutcome::Narrative(narrative) => {
                let Some(analysis) = self.analysis.as_mut() else {
                    return false;
                };
                analysis.narrative = Some(narrative.clone());
            }
            JobOutcome::GeneSearch(result) => {
                self.selected_hotspot = None;
                self.gene_search = Some(result.clone());
            }
            JobOutcome::Slide(Ok(slide)) => {
                self.load_slide(slide.source.clone(), slide.natural);
                self.set_status(format!("Loaded {}", slide.source));
            }
            JobOutcome::Slide(Err(error)) => {
                self.set_status(format!("Failed to load slide: {error}"));
            }
        }
        true
    }
}
