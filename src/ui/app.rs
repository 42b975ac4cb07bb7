use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::runtime::{AppContext, GeneDataset, JobEvent, JobOutcome, JobRequest, JobRunner, JobTicket, SlideImage};
use crate::session::Session;

use super::{canvas, panels};

const JOB_REPAINT_INTERVAL: Duration = Duration::from_millis(50);
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];
const GENE_DATA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// User intents collected while drawing a frame and applied once drawing is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum UiAction {
    LoadSample,
    OpenFile,
    LoadGeneData,
    ClearAll,
    ClearSelection,
    RunAnalysis,
    RunNarrative,
    ClearAnalysis,
    SearchGene,
    ClearGeneSearch,
}

pub(super) struct ExplorerApp {
    config: AppConfig,
    session: Session,
    jobs: JobRunner,
    texture: Option<egui::TextureHandle>,
}

impl ExplorerApp {
    pub(super) fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        initial: Option<String>,
    ) -> Self {
        let jobs = JobRunner::new(AppContext::from_config(&config));
        let mut app = Self {
            config,
            session: Session::new(),
            jobs,
            texture: None,
        };

        match SlideImage::placeholder(
            app.config.slides.placeholder_width,
            app.config.slides.placeholder_height,
        ) {
            Ok(slide) => app.show_slide(&cc.egui_ctx, &slide),
            Err(error) => app.session.set_status(format!("Placeholder unavailable: {error}")),
        }

        if let Some(source) = initial {
            app.start_load(source);
        }
        app
    }

    fn show_slide(&mut self, ctx: &egui::Context, slide: &SlideImage) {
        self.session.load_slide(slide.source.clone(), slide.natural);
        self.texture = Some(ctx.load_texture(
            "slide",
            to_color_image(slide),
            egui::TextureOptions::LINEAR,
        ));
    }

    fn dispatch(&mut self, job: Option<(JobTicket, JobRequest)>) {
        if let Some((ticket, request)) = job {
            if let Err(error) = self.jobs.spawn(ticket, request) {
                self.session.abandon(ticket, &error.to_string());
            }
        }
    }

    fn start_load(&mut self, source: String) {
        let job = self.session.begin_load_slide(source);
        self.dispatch(job);
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) -> bool {
        let mut changed = false;
        for event in self.jobs.poll() {
            changed |= self.apply_event(ctx, &event);
        }
        changed
    }

    fn apply_event(&mut self, ctx: &egui::Context, event: &JobEvent) -> bool {
        if !self.session.apply(event) {
            return false;
        }
        if let JobOutcome::Slide(Ok(slide)) = &event.outcome {
            self.texture = Some(ctx.load_texture(
                "slide",
                to_color_image(slide),
                egui::TextureOptions::LINEAR,
            ));
        }
        true
    }

    fn apply_actions(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            match action {
                UiAction::LoadSample => {
                    let sample = self.config.slides.samples.choose(&mut rand::rng()).cloned();
                    match sample {
                        Some(source) => self.start_load(source),
                        None => self.session.set_status("No sample slides configured"),
                    }
                }
                UiAction::OpenFile => {
                    if let Some(path) = pick_file("Slide images", IMAGE_EXTENSIONS) {
                        self.start_load(path.display().to_string());
                    }
                }
                UiAction::LoadGeneData => {
                    if let Some(path) = pick_file("Gene data", GENE_DATA_EXTENSIONS) {
                        self.load_gene_data(path);
                    }
                }
                UiAction::ClearAll => {
                    self.session.clear_all();
                    self.session.set_status("Cleared");
                }
                UiAction::ClearSelection => self.session.clear_selection(),
                UiAction::RunAnalysis => {
                    let job = self.session.begin_analysis();
                    self.dispatch(job);
                }
                UiAction::RunNarrative => {
                    let job = self.session.begin_narrative();
                    self.dispatch(job);
                }
                UiAction::ClearAnalysis => self.session.clear_analysis(),
                UiAction::SearchGene => {
                    let job = self.session.begin_gene_search();
                    self.dispatch(job);
                }
                UiAction::ClearGeneSearch => self.session.clear_gene_search(),
            }
        }
    }

    fn load_gene_data(&mut self, path: PathBuf) {
        match GeneDataset::load(&path) {
            Ok(dataset) => {
                info!(path = %path.display(), points = dataset.len(), "gene data loaded");
                self.session.set_gene_data(dataset);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to load gene data");
                self.session
                    .set_status(format!("Failed to load {}: {error}", path.display()));
            }
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let jobs_changed = self.poll_jobs(ctx);

        let mut actions = Vec::new();
        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            panels::draw_status(ui, &self.session);
        });
        egui::SidePanel::right("controls")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panels::draw_controls(ui, &mut self.session, &mut actions);
                });
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::draw_slide(ui, &mut self.session, self.texture.as_ref());
        });

        let has_actions = !actions.is_empty();
        self.apply_actions(actions);

        if jobs_changed || has_actions {
            ctx.request_repaint();
        } else if self.session.has_pending_jobs() {
            ctx.request_repaint_after(JOB_REPAINT_INTERVAL);
        }
    }
}

fn pick_file(label: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(label, extensions)
        .pick_file()
}

fn to_color_image(slide: &SlideImage) -> egui::ColorImage {
    let size = [slide.pixels.width() as usize, slide.pixels.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, slide.pixels.as_raw())
}
