use eframe::egui;

use crate::model::{AnalysisResult, GeneExpression, GeneSearchResult, NarrativeResult};
use crate::runtime::JobKind;
use crate::session::Session;

use super::app::UiAction;

const BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 86, 200);
const BAR_HEIGHT: f32 = 18.0;

pub(super) fn draw_status(ui: &mut egui::Ui, session: &Session) {
    ui.horizontal(|ui| {
        if session.has_pending_jobs() {
            ui.spinner();
        }
        if let Some(slide) = session.slide() {
            ui.label(format!(
                "{} ({} x {})",
                slide.source, slide.natural.width, slide.natural.height
            ));
            ui.separator();
        }
        ui.label(session.status().unwrap_or("Ready"));
    });
}

pub(super) fn draw_controls(ui: &mut egui::Ui, session: &mut Session, actions: &mut Vec<UiAction>) {
    draw_data_controls(ui, session, actions);
    ui.separator();
    draw_region_controls(ui, session, actions);
    ui.separator();
    draw_gene_controls(ui, session, actions);
}

fn draw_data_controls(ui: &mut egui::Ui, session: &mut Session, actions: &mut Vec<UiAction>) {
    ui.heading("Data");
    let loading = session.is_pending(JobKind::LoadSlide);
    ui.horizontal_wrapped(|ui| {
        if ui
            .add_enabled(!loading, egui::Button::new("Load New WSI"))
            .clicked()
        {
            actions.push(UiAction::LoadSample);
        }
        if ui
            .add_enabled(!loading, egui::Button::new("Open File..."))
            .clicked()
        {
            actions.push(UiAction::OpenFile);
        }
        if ui.button("Load Gene Data...").clicked() {
            actions.push(UiAction::LoadGeneData);
        }
        if ui.button("Clear All").clicked() {
            actions.push(UiAction::ClearAll);
        }
    });

    let mut overlay = session.overlay_visible();
    if ui.checkbox(&mut overlay, "Show cell overlay").changed() {
        session.set_overlay_visible(overlay);
    }
    if let Some(dataset) = session.gene_data() {
        ui.label(format!("Gene data: {} points", dataset.len()));
    }
}

fn draw_region_controls(ui: &mut egui::Ui, session: &Session, actions: &mut Vec<UiAction>) {
    ui.heading("Region Analysis");
    match session.selection() {
        Some(region) => {
            ui.monospace(format!(
                "x {:.0}  y {:.0}  w {:.0}  h {:.0}",
                region.x, region.y, region.width, region.height
            ));
        }
        None => {
            ui.label("Drag on the slide to select a region.");
        }
    }

    let analyzing = session.is_pending(JobKind::Analysis);
    ui.horizontal(|ui| {
        let label = if analyzing { "Analyzing..." } else { "Query Region" };
        if ui
            .add_enabled(
                session.selection().is_some() && !analyzing,
                egui::Button::new(label),
            )
            .clicked()
        {
            actions.push(UiAction::RunAnalysis);
        }
        if ui
            .add_enabled(session.selection().is_some(), egui::Button::new("Clear Selection"))
            .clicked()
        {
            actions.push(UiAction::ClearSelection);
        }
        if analyzing {
            ui.spinner();
        }
    });

    if let Some(analysis) = session.analysis() {
        draw_analysis(ui, session, analysis, actions);
    }
}

fn draw_analysis(
    ui: &mut egui::Ui,
    session: &Session,
    analysis: &AnalysisResult,
    actions: &mut Vec<UiAction>,
) {
    let hpc = &analysis.hpc;
    ui.add_space(4.0);
    egui::Grid::new("hpc-summary").num_columns(2).show(ui, |ui| {
        ui.label("Cells");
        ui.monospace(hpc.cell_count.to_string());
        ui.end_row();
        ui.label("Spatial clusters");
        ui.monospace(hpc.spatial_clusters.to_string());
        ui.end_row();
    });

    ui.label("Top genes");
    let height = BAR_HEIGHT * hpc.top_genes.len().max(1) as f32;
    let size = egui::vec2(ui.available_width().max(1.0), height);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    draw_gene_bars(ui.painter(), rect, &hpc.top_genes);

    let narrating = session.is_pending(JobKind::Narrative);
    ui.horizontal(|ui| {
        let label = if narrating {
            "Interpreting..."
        } else {
            "Interpret with AI"
        };
        if ui.add_enabled(!narrating, egui::Button::new(label)).clicked() {
            actions.push(UiAction::RunNarrative);
        }
        if ui.button("Clear Results").clicked() {
            actions.push(UiAction::ClearAnalysis);
        }
        if narrating {
            ui.spinner();
        }
    });

    if let Some(narrative) = &analysis.narrative {
        draw_narrative(ui, narrative);
    }
}

fn draw_narrative(ui: &mut egui::Ui, narrative: &NarrativeResult) {
    ui.add_space(4.0);
    if narrative.is_degraded() {
        ui.colored_label(egui::Color32::from_rgb(230, 120, 90), &narrative.summary);
        return;
    }
    ui.label(&narrative.summary);
    ui.add(
        egui::ProgressBar::new((narrative.confidence / 100.0) as f32)
            .text(format!("Confidence {:.0}%", narrative.confidence)),
    );
    for finding in &narrative.potential_cell_types {
        ui.add_space(2.0);
        ui.strong(&finding.name);
        ui.add(
            egui::ProgressBar::new((finding.prevalence / 100.0) as f32)
                .text(format!("{:.0}%", finding.prevalence)),
        );
        if !finding.description.is_empty() {
            ui.small(&finding.description);
        }
    }
}

fn draw_gene_controls(ui: &mut egui::Ui, session: &mut Session, actions: &mut Vec<UiAction>) {
    ui.heading("Gene Search");
    let searching = session.is_pending(JobKind::GeneSearch);
    ui.horizontal(|ui| {
        let mut query = session.gene_query().to_string();
        let response = ui.add(egui::TextEdit::singleline(&mut query).hint_text("e.g. KRT19"));
        if response.changed() {
            session.set_gene_query(query);
        }
        let submitted =
            response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        let can_search = !searching && !session.gene_query().trim().is_empty();
        let clicked = ui
            .add_enabled(can_search, egui::Button::new("Search"))
            .clicked();
        if can_search && (clicked || submitted) {
            actions.push(UiAction::SearchGene);
        }
        if searching {
            ui.spinner();
        }
    });

    let Some(result) = session.gene_search() else {
        return;
    };
    draw_gene_result(ui, result);
    if let Some(hotspot) = session.selected_hotspot() {
        ui.add_space(4.0);
        ui.strong("Selected hotspot");
        egui::Grid::new("hotspot-details").num_columns(2).show(ui, |ui| {
            ui.label("Position");
            ui.monospace(format!("{:.0}, {:.0}", hotspot.x, hotspot.y));
            ui.end_row();
            ui.label("Expression");
            ui.monospace(format!("{:.1}", hotspot.expression));
            ui.end_row();
            ui.label("Cell type");
            ui.label(&hotspot.dominant_cell_type);
            ui.end_row();
        });
    }
    if ui.button("Clear Gene Search").clicked() {
        actions.push(UiAction::ClearGeneSearch);
    }
}

fn draw_gene_result(ui: &mut egui::Ui, result: &GeneSearchResult) {
    ui.add_space(4.0);
    ui.strong(format!("{} ({:?})", result.gene_name, result.data_source));
    ui.label(&result.description);
    if !result.associated_cell_types.is_empty() {
        ui.label(format!(
            "Associated cell types: {}",
            result.associated_cell_types.join(", ")
        ));
    }
    ui.label(format!("{} hotspots", result.hotspots.len()));
}

fn draw_gene_bars(painter: &egui::Painter, rect: egui::Rect, genes: &[GeneExpression]) {
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(28));
    if genes.is_empty() {
        return;
    }

    let row_height = rect.height() / genes.len() as f32;
    let label_width = (rect.width() * 0.3).min(80.0);
    for (index, gene) in genes.iter().enumerate() {
        let y0 = rect.top() + index as f32 * row_height;
        let ratio = (gene.expression / 100.0).clamp(0.0, 1.0) as f32;
        let x0 = rect.left() + label_width;
        let x1 = x0 + ratio * (rect.width() - label_width - 2.0);

        painter.text(
            egui::pos2(rect.left() + 4.0, y0 + row_height * 0.5),
            egui::Align2::LEFT_CENTER,
            &gene.name,
            egui::FontId::monospace(11.0),
            egui::Color32::from_gray(210),
        );
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(x0, y0 + 2.0),
                egui::pos2(x1.max(x0 + 1.0), y0 + row_height - 2.0),
            ),
            0.0,
            BAR_COLOR,
        );
    }
}
