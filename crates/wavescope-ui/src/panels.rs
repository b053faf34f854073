//! Viewer control panel.

use egui::{CollapsingHeader, Color32, ComboBox, Context, SidePanel, Slider, Ui};
use wavescope_core::{Colormap, HeightMode, ParameterRanges, TransferParams};

/// Load status as shown in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus<'a> {
    /// Dataset still loading.
    Loading,
    /// Dataset loaded and playable.
    Ready,
    /// Load failed with the given message.
    Failed(&'a str),
}

/// Snapshot of viewer state the panel draws from.
#[derive(Debug, Clone)]
pub struct PanelModel<'a> {
    pub title: &'a str,
    pub status: LoadStatus<'a>,
    pub notice: Option<&'a str>,
    pub playing: bool,
    pub frame: usize,
    pub frame_count: usize,
    pub fps: u32,
    pub params: TransferParams,
    pub ranges: &'a ParameterRanges,
}

/// A user action produced by the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    /// Play/pause button.
    TogglePlay,
    /// Pause and rewind to frame 0.
    Reset,
    /// Scrub bar moved to a frame.
    Scrub(usize),
    /// Playback rate changed.
    SetFps(u32),
    /// Any transfer-function parameter changed.
    SetParams(TransferParams),
    /// Return the camera to its home view.
    ResetView,
}

/// Builds the left control panel and returns the actions triggered this pass.
pub fn build_control_panel(ctx: &Context, model: &PanelModel<'_>) -> Vec<PanelAction> {
    let mut actions = Vec::new();
    SidePanel::left("wavescope_control_panel")
        .default_width(280.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading(model.title);
            ui.separator();
            build_status_section(ui, model);
            ui.separator();
            build_transport_section(ui, model, &mut actions);
            ui.separator();
            build_transfer_section(ui, model, &mut actions);
            ui.separator();
            if ui.button("Reset View").clicked() {
                actions.push(PanelAction::ResetView);
            }
        });
    actions
}

fn build_status_section(ui: &mut Ui, model: &PanelModel<'_>) {
    match model.status {
        LoadStatus::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading dataset...");
            });
        }
        LoadStatus::Ready => {
            ui.label(format!("{} frames loaded", model.frame_count));
        }
        LoadStatus::Failed(message) => {
            ui.colored_label(Color32::from_rgb(230, 90, 80), format!("Load failed: {message}"));
        }
    }

    if let Some(notice) = model.notice {
        ui.colored_label(Color32::from_rgb(230, 190, 80), notice);
    }
}

fn build_transport_section(ui: &mut Ui, model: &PanelModel<'_>, actions: &mut Vec<PanelAction>) {
    let ready = model.status == LoadStatus::Ready && model.frame_count > 0;

    ui.add_enabled_ui(ready, |ui| {
        ui.horizontal(|ui| {
            let label = if model.playing { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                actions.push(PanelAction::TogglePlay);
            }
            if ui.button("Reset").clicked() {
                actions.push(PanelAction::Reset);
            }
        });

        let last = model.frame_count.saturating_sub(1);
        let mut frame = model.frame.min(last);
        if ui
            .add(Slider::new(&mut frame, 0..=last).text("Frame"))
            .changed()
        {
            actions.push(PanelAction::Scrub(frame));
        }
        ui.label(format!("Frame {} / {}", model.frame + 1, model.frame_count.max(1)));

        let mut fps = model.fps;
        if ui
            .add(Slider::new(&mut fps, model.ranges.fps_min..=model.ranges.fps_max).text("FPS"))
            .changed()
        {
            actions.push(PanelAction::SetFps(fps));
        }
    });
}

fn build_transfer_section(ui: &mut Ui, model: &PanelModel<'_>, actions: &mut Vec<PanelAction>) {
    let ranges = model.ranges;
    let mut params = model.params;
    let mut changed = false;

    CollapsingHeader::new("Appearance")
        .default_open(true)
        .show(ui, |ui| {
            ComboBox::from_label("Height")
                .selected_text(params.mode.name())
                .show_ui(ui, |ui| {
                    for mode in [HeightMode::Physical, HeightMode::Enhanced] {
                        changed |= ui
                            .selectable_value(&mut params.mode, mode, mode.name())
                            .changed();
                    }
                });

            ComboBox::from_label("Colormap")
                .selected_text(params.colormap.name())
                .show_ui(ui, |ui| {
                    for map in Colormap::ALL {
                        changed |= ui
                            .selectable_value(&mut params.colormap, map, map.name())
                            .changed();
                    }
                });

            changed |= ui
                .add(
                    Slider::new(&mut params.gamma, ranges.gamma.min..=ranges.gamma.max)
                        .text("Gamma"),
                )
                .changed();
            changed |= ui
                .add(
                    Slider::new(
                        &mut params.threshold,
                        ranges.threshold.min..=ranges.threshold.max,
                    )
                    .text("Threshold"),
                )
                .changed();
            changed |= ui
                .add(
                    Slider::new(
                        &mut params.height_scale,
                        ranges.height_scale.min..=ranges.height_scale.max,
                    )
                    .text("Height scale"),
                )
                .changed();
            changed |= ui
                .add(Slider::new(&mut params.ghost_opacity, 0.0..=1.0).text("Ghost opacity"))
                .changed();
        });

    if changed {
        actions.push(PanelAction::SetParams(params));
    }
}
