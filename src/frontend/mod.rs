//! Frontend module for the egui viewer
//!
//! The viewer's per-frame `update` is the frame thread of the pipeline: each
//! call runs one [`UpdateDriver::tick`] against the in-memory scene and then
//! draws the result.
//!
//! # Main Types
//!
//! - [`RigViewerApp`] - Application state implementing [`eframe::App`]
//! - [`Topics`] - Status and counters shown by the panels
//!
//! # Submodules
//!
//! - `panels` - Statistics and bone table in the side panel
//! - `plot` - Front and side skeleton projections with egui_plot
//! - `status_bar` - Bottom status line

mod panels;
mod plot;
mod status_bar;
pub mod topics;

pub use plot::{Projection, SkeletonGeometry};
pub use topics::Topics;

use std::time::Instant;

use crate::backend::ReceiverHandle;
#[cfg(feature = "synthetic-source")]
use crate::backend::SyntheticSource;
use crate::config::ViewerConfig;
use crate::host::InMemoryScene;
use crate::retarget::UpdateDriver;
use status_bar::StatusBarContext;

pub struct RigViewerApp {
    driver: UpdateDriver<InMemoryScene>,
    receiver: Option<ReceiverHandle>,
    #[cfg(feature = "synthetic-source")]
    synthetic: Option<SyntheticSource>,
    topics: Topics,
    config: ViewerConfig,
}

impl RigViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        driver: UpdateDriver<InMemoryScene>,
        receiver: Option<ReceiverHandle>,
        config: ViewerConfig,
    ) -> Self {
        let visuals = if config.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        cc.egui_ctx.set_visuals(visuals);

        Self {
            driver,
            receiver,
            #[cfg(feature = "synthetic-source")]
            synthetic: None,
            topics: Topics::default(),
            config,
        }
    }

    /// Keep a synthetic source alive for the app's lifetime
    #[cfg(feature = "synthetic-source")]
    pub fn with_synthetic_source(mut self, source: SyntheticSource) -> Self {
        self.synthetic = Some(source);
        self
    }

    /// Record a startup problem for the status bar
    pub fn with_startup_error(mut self, message: impl Into<String>) -> Self {
        self.topics.last_error = Some(message.into());
        self.topics.receiver_status = crate::types::ReceiverStatus::Error;
        self
    }

    fn process_receiver_events(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        for event in receiver.drain_events() {
            tracing::debug!("Receiver event: {:?}", event);
            self.topics.apply_event(event);
        }
        self.topics.receiver_stats = receiver.stats();
    }

    fn run_tick(&mut self) {
        let report = self.driver.tick();
        self.topics
            .record_tick(report, self.driver.stats(), Instant::now());
        self.topics.mailbox_stats = self.driver.bridge().stats();
    }
}

impl eframe::App for RigViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_receiver_events();
        self.run_tick();

        // Samples can arrive at any time
        ctx.request_repaint();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let registry = self.driver.registry();
            status_bar::render_status_bar(
                ui,
                &StatusBarContext {
                    topics: &self.topics,
                    link_policy: registry.link_policy(),
                    linked: registry.is_linked(),
                },
            );
        });

        egui::SidePanel::left("rig_panel")
            .default_width(340.0)
            .show(ctx, |ui| {
                panels::render_stats_panel(ui, &self.topics);
                ui.separator();
                ui.checkbox(&mut self.config.show_labels, "Bone labels");
                ui.separator();
                panels::render_bone_table(ui, self.driver.registry(), self.driver.host());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let scene = self.driver.host();
            if scene.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for bone data...");
                });
                return;
            }
            ui.columns(2, |columns| {
                plot::show_skeleton(
                    &mut columns[0],
                    scene,
                    Projection::Front,
                    self.config.show_labels,
                );
                plot::show_skeleton(
                    &mut columns[1],
                    scene,
                    Projection::Side,
                    self.config.show_labels,
                );
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.shutdown();
        }
        #[cfg(feature = "synthetic-source")]
        if let Some(source) = self.synthetic.as_mut() {
            source.shutdown();
        }
        tracing::info!(
            "Viewer closed after {} frames, {} samples applied",
            self.driver.stats().ticks,
            self.driver.stats().samples_applied
        );
    }
}
