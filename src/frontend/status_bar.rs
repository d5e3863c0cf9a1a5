//! Status bar panel: bottom bar showing receiver state, rate and errors.

use egui::{Color32, RichText, Ui};

use crate::frontend::topics::Topics;
use crate::retarget::LinkPolicy;
use crate::types::ReceiverStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub topics: &'a Topics,
    pub link_policy: LinkPolicy,
    pub linked: bool,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let topics = ctx.topics;
        let status_color = match topics.receiver_status {
            ReceiverStatus::Listening => Color32::GREEN,
            ReceiverStatus::Idle => Color32::GRAY,
            ReceiverStatus::Error => Color32::RED,
            ReceiverStatus::Stopped => Color32::YELLOW,
        };
        ui.colored_label(status_color, "●");
        let status = match topics.listen_addr {
            Some(addr) => format!("{}: {}", topics.receiver_status.label(), addr),
            None => topics.receiver_status.label().to_string(),
        };
        ui.label(RichText::new(status).small());

        ui.separator();

        let rate_color = if topics.sample_rate > 0.0 {
            Color32::from_rgb(100, 255, 100)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new("Rate:").small());
        ui.colored_label(
            rate_color,
            RichText::new(format!("{:.0} samples/s", topics.sample_rate)).small(),
        );

        ui.separator();

        let link = match (ctx.link_policy, ctx.linked) {
            (LinkPolicy::OneShot, true) => "Hierarchy: linked",
            (LinkPolicy::OneShot, false) => "Hierarchy: pending",
            (LinkPolicy::Incremental, _) => "Hierarchy: incremental",
        };
        ui.label(RichText::new(link).small());

        if let Some(err) = &topics.last_error {
            ui.separator();
            ui.colored_label(Color32::LIGHT_RED, RichText::new(err).small());
        }
    });
}
