//! Reference viewer panel: URL bar, load hint and the document itself

use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

use crate::reference::{ReferenceLoader, ReferenceViewer, ViewerContent};

/// A request the panel leaves to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceAction {
    /// Load the URL in the input
    OpenUrl,
    /// Pick a local file
    PickFile,
    /// Open the current remote reference in the system browser
    OpenExternal,
}

/// What happened in the reference panel this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencePanelResponse {
    pub action: Option<ReferenceAction>,
    /// The document's scroll offset moved since the last frame
    pub scrolled: bool,
}

/// Reference viewer panel
pub struct ReferencePanel;

impl ReferencePanel {
    /// Show the reference panel
    pub fn show(
        ui: &mut egui::Ui,
        loader: &mut ReferenceLoader,
        viewer: &mut ReferenceViewer,
        cache: &mut CommonMarkCache,
    ) -> ReferencePanelResponse {
        let mut response = ReferencePanelResponse {
            action: Self::show_toolbar(ui, loader, viewer),
            scrolled: false,
        };

        if !loader.hint().is_empty() {
            ui.label(egui::RichText::new(loader.hint()).small().weak());
        }
        ui.separator();

        let mut scroll_area = egui::ScrollArea::vertical()
            .id_salt("reference_scroll")
            .auto_shrink([false, false]);

        if let Some(offset) = viewer.pane_mut().take_pending() {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let output = scroll_area.show(ui, |ui| match viewer.content() {
            ViewerContent::Blank => {
                if viewer.source().is_none() {
                    Self::show_empty(ui);
                }
            }
            ViewerContent::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading reference...");
                });
            }
            ViewerContent::Markdown(text) => {
                CommonMarkViewer::new().show(ui, cache, text);
            }
            ViewerContent::Text(text) => {
                ui.add(egui::Label::new(egui::RichText::new(text).monospace()).wrap());
            }
        });

        response.scrolled = viewer.pane_mut().observe(
            output.state.offset.y,
            output.content_size.y,
            output.inner_rect.height(),
        );
        response
    }

    fn show_toolbar(
        ui: &mut egui::Ui,
        loader: &mut ReferenceLoader,
        viewer: &ReferenceViewer,
    ) -> Option<ReferenceAction> {
        let mut action = None;
        let external = viewer
            .source()
            .and_then(|source| source.remote_url())
            .is_some_and(|url| url.scheme() != "file");

        ui.horizontal(|ui| {
            let reserved = if external { 260.0 } else { 150.0 };
            let input = ui.add(
                egui::TextEdit::singleline(&mut loader.url_input)
                    .hint_text("Reference URL or path")
                    .desired_width((ui.available_width() - reserved).max(120.0)),
            );
            if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                action = Some(ReferenceAction::OpenUrl);
            }

            if ui.button("Open").clicked() {
                action = Some(ReferenceAction::OpenUrl);
            }
            if ui.button("Local file...").clicked() {
                action = Some(ReferenceAction::PickFile);
            }
            if external && ui.button("Open in browser").clicked() {
                action = Some(ReferenceAction::OpenExternal);
            }
        });

        action
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("No reference loaded");
            ui.label("Enter a URL or pick a local file");
        });
    }
}
