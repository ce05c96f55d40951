//! Status bar: save status, character count and sync toggle

use eframe::egui;

use crate::notes::NoteEditor;
use crate::sync::ScrollSync;

/// Status bar along the bottom of the window
pub struct StatusBar;

impl StatusBar {
    /// Show the status bar. Returns true if the sync toggle was clicked.
    pub fn show(ui: &mut egui::Ui, editor: &NoteEditor, sync: &ScrollSync) -> bool {
        let mut toggled = false;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(editor.page_id()).weak());
            ui.separator();
            ui.label(editor.status());
            ui.separator();
            ui.label(editor.char_count_label());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if sync.state().enabled { "Disable sync" } else { "Enable sync" };
                if ui.button(label).clicked() {
                    toggled = true;
                }
                ui.label(sync.status());
            });
        });

        toggled
    }
}
