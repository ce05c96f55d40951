//! Notes editor panel

use eframe::egui;

use crate::notes::NoteEditor;
use crate::sync::ScrollPane;

/// What happened in the notes panel this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NotesPanelResponse {
    /// The text was edited
    pub changed: bool,
    /// The scroll offset moved since the last frame
    pub scrolled: bool,
}

/// Notes editor panel
pub struct NotesPanel;

impl NotesPanel {
    /// Show the notes editor
    pub fn show(
        ui: &mut egui::Ui,
        editor: &mut NoteEditor,
        pane: &mut ScrollPane,
        font_size: f32,
    ) -> NotesPanelResponse {
        let mut scroll_area = egui::ScrollArea::vertical()
            .id_salt("notes_scroll")
            .auto_shrink([false, false]);

        if let Some(offset) = pane.take_pending() {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let output = scroll_area.show(ui, |ui| {
            let response = ui.add(
                egui::TextEdit::multiline(editor.text_mut())
                    .font(egui::FontId::monospace(font_size))
                    .hint_text("Notes for this page...")
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .lock_focus(true),
            );
            response.changed()
        });

        let scrolled = pane.observe(
            output.state.offset.y,
            output.content_size.y,
            output.inner_rect.height(),
        );

        NotesPanelResponse {
            changed: output.inner,
            scrolled,
        }
    }
}
