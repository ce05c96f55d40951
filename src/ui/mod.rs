//! UI components for RefNotes

pub mod notes_panel;
pub mod reference_panel;
pub mod status_bar;
