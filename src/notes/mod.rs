//! Notes editing

pub mod controller;

pub use controller::NoteEditor;
