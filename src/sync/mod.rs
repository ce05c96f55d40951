//! Scroll synchronization between the notes and the reference viewer

pub mod scroller;
pub mod synchronizer;

pub use scroller::ScrollPane;
pub use synchronizer::{DocumentAccess, EmbeddedDocument, ScrollSync};
