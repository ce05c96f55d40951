//! Reference documents: sources, loading and the embedded viewer

pub mod blob;
pub mod fetch;
pub mod loader;
pub mod policy;
pub mod source;
pub mod viewer;

pub use fetch::Fetcher;
pub use loader::ReferenceLoader;
pub use source::ReferenceSource;
pub use viewer::{ReferenceViewer, ViewerContent};
