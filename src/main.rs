//! RefNotes - notes editor with an embedded reference viewer
//!
//! Notes are saved per page as you type. The reference document scrolls
//! along with the notes when it is loaded from a local file.

mod app;
mod core;
mod notes;
mod reference;
mod sync;
mod ui;

use app::{LaunchOptions, RefNotesApp};
use clap::Parser;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "refnotes", version, about = "Notes editor with an embedded reference viewer")]
struct Args {
    /// Identifier the notes are stored under (defaults to the current directory)
    #[arg(long)]
    page_id: Option<String>,

    /// Reference URL or file path to load on start
    #[arg(short, long)]
    reference: Option<String>,

    /// Keep notes in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(level)
        .init();

    tracing::info!("Starting RefNotes...");

    let options = LaunchOptions {
        page_id: args.page_id,
        reference: args.reference,
        ephemeral: args.ephemeral,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("RefNotes"),
        ..Default::default()
    };

    eframe::run_native(
        "RefNotes",
        native_options,
        Box::new(move |cc| Ok(Box::new(RefNotesApp::new(cc, options)))),
    )
}
