//! Main application state and UI coordination

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::config::{AppConfig, PageAttributes};
use crate::core::scheduler::{Scheduler, Task};
use crate::core::store::{FileStore, MemoryStore, NoteStore};
use crate::notes::NoteEditor;
use crate::reference::{Fetcher, ReferenceLoader, ReferenceSource, ReferenceViewer};
use crate::sync::{ScrollPane, ScrollSync};
use crate::ui::{
    notes_panel::NotesPanel,
    reference_panel::{ReferenceAction, ReferencePanel},
    status_bar::StatusBar,
};

/// Startup options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Page identifier override
    pub page_id: Option<String>,
    /// Reference URL override
    pub reference: Option<String>,
    /// Keep notes in memory only
    pub ephemeral: bool,
}

/// Main application state
pub struct RefNotesApp {
    /// Application configuration
    pub config: AppConfig,
    /// Timers for the debounce and the sync guard
    scheduler: Scheduler,
    /// Notes editor controller
    notes: NoteEditor,
    /// Scroll state of the notes area
    notes_pane: ScrollPane,
    /// Reference loader
    loader: ReferenceLoader,
    /// Embedded reference viewer
    viewer: ReferenceViewer,
    /// Scroll synchronizer
    sync: ScrollSync,
    /// Commonmark cache for markdown references
    commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl RefNotesApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, options: LaunchOptions) -> Self {
        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {:#}", e);
            AppConfig::default()
        });
        Self::apply_theme(&cc.egui_ctx, &config);

        let page = config.page_attributes(options.page_id, options.reference);
        tracing::info!("Page id: {}", page.page_id);

        let notes = Self::open_notes(&page, &config, options.ephemeral);

        let fetcher = match Fetcher::new() {
            Ok(fetcher) => Some(fetcher),
            Err(e) => {
                tracing::error!("Remote references are disabled: {:#}", e);
                None
            }
        };
        let mut viewer = ReferenceViewer::new(fetcher);
        let mut loader = ReferenceLoader::new(page.default_reference.clone());
        loader.init(&mut viewer);

        Self {
            sync: ScrollSync::new(config.sync.enabled_on_start),
            config,
            scheduler: Scheduler::new(),
            notes,
            notes_pane: ScrollPane::new(),
            loader,
            viewer,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
        }
    }

    /// Open the persistent store, falling back to memory if it is unusable
    fn open_notes(page: &PageAttributes, config: &AppConfig, ephemeral: bool) -> NoteEditor {
        let debounce = config.editor.save_debounce();

        if !ephemeral {
            let opened = FileStore::open_default()
                .and_then(|store| NoteEditor::init(NoteStore::new(store), page.page_id.clone(), debounce));
            match opened {
                Ok(editor) => return editor,
                Err(e) => tracing::error!("Note storage unavailable, notes will not persist: {}", e),
            }
        }

        NoteEditor::new(
            NoteStore::new(MemoryStore::new()),
            page.page_id.clone(),
            String::new(),
            debounce,
        )
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        match config.ui.theme.as_str() {
            "light" => ctx.set_visuals(egui::Visuals::light()),
            _ => ctx.set_visuals(egui::Visuals::dark()),
        }
    }

    /// Load the URL currently in the input
    fn open_reference_url(&mut self) {
        if self.loader.load_from_url(&mut self.viewer) {
            if let Some(ReferenceSource::Remote(url)) = self.loader.current() {
                let url = url.to_string();
                self.config.add_recent_reference(&url);
                if let Err(e) = self.config.save() {
                    tracing::warn!("Failed to save config: {}", e);
                }
            }
        }
    }

    /// Ask for a local file and load it
    fn pick_local_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Documents", &["md", "markdown", "txt", "html", "htm"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.open_local_file(path);
        }
    }

    fn open_local_file(&mut self, path: PathBuf) {
        self.loader.load_from_local_file(&path, &mut self.viewer);
    }

    /// Open the current remote reference in the system browser
    fn open_external(&self) {
        if let Some(url) = self.viewer.source().and_then(|s| s.remote_url()) {
            if let Err(e) = open::that(url.as_str()) {
                tracing::error!("Failed to open {} in browser: {}", url, e);
            }
        }
    }

    fn handle_reference_action(&mut self, action: ReferenceAction) {
        match action {
            ReferenceAction::OpenUrl => self.open_reference_url(),
            ReferenceAction::PickFile => self.pick_local_file(),
            ReferenceAction::OpenExternal => self.open_external(),
        }
    }

    /// Fire the timers that are due
    fn run_due_tasks(&mut self, now: Instant) {
        for task in self.scheduler.tick(now) {
            match task {
                Task::SaveNotes => self.notes.on_save_timer(),
                Task::ReleaseSyncLock => self.sync.on_lock_release(),
            }
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Local File...").clicked() {
                        self.pick_local_file();
                        ui.close();
                    }
                    if !self.config.recent_references.is_empty() {
                        ui.menu_button("Recent References", |ui| {
                            let recent = self.config.recent_references.clone();
                            for url in recent {
                                if ui.button(&url).clicked() {
                                    self.loader.url_input = url;
                                    self.open_reference_url();
                                    ui.close();
                                }
                            }
                        });
                    }
                    ui.separator();
                    if ui.button("Save Notes").clicked() {
                        self.notes.on_manual_save(&mut self.scheduler);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let label = if self.sync.state().enabled {
                        "Disable Scroll Sync"
                    } else {
                        "Enable Scroll Sync"
                    };
                    if ui.button(label).clicked() {
                        self.sync.toggle();
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for RefNotesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Ctrl+S / Cmd+S saves immediately and is not passed on
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S)) {
            self.notes.on_manual_save(&mut self.scheduler);
        }

        if self.viewer.poll_load() {
            self.sync.on_reference_load(&mut self.viewer);
        }

        self.render_menu_bar(ctx);

        let toggled = egui::TopBottomPanel::bottom("status_bar")
            .show(ctx, |ui| StatusBar::show(ui, &self.notes, &self.sync))
            .inner;
        if toggled {
            self.sync.toggle();
        }

        let notes_width = ctx.screen_rect().width() * self.config.ui.notes_width_fraction.clamp(0.2, 0.8);
        let font_size = self.config.editor.font_size;
        let notes = egui::SidePanel::left("notes_panel")
            .resizable(true)
            .default_width(notes_width)
            .min_width(200.0)
            .show(ctx, |ui| NotesPanel::show(ui, &mut self.notes, &mut self.notes_pane, font_size))
            .inner;

        let reference = egui::CentralPanel::default()
            .show(ctx, |ui| {
                ReferencePanel::show(ui, &mut self.loader, &mut self.viewer, &mut self.commonmark_cache)
            })
            .inner;

        // Dispatch this frame's events before timers so a mirrored scroll is
        // seen while the guard still holds
        if notes.changed {
            self.notes.on_text_changed(&mut self.scheduler, now);
        }
        if notes.scrolled {
            self.sync
                .on_editor_scroll(&self.notes_pane, &mut self.viewer, &mut self.scheduler, now);
        }
        if reference.scrolled {
            self.sync
                .on_reference_scroll(&mut self.notes_pane, &mut self.viewer, &mut self.scheduler, now);
        }
        if let Some(action) = reference.action {
            self.handle_reference_action(action);
        }

        self.run_due_tasks(now);

        if let Some(wait) = self.scheduler.time_until_next(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
        if self.viewer.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.notes.flush(&mut self.scheduler) {
            tracing::info!("Flushed pending notes on exit");
        }
        self.loader.shutdown();
    }
}
