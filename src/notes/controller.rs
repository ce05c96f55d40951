//! Note editor state: debounced saving, character count and save status

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};

use crate::core::scheduler::{Scheduler, Task};
use crate::core::store::{NoteStore, StoreError};

/// Controller behind the notes text area
pub struct NoteEditor {
    page_id: String,
    store: NoteStore,
    debounce: Duration,
    text: String,
    char_count: usize,
    status: String,
}

impl NoteEditor {
    /// Load the persisted notes for `page_id` and prepare the editor
    pub fn init(store: NoteStore, page_id: impl Into<String>, debounce: Duration) -> Result<Self, StoreError> {
        let page_id = page_id.into();
        let text = store.load(&page_id)?;

        let editor = Self::new(store, page_id, text, debounce);
        tracing::info!(
            "Loaded notes for page {} ({} chars)",
            editor.page_id,
            editor.char_count
        );
        Ok(editor)
    }

    /// Start from already-loaded text
    pub fn new(store: NoteStore, page_id: impl Into<String>, text: String, debounce: Duration) -> Self {
        let mut editor = Self {
            page_id: page_id.into(),
            store,
            debounce,
            text,
            char_count: 0,
            status: String::new(),
        };
        editor.update_count();
        editor.status = format!("Loaded {}", format_timestamp(&Local::now()));
        editor
    }

    /// Page the notes belong to
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Current note text
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable access for the text widget; follow edits with `on_text_changed`
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Number of characters in the current text
    #[cfg(test)]
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Character count as displayed
    pub fn char_count_label(&self) -> String {
        format!("{} chars", self.char_count)
    }

    /// Save status as displayed
    pub fn status(&self) -> &str {
        &self.status
    }

    /// React to an edit: refresh the count now and restart the save debounce
    pub fn on_text_changed(&mut self, scheduler: &mut Scheduler, now: Instant) {
        self.update_count();
        scheduler.schedule(Task::SaveNotes, self.debounce, now);
    }

    /// The debounce elapsed without further edits
    pub fn on_save_timer(&mut self) {
        self.save();
    }

    /// Explicit save request; supersedes any pending debounced save
    pub fn on_manual_save(&mut self, scheduler: &mut Scheduler) {
        if scheduler.cancel(Task::SaveNotes) {
            tracing::debug!("Manual save cancelled pending debounced save");
        }
        self.save();
    }

    /// Save now if a debounced save is still waiting. Returns whether one was.
    pub fn flush(&mut self, scheduler: &mut Scheduler) -> bool {
        if scheduler.cancel(Task::SaveNotes) {
            self.save();
            true
        } else {
            false
        }
    }

    fn save(&mut self) {
        match self.store.save(&self.page_id, &self.text) {
            Ok(()) => {
                self.status = format!("Saved {}", format_timestamp(&Local::now()));
                self.update_count();
                tracing::debug!("Saved notes for page {}", self.page_id);
            }
            Err(e) => {
                tracing::error!("Failed to save notes for page {}: {}", self.page_id, e);
            }
        }
    }

    fn update_count(&mut self) {
        self.char_count = self.text.chars().count();
    }

    #[cfg(test)]
    fn store(&self) -> &NoteStore {
        &self.store
    }
}

/// Human-readable timestamp used in the save status
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-d/%-m/%Y, %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{KeyValueStore, MemoryStore};
    use chrono::Utc;

    const DEBOUNCE: Duration = Duration::from_millis(350);

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some("existing".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".into()))
        }
    }

    fn editor_with(text: &str) -> NoteEditor {
        let mut store = NoteStore::new(MemoryStore::new());
        if !text.is_empty() {
            store.save("page", text).unwrap();
        }
        NoteEditor::init(store, "page", DEBOUNCE).unwrap()
    }

    fn type_text(editor: &mut NoteEditor, scheduler: &mut Scheduler, text: &str, now: Instant) {
        editor.text_mut().push_str(text);
        editor.on_text_changed(scheduler, now);
    }

    fn run_due(editor: &mut NoteEditor, scheduler: &mut Scheduler, now: Instant) {
        for task in scheduler.tick(now) {
            if task == Task::SaveNotes {
                editor.on_save_timer();
            }
        }
    }

    #[test]
    fn test_init_loads_persisted_text() {
        let editor = editor_with("hello");
        assert_eq!(editor.text(), "hello");
        assert_eq!(editor.char_count(), 5);
        assert_eq!(editor.char_count_label(), "5 chars");
        assert!(editor.status().starts_with("Loaded "));
        assert_eq!(editor.page_id(), "page");
    }

    #[test]
    fn test_debounced_save_persists_after_quiet_period() {
        let mut editor = editor_with("");
        let mut scheduler = Scheduler::new();
        let start = Instant::now();

        type_text(&mut editor, &mut scheduler, "a", start);
        run_due(&mut editor, &mut scheduler, start);
        type_text(&mut editor, &mut scheduler, "b", start + Duration::from_millis(200));
        run_due(&mut editor, &mut scheduler, start + Duration::from_millis(400));
        assert_eq!(editor.store().load("page").unwrap(), "");

        run_due(&mut editor, &mut scheduler, start + Duration::from_millis(550));
        assert_eq!(editor.store().load("page").unwrap(), "ab");
        assert!(editor.status().starts_with("Saved "));
    }

    #[test]
    fn test_char_count_updates_before_save() {
        let mut editor = editor_with("");
        let mut scheduler = Scheduler::new();
        let now = Instant::now();

        type_text(&mut editor, &mut scheduler, "καλημέρα", now);
        assert_eq!(editor.char_count(), 8);
        assert_eq!(editor.char_count_label(), "8 chars");
        assert!(editor.status().starts_with("Loaded "));
    }

    #[test]
    fn test_manual_save_is_immediate_and_cancels_debounce() {
        let mut editor = editor_with("");
        let mut scheduler = Scheduler::new();
        let now = Instant::now();

        type_text(&mut editor, &mut scheduler, "draft", now);
        assert!(scheduler.is_pending(Task::SaveNotes));

        editor.on_manual_save(&mut scheduler);
        assert_eq!(editor.store().load("page").unwrap(), "draft");
        assert!(!scheduler.is_pending(Task::SaveNotes));
        assert!(scheduler.tick(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_flush_only_saves_when_pending() {
        let mut editor = editor_with("");
        let mut scheduler = Scheduler::new();

        assert!(!editor.flush(&mut scheduler));
        type_text(&mut editor, &mut scheduler, "closing", Instant::now());
        assert!(editor.flush(&mut scheduler));
        assert_eq!(editor.store().load("page").unwrap(), "closing");
    }

    #[test]
    fn test_storage_failure_is_swallowed() {
        let mut editor = NoteEditor::init(NoteStore::new(FailingStore), "page", DEBOUNCE).unwrap();
        let mut scheduler = Scheduler::new();
        assert_eq!(editor.text(), "existing");

        type_text(&mut editor, &mut scheduler, "!", Instant::now());
        editor.on_manual_save(&mut scheduler);
        assert!(!scheduler.is_pending(Task::SaveNotes));
        assert!(editor.status().starts_with("Loaded "));
        assert_eq!(editor.char_count(), 9);
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 2).unwrap();
        assert_eq!(format_timestamp(&at), "5/3/2024, 09:07:02");
    }
}
