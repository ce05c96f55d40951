//! Bidirectional scroll synchronization between the notes and the reference
//!
//! Mirrored writes produce scroll events of their own. The `locked` flag
//! swallows those until the scheduler's next tick releases it.

use std::time::{Duration, Instant};

use super::scroller::{mirror_scroll, Scroller};
use crate::core::scheduler::{Scheduler, Task};

pub const STATUS_ON: &str = "Sync: ON";
pub const STATUS_OFF: &str = "Sync: OFF";
pub const STATUS_BLOCKED: &str = "Sync: blocked (cross-site)";

/// Result of asking the embedded viewer for its document
pub enum DocumentAccess<'a> {
    /// Same-origin document; its scroller may be read and written
    Accessible(&'a mut dyn Scroller),
    /// Cross-origin document; nothing about it can be touched
    Blocked,
}

/// The embedded side of the synchronization
pub trait EmbeddedDocument {
    /// Check whether the current document may be accessed
    fn probe(&mut self) -> DocumentAccess<'_>;
}

/// User toggle plus reentrancy guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    pub enabled: bool,
    pub locked: bool,
}

/// Scroll synchronizer
#[derive(Debug)]
pub struct ScrollSync {
    state: SyncState,
    listening_to_reference: bool,
    status: String,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScrollSync {
    /// Create a synchronizer, optionally starting disabled
    pub fn new(enabled: bool) -> Self {
        Self {
            state: SyncState {
                enabled,
                locked: false,
            },
            listening_to_reference: false,
            status: if enabled { STATUS_ON } else { STATUS_OFF }.to_string(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether reference scrolls are currently being followed
    #[cfg(test)]
    pub fn is_listening_to_reference(&self) -> bool {
        self.listening_to_reference
    }

    /// Flip the user toggle
    pub fn toggle(&mut self) -> bool {
        self.state.enabled = !self.state.enabled;
        self.set_status(if self.state.enabled { STATUS_ON } else { STATUS_OFF });
        tracing::info!("Scroll sync {}", if self.state.enabled { "enabled" } else { "disabled" });
        self.state.enabled
    }

    /// The notes scrolled. Returns true if the reference was written.
    pub fn on_editor_scroll(
        &mut self,
        editor: &dyn Scroller,
        viewer: &mut dyn EmbeddedDocument,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> bool {
        if !self.state.enabled || self.state.locked {
            return false;
        }

        let reference = match viewer.probe() {
            DocumentAccess::Accessible(scroller) => scroller,
            DocumentAccess::Blocked => {
                self.set_status(STATUS_BLOCKED);
                return false;
            }
        };

        let written = mirror_scroll(editor, reference);
        self.lock(scheduler, now);
        self.set_status(STATUS_ON);

        if let Some(offset) = written {
            tracing::debug!("Mirrored notes scroll to reference offset {:.1}", offset);
        }
        written.is_some()
    }

    /// The reference scrolled. Returns true if the notes were written.
    pub fn on_reference_scroll(
        &mut self,
        editor: &mut dyn Scroller,
        viewer: &mut dyn EmbeddedDocument,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> bool {
        if !self.listening_to_reference || !self.state.enabled || self.state.locked {
            return false;
        }

        let reference = match viewer.probe() {
            DocumentAccess::Accessible(scroller) => scroller,
            DocumentAccess::Blocked => {
                // The document was replaced by a cross-origin one without a
                // load event reaching us yet
                self.listening_to_reference = false;
                self.set_status(STATUS_BLOCKED);
                return false;
            }
        };

        let written = mirror_scroll(reference, editor);
        self.lock(scheduler, now);
        self.set_status(STATUS_ON);

        if let Some(offset) = written {
            tracing::debug!("Mirrored reference scroll to notes offset {:.1}", offset);
        }
        written.is_some()
    }

    /// A document finished loading in the viewer
    pub fn on_reference_load(&mut self, viewer: &mut dyn EmbeddedDocument) {
        match viewer.probe() {
            DocumentAccess::Accessible(_) => {
                self.listening_to_reference = true;
                if self.state.enabled {
                    self.set_status(STATUS_ON);
                }
            }
            DocumentAccess::Blocked => {
                self.listening_to_reference = false;
                if self.state.enabled {
                    self.set_status(STATUS_BLOCKED);
                }
            }
        }
    }

    /// The zero-delay release task fired
    pub fn on_lock_release(&mut self) {
        self.state.locked = false;
    }

    fn lock(&mut self, scheduler: &mut Scheduler, now: Instant) {
        self.state.locked = true;
        scheduler.schedule(Task::ReleaseSyncLock, Duration::ZERO, now);
    }

    fn set_status(&mut self, status: &str) {
        if self.status != status {
            tracing::debug!("{}", status);
            self.status = status.to_string();
        }
    }
}
