use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Persistence collaborator for the two user-visible pause settings.
///
/// The store reads these once at startup as initial values and writes back
/// whenever `TOGGLE_SKIP_PAUSING` / `LOG_EXCEPTIONS` is applied. The storage
/// format is owned by the implementor; this core never touches process-wide
/// settings directly.
pub trait Preferences: Send + Sync + 'static {
    fn skip_pausing(&self) -> bool;
    fn log_exceptions(&self) -> bool;
    fn set_skip_pausing(&self, value: bool);
    fn set_log_exceptions(&self, value: bool);
}

/// In-memory preference store. The default for tests and for embedders
/// that don't persist settings between sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryPrefs {
    skip_pausing: Arc<AtomicBool>,
    log_exceptions: Arc<AtomicBool>,
}

impl MemoryPrefs {
    pub fn new(skip_pausing: bool, log_exceptions: bool) -> Self {
        Self {
            skip_pausing: Arc::new(AtomicBool::new(skip_pausing)),
            log_exceptions: Arc::new(AtomicBool::new(log_exceptions)),
        }
    }
}

impl Preferences for MemoryPrefs {
    fn skip_pausing(&self) -> bool {
        self.skip_pausing.load(Ordering::Acquire)
    }

    fn log_exceptions(&self) -> bool {
        self.log_exceptions.load(Ordering::Acquire)
    }

    fn set_skip_pausing(&self, value: bool) {
        self.skip_pausing.store(value, Ordering::Release);
    }

    fn set_log_exceptions(&self, value: bool) {
        self.log_exceptions.store(value, Ordering::Release);
    }
}
