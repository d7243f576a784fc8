//! Session handle shared between the simulation loop and background savers.

use crate::session::Session;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle; every access holds the session lock for the duration of
/// the closure, so a save never observes a half-applied step.
#[derive(Clone, Debug)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        // A panicked holder leaves the state consistent per operation.
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
