//! Mutex recovery so a panicked publisher cannot wedge the session event bus.

use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(context, "mutex poisoned; recovering inner state");
        crate::log_debug(&format!("Mutex poisoned in {context}; recovering"));
        poisoned.into_inner()
    })
}
