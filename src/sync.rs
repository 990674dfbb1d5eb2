//! Small helpers around `std::sync` primitives.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every value guarded in this crate (frames, canvas pixels) stays valid
/// even if a writer panicked halfway through a frame.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
