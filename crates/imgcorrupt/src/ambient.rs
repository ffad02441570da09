//! Ambient (thread-local) randomness with scoped temporary seeding.
//!
//! Some kernels draw from an ambient RNG instead of taking a seed argument.
//! Callers make them reproducible by running them inside
//! [`with_temporary_seed`], which installs a freshly seeded RNG for the
//! duration of the closure and restores the previous one afterwards, on
//! normal return and on unwind alike.

use std::cell::RefCell;

use tracing::trace;

use crate::error::Result;
use crate::rng::{checked_seed, DeterministicRng};

thread_local! {
    static AMBIENT: RefCell<DeterministicRng> = RefCell::new(DeterministicRng::from_entropy());
}

/// Puts the saved ambient RNG back when dropped.
struct RestoreGuard {
    previous: Option<DeterministicRng>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // Ignore the error raised while the thread-local itself is being torn down.
            let _ = AMBIENT.try_with(|ambient| *ambient.borrow_mut() = previous);
        }
    }
}

/// Run `f` with the ambient RNG seeded to `seed`, then restore the prior RNG.
///
/// Scopes nest with stack discipline. Fails with an argument error, without
/// running `f`, if `seed` is negative or does not fit in 32 bits.
///
/// Must not be called from inside a [`with_ambient_rng`] closure.
pub fn with_temporary_seed<S, F, T>(seed: S, f: F) -> Result<T>
where
    S: TryInto<u32> + Copy + std::fmt::Display,
    F: FnOnce() -> T,
{
    let seed = checked_seed(seed)?;
    trace!(seed, "entering temporary ambient seed scope");

    let previous = AMBIENT.with(|ambient| {
        std::mem::replace(&mut *ambient.borrow_mut(), DeterministicRng::new(seed))
    });
    let _guard = RestoreGuard {
        previous: Some(previous),
    };

    Ok(f())
}

/// Borrow the ambient RNG for a batch of draws.
pub fn with_ambient_rng<T>(f: impl FnOnce(&mut DeterministicRng) -> T) -> T {
    AMBIENT.with(|ambient| f(&mut ambient.borrow_mut()))
}
