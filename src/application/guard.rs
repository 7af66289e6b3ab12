use crate::error::{PaymentError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Mutual-exclusion flag for settlement.
///
/// Execution is serialized per operation, so the only way to observe the
/// locked state is a synchronous callback from the external transfer
/// re-entering settlement mid-flight. The token returned by [`try_lock`]
/// releases the flag on drop, covering every exit path including errors.
///
/// [`try_lock`]: ReentrancyGuard::try_lock
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_lock(&self) -> Result<GuardToken<'_>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            Ok(GuardToken { guard: self })
        } else {
            Err(PaymentError::ReentrantCall)
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

#[must_use = "the guard unlocks as soon as the token is dropped"]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lock_is_rejected() {
        let guard = ReentrancyGuard::new();
        let token = guard.try_lock().unwrap();

        assert!(guard.is_locked());
        assert!(matches!(
            guard.try_lock(),
            Err(PaymentError::ReentrantCall)
        ));

        drop(token);
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_release_allows_relock() {
        let guard = ReentrancyGuard::new();
        drop(guard.try_lock().unwrap());
        drop(guard.try_lock().unwrap());
        assert!(!guard.is_locked());
    }
}
