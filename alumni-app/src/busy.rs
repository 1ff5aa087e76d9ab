//! Per-screen busy flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Raised while a request is outstanding. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag, or `None` if it is already raised.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Lowers the flag when dropped, on every exit path.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let flag = BusyFlag::new();
        assert!(!flag.is_set());

        let guard = flag.try_acquire().unwrap();
        assert!(flag.is_set());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = BusyFlag::new();
        let view = flag.clone();
        let _guard = flag.try_acquire().unwrap();
        assert!(view.is_set());
    }
}
