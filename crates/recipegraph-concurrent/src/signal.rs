use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot stop signal shared by a pool of workers.
///
/// Any number of threads may call [`fire`](Self::fire); exactly one of them
/// observes `true`. Workers poll [`is_fired`](Self::is_fired) between units
/// of work.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    fired: Arc<CachePadded<AtomicBool>>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    #[inline]
    pub fn fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn fires_once() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn clones_share_state() {
        let signal = CancellationSignal::new();
        let observer = signal.clone();
        signal.fire();
        assert!(observer.is_fired());
    }

    #[test]
    fn concurrent_fire_has_single_winner() {
        let signal = CancellationSignal::new();
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let signal = signal.clone();
                let winners = winners.clone();
                thread::spawn(move || {
                    if signal.fire() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
