//! Fixed-window admission control for export job creation.
//!
//! Deliberately coarse: this gates the creation rate of an expensive
//! downstream job, it is not a precise rate shaper. Bursts at window
//! boundaries are an accepted tradeoff.

use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed (non-sliding) window counter shared by all creation requests.
///
/// Explicitly constructed and injectable: tests build independent instances
/// and drive a controlled clock through [`ExportRateLimiter::try_admit_at`].
pub struct ExportRateLimiter {
    limit: u32,
    window: Duration,
    // Check-then-increment must be atomic; the whole decision runs under
    // this lock.
    state: Mutex<Option<Window>>,
}

impl ExportRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(None),
        }
    }

    /// Decide one admission against the current wall clock.
    pub fn try_admit(&self) -> bool {
        self.try_admit_at(Instant::now())
    }

    /// Decide one admission at the given instant.
    ///
    /// Lazily starts a window on first use, resets it once `window` has
    /// elapsed, and denies without mutating state when the limit is reached.
    pub fn try_admit_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().expect("rate limiter poisoned");

        let needs_reset = match state.as_ref() {
            None => true,
            Some(w) => now.duration_since(w.started_at) >= self.window,
        };
        if needs_reset {
            *state = Some(Window {
                started_at: now,
                count: 0,
            });
        }

        let window = state.as_mut().expect("window initialized above");
        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_secs: u64) -> ExportRateLimiter {
        ExportRateLimiter::new(limit, Duration::from_secs(window_secs))
    }

    #[test]
    fn test_exactly_limit_admissions_within_window() {
        let rl = limiter(3, 60);
        let now = Instant::now();

        let decisions: Vec<bool> = (0..5).map(|_| rl.try_admit_at(now)).collect();
        assert_eq!(decisions, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_denial_does_not_consume_capacity() {
        let rl = limiter(2, 60);
        let now = Instant::now();

        assert!(rl.try_admit_at(now));
        assert!(rl.try_admit_at(now));
        // Repeated denials leave the window untouched.
        for _ in 0..10 {
            assert!(!rl.try_admit_at(now));
        }

        // A fresh window grants the full limit again.
        let later = now + Duration::from_secs(61);
        assert!(rl.try_admit_at(later));
        assert!(rl.try_admit_at(later));
        assert!(!rl.try_admit_at(later));
    }

    #[test]
    fn test_window_resets_after_exhaustion() {
        let rl = limiter(1, 60);
        let now = Instant::now();

        assert!(rl.try_admit_at(now));
        assert!(!rl.try_admit_at(now + Duration::from_secs(59)));
        assert!(rl.try_admit_at(now + Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_limit_always_denies() {
        let rl = limiter(0, 60);
        assert!(!rl.try_admit_at(Instant::now()));
    }

    #[test]
    fn test_independent_instances_do_not_interfere() {
        let a = limiter(1, 60);
        let b = limiter(1, 60);
        let now = Instant::now();

        assert!(a.try_admit_at(now));
        assert!(b.try_admit_at(now));
        assert!(!a.try_admit_at(now));
        assert!(!b.try_admit_at(now));
    }
}
