//! Periodic trigger for automated round advances.
//!
//! The timer task handle is owned exclusively by [`RoundScheduler`];
//! callers only ever see `arm`/`disarm`. Ticks are single-flight: the
//! tick future is awaited inline in the timer loop, so a new tick cannot
//! fire while a previous request is still outstanding, and missed ticks
//! are delayed rather than bursted.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// What the tick body tells the scheduler to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking.
    Continue,
    /// Stop the loop: completion, failure, or the lifecycle left
    /// auto-run while the tick was in flight.
    Stop,
}

pub struct RoundScheduler {
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RoundScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: Mutex::new(None),
        }
    }

    /// Start the periodic trigger. Idempotent: if a timer is already
    /// live this call leaves it untouched, so two timers never coexist.
    pub fn arm<F, Fut>(&self, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = TickOutcome> + Send,
    {
        let mut slot = self.handle.lock();
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                debug!("scheduler already armed; arm is a no-op");
                return;
            }
        }
        let period = self.period;
        *slot = Some(tokio::spawn(async move {
            // First tick fires one full period after arming, not
            // immediately; the arming operation has just applied a
            // fresh snapshot.
            let start = time::Instant::now() + period;
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick().await == TickOutcome::Stop {
                    break;
                }
            }
        }));
        debug!(period_ms = period.as_millis() as u64, "scheduler armed");
    }

    /// Cancel the periodic trigger. Idempotent and safe to call when not
    /// armed. A tick blocked in a remote call is cancelled at its await
    /// point; its response is never applied.
    pub fn disarm(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            debug!("scheduler disarmed");
        }
    }

    /// Whether a live timer exists right now.
    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for RoundScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_on_the_configured_cadence() {
        let scheduler = RoundScheduler::new(Duration::from_millis(300));
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);
        scheduler.arm(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Continue
            }
        });

        // Nothing before the first full period elapses.
        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // Ticks land at 300, 600, and 900 ms.
        time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        scheduler.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn arm_twice_keeps_a_single_timer() {
        let scheduler = RoundScheduler::new(Duration::from_millis(100));
        let fired = Arc::new(AtomicU32::new(0));
        for _ in 0..2 {
            let counter = Arc::clone(&fired);
            scheduler.arm(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    TickOutcome::Continue
                }
            });
        }

        time::sleep(Duration::from_millis(550)).await;
        // A doubled timer would have produced ~10.
        assert_eq!(fired.load(Ordering::SeqCst), 5);
        scheduler.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_never_overlap() {
        let scheduler = RoundScheduler::new(Duration::from_millis(100));
        let in_flight = Arc::new(AtomicBool::new(false));
        let overlapped = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU32::new(0));

        let flag = Arc::clone(&in_flight);
        let saw_overlap = Arc::clone(&overlapped);
        let counter = Arc::clone(&ticks);
        scheduler.arm(move || {
            let flag = Arc::clone(&flag);
            let saw_overlap = Arc::clone(&saw_overlap);
            let counter = Arc::clone(&counter);
            async move {
                if flag.swap(true, Ordering::SeqCst) {
                    saw_overlap.store(true, Ordering::SeqCst);
                }
                // Each tick outlives several periods.
                time::sleep(Duration::from_millis(350)).await;
                flag.store(false, Ordering::SeqCst);
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Continue
            }
        });

        time::sleep(Duration::from_millis(2000)).await;
        scheduler.disarm();
        assert!(!overlapped.load(Ordering::SeqCst));
        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_outcome_ends_the_loop() {
        let scheduler = RoundScheduler::new(Duration::from_millis(100));
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);
        scheduler.arm(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Stop
            }
        });

        time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_armed());

        // A finished timer may be re-armed.
        let counter = Arc::clone(&fired);
        scheduler.arm(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                TickOutcome::Stop
            }
        });
        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disarm_when_unarmed_is_a_no_op() {
        let scheduler = RoundScheduler::new(Duration::from_millis(100));
        assert!(!scheduler.is_armed());
        scheduler.disarm();
        scheduler.disarm();
        assert!(!scheduler.is_armed());
    }
}
