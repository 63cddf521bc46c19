// ── Bounded fan-out ──
//
// Sibling branches (per-group game listings, per-game pass listings) run
// through an ordered `buffered` stream so results come back in request
// order regardless of completion order. A shared pacer optionally spaces
// branch starts to stay under upstream rate limits.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Concurrency and pacing for sibling branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutPolicy {
    /// Branches in flight at once. Zero is treated as one.
    pub concurrency: usize,
    /// Minimum gap between two branch starts.
    pub min_interval: Duration,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            concurrency: 4,
            min_interval: Duration::ZERO,
        }
    }
}

/// Spaces out starts by at least `interval`.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    /// Wait for this caller's slot. Returns immediately with no interval.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}

/// Runs batches of branches under one [`FanOutPolicy`].
///
/// The pacer is shared by every batch, so concurrent aggregations are
/// spaced against each other too.
#[derive(Debug)]
pub struct FanOut {
    policy: FanOutPolicy,
    pacer: Pacer,
}

impl FanOut {
    pub fn new(policy: FanOutPolicy) -> Self {
        let pacer = Pacer::new(policy.min_interval);
        Self { policy, pacer }
    }

    pub fn policy(&self) -> &FanOutPolicy {
        &self.policy
    }

    /// Apply `branch` to every item, at most `concurrency` at a time.
    /// Output order matches input order.
    pub async fn run<I, T, F, Fut, R>(&self, items: I, mut branch: F) -> Vec<R>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let pacer = &self.pacer;
        stream::iter(items)
            .map(|item| {
                let work = branch(item);
                async move {
                    pacer.wait().await;
                    work.await
                }
            })
            .buffered(self.policy.concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn preserves_input_order() {
        let fan_out = FanOut::new(FanOutPolicy::default());

        // Later items finish first.
        let out = fan_out
            .run(1..=5u64, |n| async move {
                tokio::time::sleep(Duration::from_millis(100 / n)).await;
                n * 10
            })
            .await;

        assert_eq!(out, vec![10, 20, 30, 40, 50]);
    }

    #[tokio::test(start_paused = true)]
    async fn bounds_in_flight_branches() {
        let fan_out = FanOut::new(FanOutPolicy {
            concurrency: 3,
            min_interval: Duration::ZERO,
        });
        let in_flight = &AtomicUsize::new(0);
        let peak = &AtomicUsize::new(0);

        fan_out
            .run(0..12, |_| async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_concurrency_still_progresses() {
        let fan_out = FanOut::new(FanOutPolicy {
            concurrency: 0,
            min_interval: Duration::ZERO,
        });
        let out = fan_out.run(vec!['a', 'b'], |c| async move { c }).await;
        assert_eq!(out, vec!['a', 'b']);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_spaces_branch_starts() {
        let interval = Duration::from_millis(250);
        let fan_out = FanOut::new(FanOutPolicy {
            concurrency: 4,
            min_interval: interval,
        });
        let origin = Instant::now();

        let starts = fan_out
            .run(0..4, |_| async { Instant::now() })
            .await;

        let offsets: Vec<Duration> = starts.iter().map(|s| *s - origin).collect();
        assert_eq!(offsets[0], Duration::ZERO);
        for pair in offsets.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }
}
