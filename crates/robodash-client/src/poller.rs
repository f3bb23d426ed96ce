//! Background polling shared by every periodically refreshed view.
//!
//! One tokio task per source fetches on a fixed period and publishes the
//! outcome through a watch channel. A fetch always finishes before the next
//! one starts; ticks missed meanwhile are skipped rather than bunched up.

use std::future::Future;
use std::time::Duration;

use robodash_core::{now_ms, EpochMs};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Result of the latest successful fetch; cleared when a fetch fails.
    pub value: Option<T>,
    pub error: Option<String>,
    pub updated_ms: Option<EpochMs>,
    /// Number of completed fetches, successful or not.
    pub generation: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            updated_ms: None,
            generation: 0,
        }
    }
}

impl<T> PollState<T> {
    pub fn is_loading(&self) -> bool {
        self.generation == 0
    }
}

/// Handle to a running poller. Dropping it stops the background task.
#[derive(Debug)]
pub struct Poller<T> {
    name: &'static str,
    rx: watch::Receiver<PollState<T>>,
    handle: JoinHandle<()>,
}

impl<T: Clone> Poller<T> {
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.rx.clone()
    }

    pub fn latest(&self) -> PollState<T> {
        self.rx.borrow().clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        debug!(poller = self.name, "stopping poller");
        self.handle.abort();
    }
}

pub fn spawn_poller<T, F, Fut>(name: &'static str, period: Duration, mut fetch: F) -> Poller<T>
where
    T: Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
{
    let (tx, rx) = watch::channel(PollState::default());
    let handle = tokio::spawn(async move {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            let outcome = fetch().await;
            if let Err(e) = &outcome {
                warn!(poller = name, "poll failed: {e}");
            }
            tx.send_modify(|state| {
                state.generation += 1;
                state.updated_ms = Some(now_ms());
                match outcome {
                    Ok(v) => {
                        state.value = Some(v);
                        state.error = None;
                    }
                    Err(e) => {
                        state.value = None;
                        state.error = Some(e.to_string());
                    }
                }
            });
        }
    });

    Poller { name, rx, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn publishes_values_and_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let poller = spawn_poller("test", Duration::from_millis(50), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    Err(ClientError::InvalidInput("boom".into()))
                } else {
                    Ok(n)
                }
            }
        });

        let mut rx = poller.subscribe();
        let first = timeout(Duration::from_secs(2), rx.wait_for(|s| s.generation >= 1))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(first.value, Some(0));

        let second = timeout(Duration::from_secs(2), rx.wait_for(|s| s.generation >= 2))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(second.value, None);
        assert!(second.error.unwrap().contains("boom"));

        let third = timeout(Duration::from_secs(2), rx.wait_for(|s| s.generation >= 3))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert!(third.value.is_some());
        assert!(third.error.is_none());
    }

    #[tokio::test]
    async fn fetches_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (in_flight.clone(), peak.clone());
        let poller = spawn_poller("slow", Duration::from_millis(5), move || {
            let (f, p) = (f.clone(), p.clone());
            async move {
                let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(30)).await;
                f.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let mut rx = poller.subscribe();
        timeout(Duration::from_secs(2), rx.wait_for(|s| s.generation >= 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_handle_stops_polling() {
        let poller = spawn_poller("drop", Duration::from_millis(5), || async { Ok(1u8) });
        let mut rx = poller.subscribe();
        timeout(Duration::from_secs(2), rx.wait_for(|s| s.generation >= 1))
            .await
            .unwrap()
            .unwrap();
        drop(poller);

        // Sender goes away with the aborted task; outstanding receivers see
        // the channel close.
        let closed = timeout(Duration::from_secs(2), async {
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        assert!(closed.is_ok());
    }
}
