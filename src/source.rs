//! The contract between the dashboard and whatever produces bandwidth samples.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};

use crate::errors::Result;
use crate::history::BandwidthSample;

/// Bytes read and written during one sampling interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandwidthEvent {
    pub read: u64,
    pub written: u64,
}

impl From<BandwidthEvent> for BandwidthSample {
    fn from(event: BandwidthEvent) -> Self {
        BandwidthSample::new(event.read, event.written)
    }
}

pub type Listener = Box<dyn FnMut(BandwidthEvent) + Send + 'static>;

/// A producer of periodic bandwidth events.
///
/// `subscribe` may deliver from any thread. `unsubscribe` stops delivery and
/// must tolerate being called without a live subscription.
pub trait EventSource {
    fn subscribe(&mut self, listener: Listener) -> Result<()>;
    fn unsubscribe(&mut self);
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn subscribe(&mut self, listener: Listener) -> Result<()> {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&mut self) {
        (**self).unsubscribe();
    }
}

/// Background thread that polls once per interval and hands results to a listener.
pub(crate) struct Ticker {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Ticker {
    pub(crate) fn spawn<F>(interval: Duration, mut poll: F, mut listener: Listener) -> Self
    where
        F: FnMut() -> Option<BandwidthEvent> + Send + 'static,
    {
        let (stop, stopped) = bounded::<()>(0);
        let ticks = tick(interval);

        let worker = thread::spawn(move || loop {
            select! {
                recv(ticks) -> _ => {
                    if let Some(event) = poll() {
                        listener(event);
                    }
                }
                // Fires once the sender is dropped.
                recv(stopped) -> _ => return,
            }
        });

        Self {
            stop: Some(stop),
            worker: Some(worker),
        }
    }

    pub(crate) fn stop(&mut self) {
        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use crossbeam_channel::unbounded;

    use super::*;

    #[test]
    fn event_converts_to_sample() {
        let sample = BandwidthSample::from(BandwidthEvent {
            read: 7,
            written: 3,
        });
        assert_eq!(sample, BandwidthSample::new(7, 3));
    }

    #[test]
    fn ticker_delivers_until_stopped() {
        let (tx, rx) = unbounded();
        let counter = Arc::new(AtomicU64::new(0));
        let polled = Arc::clone(&counter);

        let mut ticker = Ticker::spawn(
            Duration::from_millis(5),
            move || {
                let n = polled.fetch_add(1, Ordering::SeqCst);
                Some(BandwidthEvent { read: n, written: 0 })
            },
            Box::new(move |event| {
                let _ = tx.send(event);
            }),
        );

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.read, 0);
        ticker.stop();
        ticker.stop();

        let seen = counter.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }
}
