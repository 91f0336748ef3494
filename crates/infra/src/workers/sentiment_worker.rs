use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use revsense_events::{EventBus, EventEnvelope, ReviewEvent, Subscription};

use crate::read_model::ReviewSentimentStore;
use crate::subscriber::ReviewSentimentSubscriber;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Applies review events to the sentiment read model on a dedicated thread.
///
/// - Subscribes before returning, so nothing published afterwards is missed
/// - Handler failures are logged and never reach the publisher
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct SentimentWorker;

impl SentimentWorker {
    pub fn spawn<B, R>(bus: &B, subscriber: ReviewSentimentSubscriber<R>) -> io::Result<WorkerHandle>
    where
        B: EventBus<EventEnvelope<ReviewEvent>>,
        R: ReviewSentimentStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = bus.subscribe();

        let join = thread::Builder::new()
            .name("review-sentiment".to_string())
            .spawn(move || worker_loop(sub, shutdown_rx, &subscriber))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn worker_loop<R>(
    sub: Subscription<EventEnvelope<ReviewEvent>>,
    shutdown_rx: mpsc::Receiver<()>,
    subscriber: &ReviewSentimentSubscriber<R>,
) where
    R: ReviewSentimentStore,
{
    let tick = Duration::from_millis(250);
    let mut handled = 0u64;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(envelope) => {
                if let Err(err) = subscriber.handle(envelope.payload()) {
                    warn!(
                        event_id = %envelope.event_id(),
                        review_id = %envelope.payload().review_id(),
                        error = %err,
                        "review sentiment handler failed"
                    );
                } else {
                    handled += 1;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(handled, "review sentiment worker stopped");
}
