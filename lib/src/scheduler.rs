//! Periodic advancement of generations.

use crate::error::Error;
use log::{info, trace, warn};
use std::{
    fmt::{self, Debug, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// The default time between two generations, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Parses a generation interval typed by the user.
///
/// Only positive integers are accepted.
pub fn parse_interval(input: &str) -> Result<u64, Error> {
    match input.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(Error::InvalidInterval(input.to_owned())),
    }
}

/// A running job: the worker thread and the channel that stops it.
struct Job {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Calls a tick handler every `interval_ms` milliseconds while running.
///
/// The handler runs on a dedicated worker thread. The next tick is only
/// scheduled after the handler returns, so two ticks never overlap.
///
/// The interval can be changed at any time; a change takes effect on the
/// next scheduled tick. Stopping cancels the pending tick, and starting
/// again waits a whole new interval before the first tick.
pub struct GenerationScheduler {
    interval_ms: Arc<AtomicU64>,
    on_tick: Arc<dyn Fn() + Send + Sync>,
    job: Option<Job>,
}

impl GenerationScheduler {
    /// Creates a stopped scheduler.
    pub fn new<F>(interval_ms: u64, on_tick: F) -> Result<Self, Error>
    where
        F: Fn() + Send + Sync + 'static,
    {
        check_interval(interval_ms)?;
        Ok(GenerationScheduler {
            interval_ms: Arc::new(AtomicU64::new(interval_ms)),
            on_tick: Arc::new(on_tick),
            job: None,
        })
    }

    /// Whether ticks are being fired.
    ///
    /// A worker whose tick handler panicked no longer counts as running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.job
            .as_ref()
            .map_or(false, |job| !job.handle.is_finished())
    }

    /// Milliseconds between two ticks.
    #[inline]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Changes the time between two ticks. Does not restart the scheduler.
    pub fn set_interval(&self, interval_ms: u64) -> Result<(), Error> {
        check_interval(interval_ms)?;
        self.interval_ms.store(interval_ms, Ordering::Relaxed);
        Ok(())
    }

    /// Starts firing ticks. Does nothing if already running.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            return Ok(());
        }
        // Reap a worker that died from a panicking handler.
        self.stop();
        let (stop, receiver) = mpsc::channel::<()>();
        let interval_ms = Arc::clone(&self.interval_ms);
        let on_tick = Arc::clone(&self.on_tick);
        let handle = thread::Builder::new()
            .name(String::from("generation-scheduler"))
            .spawn(move || loop {
                let interval = Duration::from_millis(interval_ms.load(Ordering::Relaxed));
                match receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        trace!("Tick");
                        on_tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        info!("Scheduler started, every {} ms", self.interval_ms());
        self.job = Some(Job { stop, handle });
        Ok(())
    }

    /// Stops firing ticks. Does nothing if already stopped.
    ///
    /// Waits for a tick in progress to finish, so it must not be called
    /// from the tick handler itself.
    pub fn stop(&mut self) {
        if let Some(Job { stop, handle }) = self.job.take() {
            // The worker may already be gone if the handler panicked.
            let _ = stop.send(());
            if handle.join().is_err() {
                warn!("The tick handler panicked");
            }
            info!("Scheduler stopped");
        }
    }
}

impl Drop for GenerationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Debug for GenerationScheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationScheduler")
            .field("interval_ms", &self.interval_ms())
            .field("running", &self.is_running())
            .finish()
    }
}

fn check_interval(interval_ms: u64) -> Result<(), Error> {
    if interval_ms == 0 {
        Err(Error::InvalidInterval(interval_ms.to_string()))
    } else {
        Ok(())
    }
}
