/// recurring callback timer.  The callback runs on a private worker thread, once per
/// interval, until the timer is stopped or dropped.
///
/// the interval is slept off in short slices so a stop request is observed within one
/// slice; a callback that is already running always completes before stop returns.
///
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// the sleep quantum between callback calls; bounds the stop latency
pub const SLEEP_SLICE_MS: u64 = 25;

#[derive(Debug, Default)]
pub struct CallbackTimer {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl CallbackTimer {
    /// create an idle timer
    pub fn new() -> CallbackTimer {
        CallbackTimer::default()
    }

    /// start calling `callback` every `interval_ms` milliseconds on a new worker thread.
    /// A timer that is already running is stopped (and joined) first.
    ///
    /// An interval of zero calls the callback back-to-back.
    pub fn start<F>(&mut self, interval_ms: u64, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.worker.is_some() {
            self.stop();
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("callback-timer".to_string())
            .spawn(move || run_loop(running, interval_ms, callback));

        match spawned {
            Ok(handle) => {
                debug!("timer started, interval: {}ms", interval_ms);
                self.worker = Some(handle);
            }
            Err(e) => {
                error!("could not spawn the timer thread: {:?}", e);
                self.running.store(false, Ordering::Release);
            }
        }
    }

    /// start calling `callback` back-to-back, with no delay between calls
    pub fn start_now<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.start(0, callback)
    }

    /// clear the running flag and block until the worker thread has exited
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.worker.take() {
            match handle.join() {
                Ok(()) => debug!("timer stopped"),
                Err(e) => error!("timer callback panicked: {:?}", e),
            }
        }
    }

    /// true while the loop is flagged to run and the worker thread is alive
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self
                .worker
                .as_ref()
                .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for CallbackTimer {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

// the worker loop; the flag is checked between calls and between sleep slices only
fn run_loop<F: FnMut()>(running: Arc<AtomicBool>, interval_ms: u64, mut callback: F) {
    while running.load(Ordering::Acquire) {
        callback();

        let mut slept = 0u64;
        while slept < interval_ms && running.load(Ordering::Acquire) {
            let slice = SLEEP_SLICE_MS.min(interval_ms - slept);
            thread::sleep(Duration::from_millis(slice));
            slept += slice;
        }
    }
}
