use anyhow::Result;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Waits between polling ticks. Returns `false` once the run should stop.
pub trait Pause {
    fn pause(&self, duration: Duration) -> bool;
}

/// Interrupt flag shared with the Ctrl+C handler.
///
/// A pending wait is woken as soon as the flag is raised, so the loop stops
/// on its next wake-up instead of sleeping out the whole interval.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn install() -> Result<Self> {
        let shutdown = Self::default();
        let handle = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::debug!("Interrupt received");
            handle.trigger();
        })?;
        Ok(shutdown)
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stop = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stop = true;
        cvar.notify_all();
    }
}

impl Pause for Shutdown {
    fn pause(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (stop, _) = cvar
            .wait_timeout_while(guard, duration, |stop| !*stop)
            .unwrap_or_else(PoisonError::into_inner);
        !*stop
    }
}
