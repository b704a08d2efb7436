//! Expiry watchdog: periodic token re-check independent of navigation.
//!
//! DESIGN
//! ======
//! An owned tokio task ticking on a fixed interval. Each tick asks the
//! context to check the stored token; once a logout has cleared it, later
//! ticks find nothing and do nothing. The task is aborted when the
//! [`Watchdog`] is stopped or dropped, so no tick outlives its context.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::context::{DEFAULT_WATCHDOG_INTERVAL, SessionContext};

pub struct Watchdog {
    handle: JoinHandle<()>,
}

impl Watchdog {
    /// Spawn the ticking task. A zero interval falls back to the default.
    #[must_use]
    pub fn spawn(ctx: Arc<SessionContext>, interval: Duration) -> Self {
        let period = if interval.is_zero() { DEFAULT_WATCHDOG_INTERVAL } else { interval };
        info!(period_ms = period.as_millis(), "session watchdog started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; mount already checked expiry.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if ctx.check_expiry() {
                    debug!("watchdog forced logout");
                }
            }
        });
        Self { handle }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("session watchdog stopped");
    }
}

#[cfg(test)]
#[path = "watchdog_test.rs"]
mod tests;
