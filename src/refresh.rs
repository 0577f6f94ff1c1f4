//! Scheduled refresh of the trailer aggregate.
//!
//! Runs a forced rebuild at startup (when enabled) and then once a day at the
//! configured local time. Each run also purges expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trailerforge_common::{Error, Result};

use crate::browse::BrowseService;
use crate::config::RefreshConfig;

pub struct RefreshScheduler {
    browse: Arc<BrowseService>,
    on_startup: bool,
    at: NaiveTime,
}

impl RefreshScheduler {
    pub fn new(browse: Arc<BrowseService>, config: &RefreshConfig) -> Result<Self> {
        let at = config.time_of_day().map_err(|e| {
            Error::Validation(format!(
                "invalid refresh time_of_day {:?}: {e}",
                config.time_of_day
            ))
        })?;
        Ok(Self {
            browse,
            on_startup: config.on_startup,
            at,
        })
    }

    /// Run one forced refresh, returning the number of trailers listed.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<usize> {
        tracing::info!("Trailer refresh started");

        match self.browse.refresh(cancel).await {
            Ok(count) => {
                tracing::info!(trailers = count, "Trailer refresh finished");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Trailer refresh failed");
                Err(e)
            }
        }
    }

    /// Refresh on schedule until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(at = %self.at, on_startup = self.on_startup, "Refresh scheduler started");

        if self.on_startup {
            // Failures are logged by run_once.
            self.run_once(&cancel).await.ok();
        }

        loop {
            let delay = delay_until_next(Local::now().naive_local(), self.at);
            tracing::debug!(delay_secs = delay.as_secs(), "Next trailer refresh scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => { break; }
            }

            self.run_once(&cancel).await.ok();
        }

        tracing::info!("Refresh scheduler stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

/// Time from `now` until the next occurrence of `at`. An occurrence exactly at
/// `now` counts as the next day's.
pub fn delay_until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}
