use chrono::{DateTime, Utc};
use jwt_security::{LedgerError, RevocationLedger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Drops revocation records whose token has expired anyway.
pub struct RevocationPurgeJob {
    ledger: Arc<dyn RevocationLedger>,
    every: Duration,
}

impl RevocationPurgeJob {
    pub fn new(ledger: Arc<dyn RevocationLedger>, every: Duration) -> Self {
        Self { ledger, every }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let purged = self.ledger.purge_expired(now).await?;
        info!(purged, "purged expired revocation records");
        Ok(purged)
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures = 0u32;

        info!(interval_secs = self.every.as_secs(), "starting revocation purge job");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(_) => consecutive_failures = 0,
                        Err(e) => {
                            consecutive_failures += 1;
                            error!(
                                error = %e,
                                consecutive_failures,
                                "revocation purge failed, will retry on next interval"
                            );
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("stopping revocation purge job");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
