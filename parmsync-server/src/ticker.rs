//! Simulated backend feed
//!
//! Once per period the ticker adds a fixed increment to each configured
//! parameter, all in one [`SharedRecord::apply`], standing in for an
//! independent process that owns the read-only values. Settability does not
//! apply here: the ticker is not a remote client.
//!
//! The task stops when its cancellation token fires.

use parmsync_common::{Error, Result, SharedRecord};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
struct TickRule {
    position: usize,
    increment: f64,
}

/// Periodic additive updater for the authoritative record
pub struct Ticker {
    record: SharedRecord,
    rules: Vec<TickRule>,
    period: Duration,
}

impl Ticker {
    /// Resolve `(name, increment)` rules against the record's schema
    ///
    /// Unknown names are a configuration error.
    pub fn new(record: SharedRecord, rules: &[(String, f64)], period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::Config("tick period must be > 0".to_string()));
        }

        let schema = record.schema();
        let rules = rules
            .iter()
            .map(|(name, increment)| {
                schema
                    .position(name)
                    .map(|position| TickRule {
                        position,
                        increment: *increment,
                    })
                    .ok_or_else(|| Error::Config(format!("ticker rule for unknown parameter {}", name)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            record,
            rules,
            period,
        })
    }

    /// Apply one round of increments
    pub fn tick(&self) {
        self.record.apply(|r| {
            for rule in &self.rules {
                let current = r.value_at(rule.position);
                r.set_at(rule.position, current + rule.increment);
            }
        });
    }

    /// Tick every period until `cancel` fires
    ///
    /// The first tick happens one full period after start.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Ticker started: {} rule(s), period {:?}",
            self.rules.len(),
            self.period
        );

        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.tick();
                    debug!("Tick: {:?}", self.record.snapshot());
                }
            }
        }

        info!("Ticker stopped");
    }

    /// Run on the tokio runtime
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parmsync_common::ParameterSchema;
    use std::sync::Arc;

    fn default_record() -> SharedRecord {
        SharedRecord::zeroed(Arc::new(ParameterSchema::default_parameters()))
    }

    fn default_rules() -> Vec<(String, f64)> {
        vec![("Alpha".to_string(), 1.0), ("Beta".to_string(), 2.0)]
    }

    #[test]
    fn test_tick_applies_increments() {
        let record = default_record();
        let ticker = Ticker::new(record.clone(), &default_rules(), Duration::from_secs(1)).unwrap();

        ticker.tick();
        ticker.tick();

        let snap = record.snapshot();
        assert_eq!(snap.get("Alpha"), Some(2.0));
        assert_eq!(snap.get("Beta"), Some(4.0));
        assert_eq!(snap.get("Gamma"), Some(0.0));
        assert_eq!(snap.get("Delta"), Some(0.0));
        assert_eq!(snap.get("Zeta"), Some(0.0));
    }

    #[test]
    fn test_tick_preserves_client_writes() {
        let record = default_record();
        record.apply(|r| r.set("Gamma", 5.5));
        let ticker = Ticker::new(record.clone(), &default_rules(), Duration::from_secs(1)).unwrap();

        ticker.tick();
        assert_eq!(record.snapshot().get("Gamma"), Some(5.5));
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let rules = vec![("Omega".to_string(), 1.0)];
        let result = Ticker::new(default_record(), &rules, Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Omega")));
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = Ticker::new(default_record(), &default_rules(), Duration::ZERO);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_run_ticks_until_cancelled() {
        let record = default_record();
        let ticker =
            Ticker::new(record.clone(), &default_rules(), Duration::from_millis(10)).unwrap();
        let cancel = CancellationToken::new();
        let handle = ticker.spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker should stop promptly")
            .unwrap();

        let alpha = record.snapshot().get("Alpha").unwrap();
        assert!(alpha >= 1.0, "expected at least one tick, Alpha = {}", alpha);

        // No further ticks after cancellation
        let stopped = record.snapshot();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(record.snapshot(), stopped);
    }

    #[tokio::test]
    async fn test_cancel_before_first_tick() {
        let record = default_record();
        let ticker = Ticker::new(record.clone(), &default_rules(), Duration::from_secs(60)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), ticker.run(cancel))
            .await
            .expect("cancelled ticker should return immediately");
        assert_eq!(record.snapshot().get("Alpha"), Some(0.0));
    }
}
