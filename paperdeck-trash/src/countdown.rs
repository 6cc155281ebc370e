//! Cosmetic countdown ticker for the trash progress bar.
//!
//! The ticker never counts its own elapsed ticks: every frame is
//! re-derived from the persisted start timestamp and the wall clock,
//! so a ticker resumed after an app-lock screen (or any other
//! interruption) lands at the correct point instead of restarting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::traits::Clock;

/// One progress-bar frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownFrame {
    /// Wall-clock time left before the deletion job fires.
    pub remaining: Duration,
    /// `remaining / total`, clamped to `0.0..=1.0`, for the bar width.
    pub fraction: f32,
}

/// Derive the frame for `now` from the persisted start timestamp.
pub fn frame_at(started_at: DateTime<Utc>, now: DateTime<Utc>, total: Duration) -> CountdownFrame {
    let elapsed = (now - started_at).to_std().unwrap_or_default();
    let remaining = total.saturating_sub(elapsed);
    let fraction = if total.is_zero() {
        0.0
    } else {
        (remaining.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
    };
    CountdownFrame { remaining, fraction }
}

/// A running ticker task plus the receiver the UI renders from.
pub(crate) struct ActiveCountdown {
    pub rx: watch::Receiver<CountdownFrame>,
    task: JoinHandle<()>,
}

impl ActiveCountdown {
    /// Spawn a ticker publishing frames every `tick` until the
    /// countdown reaches zero.
    pub fn spawn(
        clock: Arc<dyn Clock>,
        started_at: DateTime<Utc>,
        total: Duration,
        tick: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(frame_at(started_at, clock.now(), total));
        let task = tokio::spawn(async move {
            let mut frames = interval(tick);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            frames.tick().await;
            loop {
                frames.tick().await;
                let frame = frame_at(started_at, clock.now(), total);
                if tx.send(frame).is_err() {
                    break;
                }
                if frame.remaining.is_zero() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for ActiveCountdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).expect("valid millis")
    }

    #[test]
    fn test_frame_derivation() {
        let total = Duration::from_secs(30);
        let start = at(0);

        let frame = frame_at(start, at(0), total);
        assert_eq!(frame.remaining, total);
        assert_eq!(frame.fraction, 1.0);

        let frame = frame_at(start, at(15_000), total);
        assert_eq!(frame.remaining, Duration::from_secs(15));
        assert!((frame.fraction - 0.5).abs() < 1e-6);

        let frame = frame_at(start, at(45_000), total);
        assert_eq!(frame.remaining, Duration::ZERO);
        assert_eq!(frame.fraction, 0.0);
    }

    #[test]
    fn test_clock_skew_before_start_is_clamped() {
        // The store's timestamp can postdate a skewed clock; treat it
        // as "just started" rather than panicking or overflowing.
        let frame = frame_at(at(10_000), at(5_000), Duration::from_secs(30));
        assert_eq!(frame.remaining, Duration::from_secs(30));
        assert_eq!(frame.fraction, 1.0);
    }
}
