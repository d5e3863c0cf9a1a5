//! Shared state read by the viewer panels.
//!
//! The app writes to [`Topics`] once per frame from receiver events and the
//! driver's tick report. Panels only read it.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::backend::{ReceiverEvent, ReceiverStatsSnapshot};
use crate::pipeline::MailboxStats;
use crate::retarget::{DriverStats, TickReport};
use crate::types::ReceiverStatus;

/// Window over which the drained-sample rate is averaged
const RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct Topics {
    // --- Receiver ---
    pub receiver_status: ReceiverStatus,
    pub listen_addr: Option<SocketAddr>,
    pub receiver_stats: ReceiverStatsSnapshot,
    /// Most recent socket or startup error
    pub last_error: Option<String>,

    // --- Driver ---
    pub last_tick: TickReport,
    pub driver_stats: DriverStats,
    pub mailbox_stats: MailboxStats,

    /// Samples applied per second, refreshed every [`RATE_WINDOW`]
    pub sample_rate: f64,
    rate_window_start: Option<Instant>,
    rate_window_samples: u64,
}

impl Topics {
    pub fn apply_event(&mut self, event: ReceiverEvent) {
        match event {
            ReceiverEvent::Listening(addr) => {
                self.receiver_status = ReceiverStatus::Listening;
                self.listen_addr = Some(addr);
            }
            ReceiverEvent::SocketError(message) => {
                self.receiver_status = ReceiverStatus::Error;
                self.last_error = Some(message);
            }
            ReceiverEvent::Stopped => self.receiver_status = ReceiverStatus::Stopped,
        }
    }

    /// Record a tick that happened at `now`
    pub fn record_tick(&mut self, report: TickReport, stats: DriverStats, now: Instant) {
        // Errors clear once samples flow again
        if report.updated > 0 && self.receiver_status == ReceiverStatus::Error {
            self.receiver_status = ReceiverStatus::Listening;
        }
        self.last_tick = report;
        self.driver_stats = stats;

        let start = *self.rate_window_start.get_or_insert(now);
        self.rate_window_samples += report.updated as u64;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= RATE_WINDOW {
            self.sample_rate = self.rate_window_samples as f64 / elapsed.as_secs_f64();
            self.rate_window_start = Some(now);
            self.rate_window_samples = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_drive_status() {
        let mut topics = Topics::default();
        assert_eq!(topics.receiver_status, ReceiverStatus::Idle);

        let addr: SocketAddr = "127.0.0.1:39539".parse().unwrap();
        topics.apply_event(ReceiverEvent::Listening(addr));
        assert_eq!(topics.receiver_status, ReceiverStatus::Listening);
        assert_eq!(topics.listen_addr, Some(addr));

        topics.apply_event(ReceiverEvent::SocketError("reset".to_string()));
        assert_eq!(topics.receiver_status, ReceiverStatus::Error);
        assert_eq!(topics.last_error.as_deref(), Some("reset"));

        topics.apply_event(ReceiverEvent::Stopped);
        assert_eq!(topics.receiver_status, ReceiverStatus::Stopped);
    }

    #[test]
    fn test_sample_rate_over_window() {
        let mut topics = Topics::default();
        let start = Instant::now();
        let report = TickReport {
            drained: 10,
            updated: 10,
            ..TickReport::default()
        };

        topics.record_tick(report, DriverStats::default(), start);
        assert_eq!(topics.sample_rate, 0.0);
        topics.record_tick(report, DriverStats::default(), start + Duration::from_millis(500));
        topics.record_tick(report, DriverStats::default(), start + Duration::from_secs(2));
        assert!((topics.sample_rate - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_samples_clear_socket_error() {
        let mut topics = Topics::default();
        topics.apply_event(ReceiverEvent::SocketError("reset".to_string()));
        let report = TickReport {
            drained: 1,
            updated: 1,
            ..TickReport::default()
        };
        topics.record_tick(report, DriverStats::default(), Instant::now());
        assert_eq!(topics.receiver_status, ReceiverStatus::Listening);
    }
}
