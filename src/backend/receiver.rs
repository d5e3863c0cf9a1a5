//! UDP receiver thread
//!
//! The receiver owns the socket. Every decoded bone sample is published into
//! the shared [`FrameBridge`]; the thread never touches the scene. The socket
//! has a read timeout so the running flag is checked regularly and shutdown
//! does not hang on an idle sender.

use super::osc::{decode_packet, MAX_PACKET_SIZE};
use crate::config::ReceiverConfig;
use crate::error::{Result, RetargetError};
use crate::pipeline::bridge::FrameBridge;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Capacity of the status channel; events past it are dropped
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Pause after the first failed read, doubled per further failure
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Upper bound on the pause; also bounds how long shutdown can wait
const MAX_READ_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Pause before reading again after `consecutive` failed reads in a row
fn read_error_backoff(consecutive: u32) -> Duration {
    let shift = consecutive.saturating_sub(1).min(16);
    READ_ERROR_BACKOFF
        .saturating_mul(1 << shift)
        .min(MAX_READ_ERROR_BACKOFF)
}

/// Status change reported to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverEvent {
    /// Socket bound and reading
    Listening(SocketAddr),
    /// A socket read failed; the receiver keeps going
    SocketError(String),
    /// Thread has exited
    Stopped,
}

/// Counters updated by the receiver thread
#[derive(Debug, Default)]
pub struct ReceiverStats {
    packets: AtomicU64,
    samples: AtomicU64,
    malformed: AtomicU64,
    ignored: AtomicU64,
    undecodable: AtomicU64,
}

/// Point-in-time copy of [`ReceiverStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStatsSnapshot {
    /// Datagrams read
    pub packets: u64,
    /// Bone samples published
    pub samples: u64,
    /// Bone messages with a bad payload
    pub malformed: u64,
    /// Messages at other addresses
    pub ignored: u64,
    /// Datagrams that were not OSC
    pub undecodable: u64,
}

impl ReceiverStats {
    pub fn snapshot(&self) -> ReceiverStatsSnapshot {
        ReceiverStatsSnapshot {
            packets: self.packets.load(Ordering::Relaxed),
            samples: self.samples.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            undecodable: self.undecodable.load(Ordering::Relaxed),
        }
    }
}

/// Receive loop state, run on its own thread
pub struct OscReceiver {
    socket: UdpSocket,
    bone_address: String,
    bridge: Arc<FrameBridge>,
    running: Arc<AtomicBool>,
    stats: Arc<ReceiverStats>,
    events: Sender<ReceiverEvent>,
}

impl OscReceiver {
    /// Bind the socket described by `config`.
    pub fn bind(
        config: &ReceiverConfig,
        bridge: Arc<FrameBridge>,
        running: Arc<AtomicBool>,
        events: Sender<ReceiverEvent>,
    ) -> Result<Self> {
        let addr = config.socket_addr()?;
        let socket = UdpSocket::bind(addr)
            .map_err(|e| RetargetError::Io(e).with_context(format!("Binding {}", addr)))?;
        socket
            .set_read_timeout(Some(config.read_timeout()))
            .map_err(|e| RetargetError::Io(e).with_context("Setting socket read timeout"))?;

        Ok(Self {
            socket,
            bone_address: config.bone_address.clone(),
            bridge,
            running,
            stats: Arc::new(ReceiverStats::default()),
            events,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        Arc::clone(&self.stats)
    }

    /// Run until the running flag is cleared
    pub fn run(&mut self) {
        match self.socket.local_addr() {
            Ok(addr) => {
                tracing::info!("OSC receiver listening on {}", addr);
                self.emit(ReceiverEvent::Listening(addr));
            }
            Err(e) => tracing::warn!("OSC receiver started without a local address: {}", e),
        }

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let mut failures = 0u32;
        while self.running.load(Ordering::SeqCst) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, _from)) => {
                    failures = 0;
                    self.handle_datagram(&buf[..len]);
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    failures = 0;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    // Only the first failure of a run is reported
                    if failures == 1 {
                        tracing::warn!("OSC socket read failed: {}", e);
                        self.emit(ReceiverEvent::SocketError(e.to_string()));
                    } else {
                        tracing::trace!("OSC socket read failed again ({}): {}", failures, e);
                    }
                    std::thread::sleep(read_error_backoff(failures));
                }
            }
        }

        self.emit(ReceiverEvent::Stopped);
        tracing::info!("OSC receiver stopped");
    }

    fn handle_datagram(&self, datagram: &[u8]) {
        self.stats.packets.fetch_add(1, Ordering::Relaxed);
        let decoded = match decode_packet(datagram, &self.bone_address) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::trace!("Dropping undecodable datagram: {}", e);
                self.stats.undecodable.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        self.stats
            .malformed
            .fetch_add(decoded.malformed as u64, Ordering::Relaxed);
        self.stats
            .ignored
            .fetch_add(decoded.ignored as u64, Ordering::Relaxed);
        self.stats
            .samples
            .fetch_add(decoded.samples.len() as u64, Ordering::Relaxed);
        for sample in decoded.samples {
            self.bridge.publish_sample(sample);
        }
    }

    fn emit(&self, event: ReceiverEvent) {
        // A full or closed channel only loses a status line
        let _ = self.events.try_send(event);
    }
}

/// Handle to a running receiver thread
pub struct ReceiverHandle {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    stats: Arc<ReceiverStats>,
    events: Receiver<ReceiverEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ReceiverHandle {
    /// Bind the socket and start the receive thread.
    ///
    /// Binding happens on the calling thread so an unusable address is
    /// reported here rather than as an event.
    pub fn spawn(config: &ReceiverConfig, bridge: Arc<FrameBridge>) -> Result<Self> {
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));
        let mut receiver = OscReceiver::bind(config, bridge, Arc::clone(&running), event_tx)?;
        let local_addr = receiver.local_addr()?;
        let stats = receiver.stats();

        let thread = std::thread::Builder::new()
            .name("osc-receiver".to_string())
            .spawn(move || receiver.run())
            .map_err(|e| RetargetError::Io(e).with_context("Spawning receiver thread"))?;

        Ok(Self {
            local_addr,
            running,
            stats,
            events: event_rx,
            thread: Some(thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> ReceiverStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Try to receive a status event without blocking
    pub fn try_recv(&self) -> Option<ReceiverEvent> {
        self.events.try_recv().ok()
    }

    /// Drain all pending status events
    pub fn drain_events(&self) -> Vec<ReceiverEvent> {
        self.events.try_iter().collect()
    }

    /// Ask the thread to stop without waiting for it
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(&mut self) {
        self.request_stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("OSC receiver thread panicked");
            }
        }
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::osc::{bone_message, encode_packet};
    use crate::types::BoneSample;
    use rosc::OscPacket;
    use std::time::Instant;

    #[test]
    fn test_read_error_backoff_grows_and_caps() {
        assert_eq!(read_error_backoff(1), Duration::from_millis(10));
        assert_eq!(read_error_backoff(2), Duration::from_millis(20));
        assert_eq!(read_error_backoff(4), Duration::from_millis(80));
        assert_eq!(read_error_backoff(7), MAX_READ_ERROR_BACKOFF);
        assert_eq!(read_error_backoff(u32::MAX), MAX_READ_ERROR_BACKOFF);
        assert!(read_error_backoff(0) > Duration::ZERO);
    }

    fn loopback_config() -> ReceiverConfig {
        ReceiverConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            read_timeout_ms: 20,
            ..ReceiverConfig::default()
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_handle_datagram_publishes_and_counts() {
        let (tx, _rx) = bounded(4);
        let bridge = Arc::new(FrameBridge::new());
        let receiver = OscReceiver::bind(
            &loopback_config(),
            Arc::clone(&bridge),
            Arc::new(AtomicBool::new(true)),
            tx,
        )
        .unwrap();

        let msg = bone_message("/VMC/Ext/Bone/Pos", &BoneSample::identity("Hips"));
        receiver.handle_datagram(&encode_packet(&OscPacket::Message(msg)).unwrap());
        receiver.handle_datagram(b"junk");

        let stats = receiver.stats().snapshot();
        assert_eq!(stats.packets, 2);
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.undecodable, 1);
        assert_eq!(bridge.pending_len(), 1);
    }

    #[test]
    fn test_spawn_receive_and_shutdown() {
        let bridge = Arc::new(FrameBridge::new());
        let mut handle = ReceiverHandle::spawn(&loopback_config(), Arc::clone(&bridge)).unwrap();
        assert!(wait_for(|| handle
            .try_recv()
            .is_some_and(|e| matches!(e, ReceiverEvent::Listening(_)))));

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let msg = bone_message(
            "/VMC/Ext/Bone/Pos",
            &BoneSample::new("Spine", [0.0, 1.5, 0.0], [0.0, 0.0, 0.0, 1.0]),
        );
        let bytes = encode_packet(&OscPacket::Message(msg)).unwrap();
        sender.send_to(&bytes, handle.local_addr()).unwrap();

        assert!(wait_for(|| bridge.pending_len() == 1));
        let drained = bridge.drain_all();
        assert_eq!(drained[0].1.position, [0.0, 1.5, 0.0]);

        handle.shutdown();
        assert!(!handle.is_running());
        assert!(handle.drain_events().contains(&ReceiverEvent::Stopped));
    }

    #[test]
    fn test_bind_rejects_bad_address() {
        let config = ReceiverConfig {
            bind_addr: "nowhere".to_string(),
            ..ReceiverConfig::default()
        };
        assert!(ReceiverHandle::spawn(&config, Arc::new(FrameBridge::new())).is_err());
    }
}
