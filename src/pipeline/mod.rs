//! Hand-off between the receiver thread and the frame thread.
//!
//! ```text
//! [OscReceiver] --publish--> [FrameBridge] --drain_all--> [UpdateDriver]
//!   any thread                 one mutex                    frame thread
//! ```

pub mod bridge;

pub use bridge::{FrameBridge, LatestMailbox, MailboxStats};
