//! Peer-to-peer play over a line protocol.
//!
//! - `SyncMessage`: the wire messages and their line format
//! - `InboundQueue`: mutex and condvar FIFO between receiver and game task
//! - `PeerSession`: the TCP connection and its receiver thread
//! - `NetMatch`: one side's view of a networked battle
//!
//! Neither peer is authoritative. Each trusts the moves the other reports.

mod message;
mod mirror;
mod queue;
mod session;

pub use message::{ProtocolError, SyncMessage};
pub use mirror::{MatchOutcome, NetEvent, NetMatch};
pub use queue::{InboundQueue, QueueState};
pub use session::{PeerListener, PeerSession, SyncError, MAX_LINE_BYTES};
