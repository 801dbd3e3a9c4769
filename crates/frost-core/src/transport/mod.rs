//! The transport contract the round driver depends on (spec §6).
//!
//! A transport is an external collaborator: it only has to deliver opaque
//! [`Frame`]s whole and in order from a named sender to a named recipient,
//! or to everyone on broadcast. The core never inspects transport internals;
//! production transports (network relays, authenticated channels) live
//! outside this crate.

use crate::codec::Frame;
use crate::error::Result;
use futures_util::Stream;
use std::pin::Pin;

pub use ::async_trait::async_trait;

/// Deliver and receive [`Frame`]s for one party in a protocol instance.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `frame` to `frame.to()` (every party, if broadcast).
    /// Synchronous enough to preserve per-sender order.
    async fn send(&self, frame: Frame) -> Result<()>;

    /// Frames addressed to this party, including broadcasts from others.
    /// The stream ends once [`Transport::done`] is called.
    fn incoming(&self) -> Pin<Box<dyn Stream<Item = Frame> + Send>>;

    /// Release this party's transport resources.
    async fn done(&self);
}

/// In-memory transport for tests and the demo binary.
pub mod memory;

pub use memory::MemoryHub;
