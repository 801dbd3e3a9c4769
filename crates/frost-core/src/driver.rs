//! The round-based state machine that drives a keygen or sign session to
//! completion (spec §4.3). Grounded on the Go original's `pkg/handler.go`
//! (`Handler::HandleMessage`/`ProcessAll`/`Done`) and the teacher's async
//! task style; generalized to a transport-agnostic `Round` trait so the
//! driver never names a concrete round type (spec §9's polymorphism note).

use crate::codec::Frame;
use crate::error::{Error, Result};
use crate::party::PartyId;
use crate::transport::Transport;
use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Where a round transition leads: another round, or a terminal output.
pub enum NextRound<O> {
    Round(Box<dyn Round<Output = O>>),
    Terminal(O),
}

/// The uniform contract every concrete round (keygen round 1/2, sign round
/// 1/2) implements. The driver only ever talks to this trait, never a
/// concrete round type.
#[async_trait::async_trait]
pub trait Round: Send {
    /// The artifact produced when the protocol reaches its terminal round.
    type Output: Send;

    /// Frames to send as soon as this round begins, before any peer input
    /// is required (e.g. keygen round 1's commitment broadcast, or sign
    /// round 2's share broadcast computed entirely from round 1's
    /// carried-over state). Most rounds that wait on peers return `vec![]`.
    fn on_enter(&mut self) -> Result<Vec<Frame>>;

    /// Store an inbound frame already known to come from a party other
    /// than ourselves. Returns [`Error::WrongRound`] if the frame belongs
    /// to a later round (the driver stages it, not fatal); any other `Err`
    /// is fatal to the session.
    fn store_message(&mut self, frame: Frame) -> Result<()>;

    /// Whether every expected peer has contributed to the current round.
    fn is_ready(&self) -> bool;

    /// Cryptographically verify everything stored so far. Called once,
    /// exactly when [`Round::is_ready`] first returns true.
    async fn process_messages(&mut self) -> Result<()>;

    /// Produce any further outbound frames once the round is complete
    /// (most rounds have none left to send beyond `on_enter`).
    fn generate_messages(&mut self) -> Result<Vec<Frame>>;

    /// Consume this round and advance, or produce the terminal output.
    fn next_round(self: Box<Self>) -> Result<NextRound<Self::Output>>;
}

/// A handle the caller uses to cancel a running session. Closing it causes
/// the driver's next loop iteration to release the transport and return
/// [`Error::Cancelled`] (spec §5's cancellation model).
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// The driver's half of a cancellation signal.
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Build a fresh, un-cancelled signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Drive `round` to completion over `transport`, returning the session's
/// terminal output or the first fatal error encountered.
///
/// `self_id` lets the driver discard frames broadcast back to their own
/// sender (spec §4.3 step 1: "if `frame.from == self_id`, discard").
///
/// The transport is released exactly once, however this returns: normal
/// completion, cancellation, or any fatal protocol error (spec §5: "scoped
/// to a single session ... on normal completion and on error"; spec §7:
/// "the driver stops advancing rounds, and the transport is released").
/// All of `run_until_done`'s exits funnel through here so none of them has
/// to remember to call `transport.done()` itself.
#[instrument(skip(transport, round, cancel), fields(self_id = %self_id))]
pub async fn run<T, O>(
    self_id: PartyId,
    transport: &T,
    round: Box<dyn Round<Output = O>>,
    cancel: CancelToken,
) -> Result<O>
where
    T: Transport,
    O: Send,
{
    let result = run_until_done(self_id, transport, round, cancel).await;
    transport.done().await;
    result
}

async fn run_until_done<T, O>(
    self_id: PartyId,
    transport: &T,
    mut round: Box<dyn Round<Output = O>>,
    mut cancel: CancelToken,
) -> Result<O>
where
    T: Transport,
    O: Send,
{
    let mut incoming = transport.incoming();
    let mut staged: Vec<Frame> = Vec::new();

    for frame in round.on_enter()? {
        transport.send(frame).await?;
    }

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if !round.is_ready() {
            tokio::select! {
                _ = cancel.rx.changed() => continue,
                frame = incoming.next() => {
                    let Some(frame) = frame else {
                        return Err(Error::Cancelled);
                    };
                    if frame.from() == self_id {
                        continue;
                    }
                    store_or_restage(round.as_mut(), frame, &mut staged)?;
                }
            }
            continue;
        }

        debug!("round ready, processing stored messages");
        round.process_messages().await?;
        let outbound = round.generate_messages()?;
        for frame in outbound {
            transport.send(frame).await?;
        }

        match round.next_round()? {
            NextRound::Round(mut next) => {
                info!("advancing to next round");
                for frame in next.on_enter()? {
                    transport.send(frame).await?;
                }
                round = next;
                let pending = std::mem::take(&mut staged);
                for frame in pending {
                    store_or_restage(round.as_mut(), frame, &mut staged)?;
                }
            }
            NextRound::Terminal(output) => {
                info!("session complete");
                return Ok(output);
            }
        }
    }
}

fn store_or_restage<O>(
    round: &mut (dyn Round<Output = O> + '_),
    frame: Frame,
    staged: &mut Vec<Frame>,
) -> Result<()> {
    match round.store_message(frame.clone()) {
        Ok(()) => Ok(()),
        Err(Error::WrongRound { .. }) => {
            staged.push(frame);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
