//! The call-executor seam and request cancellation.

use crate::error::{CallError, Error};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Sends read-only calls to contracts.
///
/// Implementations own transport concerns such as timeouts and report them as
/// [`CallError::Transport`]. A contract that executes and reverts is a
/// [`CallError::Reverted`].
#[async_trait]
pub trait CallExecutor: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError>;
}

#[async_trait]
impl<E: CallExecutor + ?Sized> CallExecutor for Arc<E> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        (**self).call(to, data).await
    }
}

/// Observes cancellation of one request.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Fires the [`CancelToken`]s created alongside it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, token) = cancel_pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the request is cancelled. Stays pending forever if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Holds the cancel handle of the latest request; starting a new request
/// cancels the one before it.
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Mutex<Option<CancelHandle>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any request still in flight.
    pub fn begin(&self) -> CancelToken {
        let (handle, token) = cancel_pair();
        if let Some(previous) = self.current.lock().replace(handle) {
            trace!("superseding in-flight request");
            previous.cancel();
        }
        token
    }

    /// Cancel the request in flight, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.current.lock().take() {
            handle.cancel();
        }
    }
}

/// Issue one call, abandoning it as soon as `cancel` fires.
pub async fn call_with_cancel<E: CallExecutor + ?Sized>(
    executor: &E,
    cancel: &CancelToken,
    to: Address,
    data: Bytes,
) -> Result<Bytes, CallError> {
    if cancel.is_cancelled() {
        return Err(CallError::Cancelled);
    }
    trace!(%to, selector = %hex::encode(data.get(..4).unwrap_or_default()), "eth_call");

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CallError::Cancelled),
        result = executor.call(to, data) => result,
    }
}

/// Split a call result into an answer, a revert (`None`) or a fatal error.
pub(crate) fn revert_as_none(result: Result<Bytes, CallError>) -> Result<Option<Bytes>, Error> {
    match result {
        Ok(bytes) => Ok(Some(bytes)),
        Err(CallError::Reverted(_)) => Ok(None),
        Err(CallError::Transport(message)) => Err(Error::Transport(message)),
        Err(CallError::Cancelled) => Err(Error::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Slow;

    #[async_trait]
    impl CallExecutor for Slow {
        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, CallError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Bytes::new())
        }
    }

    struct Echo;

    #[async_trait]
    impl CallExecutor for Echo {
        async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, CallError> {
            Ok(data)
        }
    }

    #[tokio::test]
    async fn test_call_passes_through() {
        let data = Bytes::from_static(&[1, 2, 3, 4]);
        let result = call_with_cancel(&Echo, &CancelToken::never(), Address::ZERO, data.clone()).await;
        assert_eq!(result, Ok(data));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let (handle, token) = cancel_pair();
        let call = tokio::spawn(async move {
            call_with_cancel(&Slow, &token, Address::ZERO, Bytes::new()).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        assert_eq!(call.await.unwrap(), Err(CallError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_call() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        let result = call_with_cancel(&Echo, &token, Address::ZERO, Bytes::new()).await;
        assert_eq!(result, Err(CallError::Cancelled));
    }

    #[test]
    fn test_request_slot_supersedes() {
        let slot = RequestSlot::new();
        let first = slot.begin();
        assert!(!first.is_cancelled());

        let second = slot.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        slot.cancel();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_revert_is_not_fatal() {
        assert_eq!(revert_as_none(Err(CallError::Reverted(Bytes::new()))), Ok(None));
        assert_eq!(
            revert_as_none(Err(CallError::Transport("timeout".into()))),
            Err(Error::Transport("timeout".into()))
        );
        assert_eq!(revert_as_none(Err(CallError::Cancelled)), Err(Error::Cancelled));
    }
}
