//! Cooperative cancellation for suite runs.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle used to cancel a run. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token that is not yet cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals cancellation to every receiver.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Creates a receiver observing this token.
    #[must_use]
    pub fn receiver(&self) -> CancellationReceiver {
        CancellationReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`CancellationToken`].
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationReceiver {
    /// Completes once the token is cancelled.
    ///
    /// Never completes if the token is dropped without being cancelled.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Returns true if the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_receivers() {
        let token = CancellationToken::new();
        let mut receiver = token.receiver();
        assert!(!receiver.is_cancelled());

        let waiter = tokio::spawn(async move {
            receiver.cancelled().await;
        });
        token.cancel();

        assert!(tokio::time::timeout(Duration::from_secs(1), waiter).await.is_ok());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_receiver_created_after_cancel_sees_it() {
        let token = CancellationToken::new();
        token.cancel();
        let mut receiver = token.receiver();
        assert!(receiver.is_cancelled());
        receiver.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_token_never_cancels() {
        let token = CancellationToken::new();
        let mut receiver = token.receiver();
        drop(token);

        let outcome = tokio::time::timeout(Duration::from_secs(60), receiver.cancelled()).await;
        assert!(outcome.is_err());
    }
}
