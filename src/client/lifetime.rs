use std::future::Future;

use tokio::sync::watch;

use crate::client::error::ClientError;

/// Owned by a view; dropping it cancels every request bound to its tokens.
#[derive(Debug)]
pub struct Lifetime {
    sender: watch::Sender<bool>,
}

/// Cheap handle used to bind requests and background tasks to a [`Lifetime`].
#[derive(Debug, Clone)]
pub struct LifetimeToken {
    receiver: watch::Receiver<bool>,
}

impl Lifetime {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn token(&self) -> LifetimeToken {
        LifetimeToken {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.sender.send_replace(true);
    }
}

impl LifetimeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Resolves once the owning lifetime is cancelled or dropped.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `request` unless the lifetime ends first.
    pub async fn guard<T, F>(&self, request: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Cancelled),
            result = request => result,
        }
    }
}
