use crate::repo::FetchError;

use std::future::Future;
use tokio::sync::watch;

/// Cancellation flag shared by every fetch of a run.
#[derive(Clone)]
pub struct Cancel {
    rx: watch::Receiver<bool>,
}

pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Nobody listening means nothing left to cancel
        let _ = self.tx.send(true);
    }
}

impl Cancel {
    pub fn new() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Cancel { rx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the handle is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                futures_util::future::pending::<()>().await;
            }
        }
    }

    /// Run a fetch, or give up on it with [`FetchError::Cancelled`].
    pub async fn guard<T, F>(&self, url: &str, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        if self.is_cancelled() {
            return Err(FetchError::Cancelled { url: url.to_owned() });
        }
        tokio::select! {
            res = fut => res,
            _ = self.cancelled() => Err(FetchError::Cancelled { url: url.to_owned() }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_guard() {
        let (handle, cancel) = Cancel::new();
        let res = cancel.guard("a", async { Ok::<_, FetchError>(1) }).await;
        assert_eq!(res, Ok(1));

        handle.cancel();
        let res = cancel
            .guard("b", futures_util::future::pending::<Result<u8, FetchError>>())
            .await;
        assert_eq!(
            res,
            Err(FetchError::Cancelled {
                url: "b".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (handle, cancel) = Cancel::new();
        drop(handle);
        assert!(!cancel.is_cancelled());
        let res = cancel.guard("a", async { Ok::<_, FetchError>(()) }).await;
        assert!(res.is_ok());
    }
}
