use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns the view's network effects and ties them to its lifetime.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    shutdown: CancellationToken,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cancelled effect is dropped at its next await point and dispatches nothing.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.child_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => tracing::debug!("effect cancelled"),
                () = fut => {}
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
