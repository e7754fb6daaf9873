use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Owns the cancellation token the runtime loop and its helpers watch.
#[derive(Debug)]
pub struct ShutdownGuard {
    token: CancellationToken,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel on SIGTERM or Ctrl-C, whichever comes first.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = terminate() => tracing::info!("received SIGTERM, shutting down"),
                r = signal::ctrl_c() => match r {
                    Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                        return;
                    }
                },
                _ = token.cancelled() => return,
            }
            token.cancel();
        });
    }
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
