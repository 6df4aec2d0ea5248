//! OS signal handling.

/// Completes once the process received SIGINT or SIGTERM.
#[cfg(target_family = "unix")]
pub async fn terminate() {
    unix::terminate().await;
}

/// Completes once the process received CTRL-C.
#[cfg(not(target_family = "unix"))]
pub async fn terminate() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("[CORE] Failed to listen for CTRL-C: {}", err);
        futures::future::pending::<()>().await;
    }
}

#[cfg(target_family = "unix")]
mod unix {
    use tokio::signal::unix::{signal, SignalKind};

    pub(super) async fn terminate() {
        let (mut int, mut term) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(int), Ok(term)) => (int, term),
            (Err(err), _) | (_, Err(err)) => {
                log::error!("[CORE] Failed to register signal handlers: {}", err);
                return futures::future::pending().await;
            }
        };

        tokio::select! {
            _ = int.recv() => log::info!("[CORE] Received SIGINT"),
            _ = term.recv() => log::info!("[CORE] Received SIGTERM"),
        }
    }
}
