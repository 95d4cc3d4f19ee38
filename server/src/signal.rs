use log::{debug, error, info};

#[cfg(windows)]
pub async fn wait_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => {
            info!("recv ctrl_c, shutdown")
        }
        Err(e) => {
            debug!("error, ctrl_c, {:?}", e);
        }
    }
}

/// Resolves on the next delivery of the signal. A signal that could not be
/// registered never resolves, the other shutdown sources still apply.
#[cfg(unix)]
async fn recv_signal(registered: &mut std::io::Result<tokio::signal::unix::Signal>, name: &str) {
    match registered {
        Ok(signal) => {
            if signal.recv().await.is_some() {
                return;
            }
            debug!("{} stream closed", name);
        }
        Err(e) => {
            error!("error, register {} handler, {}", name, e);
        }
    }
    std::future::pending().await
}

#[cfg(unix)]
pub async fn wait_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    async fn ctrl_c() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("error, register ctrl_c handler, {}", e);
            std::future::pending::<()>().await;
        }
    }

    // registered so a reload request does not kill the process
    async fn ignore_hangup() {
        let mut hangup = signal(SignalKind::hangup());
        loop {
            recv_signal(&mut hangup, "SIGHUP").await;
            info!("ignoring SIGHUP, config reload not supported");
        }
    }

    let mut terminate = signal(SignalKind::terminate());

    tokio::select! {
        _ = recv_signal(&mut terminate, "SIGTERM") => {
            info!("recv unix terminate signal");
        },
        _ = ctrl_c() => {
            info!("recv unix ctrl_c signal");
        },
        _ = ignore_hangup() => {}
    }
}
