/*
udp 和 tcp 各绑定一个端口
一个退出 watch, true 表示退出
所有任务都挂在调用方的 tracker 上, 等 tracker 即等全部退出
*/

use log::{info, warn};
use std::net::SocketAddr;
use tokio::sync::watch;

use lstun::TransportError;

use crate::config::Configuration;
use crate::tcp::TcpResponder;
use crate::tracker::TrackerHandle;
use crate::udp::UdpResponder;

pub type ShutdownRx = watch::Receiver<bool>;

/// Non-blocking check, used by loops that poll.
///
/// A dropped sender counts as shutdown.
pub fn is_shutdown(rx: &ShutdownRx) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

/// Resolves once shutdown is requested or the sender is dropped.
pub async fn shutdown_requested(rx: &mut ShutdownRx) {
    let _ = rx.wait_for(|v| *v).await;
}

pub struct Server {
    udp: Option<UdpResponder>,
    tcp: Option<TcpResponder>,
}

impl Server {
    /// Binds every enabled transport. A bind failure is returned as is, there
    /// is no retry and no other port.
    pub async fn new(conf: &Configuration) -> Result<Self, TransportError> {
        let udp = match conf.udp.enabled {
            true => Some(UdpResponder::bind(conf.udp.port).await?),
            false => None,
        };
        let tcp = match conf.tcp.enabled {
            true => Some(TcpResponder::bind(conf.tcp.port).await?),
            false => None,
        };

        Ok(Self { udp, tcp })
    }

    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.udp.as_ref().map(|v| v.local_addr())
    }

    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp.as_ref().map(|v| v.local_addr())
    }

    /// Spawns the responders on `tracker` and returns right away.
    ///
    /// Once `shutdown` turns true every responder stops; waiting on the
    /// tracker then covers the tcp handlers still draining as well.
    pub fn start(self, shutdown: ShutdownRx, tracker: &TrackerHandle) {
        if self.udp.is_none() && self.tcp.is_none() {
            warn!("udp and tcp both disabled, nothing to serve");
        }

        if let Some(udp) = self.udp {
            tracker.spawn(udp.run(shutdown.clone()));
        }

        if let Some(tcp) = self.tcp {
            tracker.spawn(tcp.run(shutdown));
        }

        info!("server started");
    }
}
