use log::{debug, error, info};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use lstun::TransportError;

use crate::server::{is_shutdown, ShutdownRx};
use crate::stun::reply;

// how long one recv may block before the shutdown flag is checked again
pub const READ_DEADLINE: Duration = Duration::from_secs(1);
pub const RECV_BUF_LEN: usize = 10_000;

pub struct UdpResponder {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpResponder {
    pub async fn bind(port: u16) -> Result<Self, TransportError> {
        let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TransportError::Bind { addr, source: e })?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        debug!("listening: {}/udp", local_addr);
        Ok(Self { socket, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves datagrams until `shutdown` turns true, then closes the socket.
    pub async fn run(self, shutdown: ShutdownRx) {
        let local_addr = self.local_addr;
        info!(
            "Starting Stun server, listening port at {}/udp",
            local_addr.port()
        );

        let mut buf = vec![0u8; RECV_BUF_LEN];

        while !is_shutdown(&shutdown) {
            let (len, remote_addr) = match recv(&self.socket, &mut buf).await {
                Ok(v) => v,
                Err(e) if e.is_timeout() => continue,
                Err(e) => {
                    error!("error, recv_udp, {}, {}", local_addr, e);
                    continue;
                }
            };

            let data = match reply(&buf[..len], local_addr, remote_addr) {
                Some(v) => v,
                None => continue,
            };

            // one unacknowledged write, no retry
            match self.socket.send_to(&data, remote_addr).await {
                Ok(v) => {
                    debug!("sent: {}", v);
                }
                Err(e) => {
                    error!("error, {} ---> {}, {}", local_addr, remote_addr, e);
                }
            };
        }

        drop(self.socket);
        info!("Stopped udp server, {}", local_addr);
    }
}

async fn recv(socket: &UdpSocket, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError> {
    match timeout(READ_DEADLINE, socket.recv_from(buf)).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(TransportError::Read(e)),
        Err(_) => Err(TransportError::Timeout(READ_DEADLINE)),
    }
}
