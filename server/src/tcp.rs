//! TCP side of the responder.
//!
//! An acceptor task feeds accepted connections into a bounded queue. The
//! responder loop spawns one handler per connection and, once it stops,
//! waits for every handler it spawned before returning. Connections still
//! sitting in the queue at that point are closed unanswered.

use log::{debug, error, info};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tokio::time::timeout;

use lstun::TransportError;

use crate::server::{shutdown_requested, ShutdownRx};
use crate::stun::reply;
use crate::tracker::{TaskTracker, TrackerHandle};

pub const READ_DEADLINE: Duration = Duration::from_secs(1);
pub const RECV_BUF_LEN: usize = 10_000;
pub const CONN_QUEUE_SIZE: usize = 1000;

enum Incoming {
    Conn(TcpStream, SocketAddr),
    // the acceptor is gone, nothing follows
    Done(AcceptStop),
}

/// Why the acceptor stopped.
#[derive(Debug)]
pub enum AcceptStop {
    /// The responder closed the listener while shutting down.
    ListenerClosed,
    Failed(TransportError),
}

pub struct TcpResponder {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpResponder {
    pub async fn bind(port: u16) -> Result<Self, TransportError> {
        let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::Bind { addr, source: e })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        debug!("listening: {}/tcp", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run(self, mut shutdown: ShutdownRx) {
        let local_addr = self.local_addr;
        info!(
            "Starting Stun server, listening port at {}/tcp",
            local_addr.port()
        );

        let conns = TaskTracker::new();
        let spawner = conns.handle();

        let (queue_tx, mut queue_rx) = mpsc::channel::<Incoming>(CONN_QUEUE_SIZE);
        // dropping close_tx closes the listener
        let (close_tx, close_rx) = oneshot::channel::<()>();

        spawner.spawn(accept_loop(self.listener, queue_tx, close_rx));

        if let Some(stop) = dispatch(&mut queue_rx, &mut shutdown, &spawner, local_addr).await {
            info!("tcp listener stopped, {:?}", stop);
        }

        drop(close_tx);
        drop(queue_rx);
        drop(spawner);

        info!("Waiting tcp connections to drain");
        conns.wait().await;
        info!("Tcp connections drained, stopped tcp server, {}", local_addr);
    }
}

/// Spawns a handler per queued connection until shutdown is requested or
/// the acceptor stops. Returns the acceptor's reason when it reported one.
async fn dispatch(
    queue_rx: &mut Receiver<Incoming>,
    shutdown: &mut ShutdownRx,
    spawner: &TrackerHandle,
    local_addr: SocketAddr,
) -> Option<AcceptStop> {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_requested(shutdown) => {
                info!("Stopping tcp server, {}", local_addr);
                return None;
            }
            incoming = queue_rx.recv() => match incoming {
                Some(Incoming::Conn(stream, remote_addr)) => {
                    spawner.spawn(handle_conn(stream, local_addr, remote_addr));
                }
                Some(Incoming::Done(stop)) => return Some(stop),
                None => {
                    info!("tcp acceptor gone, {}", local_addr);
                    return None;
                }
            }
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    queue_tx: Sender<Incoming>,
    mut close_rx: oneshot::Receiver<()>,
) {
    loop {
        let incoming = tokio::select! {
            res = listener.accept() => match res {
                Ok((stream, remote_addr)) => {
                    debug!("new connection, {}", remote_addr);
                    Incoming::Conn(stream, remote_addr)
                }
                Err(e) => {
                    error!("tcp accept error, {}", e);
                    Incoming::Done(AcceptStop::Failed(TransportError::Accept(e)))
                }
            },
            _ = &mut close_rx => Incoming::Done(AcceptStop::ListenerClosed),
        };

        let done = matches!(incoming, Incoming::Done(_));
        // blocks while the queue is full; fails once the responder dropped it
        if queue_tx.send(incoming).await.is_err() || done {
            break;
        }
    }

    drop(listener);
    debug!("tcp acceptor exit");
}

async fn handle_conn(mut stream: TcpStream, local_addr: SocketAddr, remote_addr: SocketAddr) {
    let mut buf = vec![0u8; RECV_BUF_LEN];

    // exactly one read per connection
    let len = match read_once(&mut stream, &mut buf).await {
        Ok(v) => v,
        Err(e) if e.is_timeout() => {
            debug!("tcp read timeout, abandon {}", remote_addr);
            return;
        }
        Err(e) => {
            error!("error, tcp read, {}, {}", remote_addr, e);
            return;
        }
    };

    let data = match reply(&buf[..len], local_addr, remote_addr) {
        Some(v) => v,
        None => return,
    };

    if let Err(e) = stream.write_all(&data).await {
        error!(
            "error, {} ---> {}, {}",
            local_addr,
            remote_addr,
            TransportError::Write(e)
        );
        return;
    }
    debug!("sent: {}", data.len());

    let _ = stream.shutdown().await;
}

async fn read_once(stream: &mut TcpStream, buf: &mut [u8]) -> Result<usize, TransportError> {
    match timeout(READ_DEADLINE, stream.read(buf)).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(TransportError::Read(e)),
        Err(_) => Err(TransportError::Timeout(READ_DEADLINE)),
    }
}
