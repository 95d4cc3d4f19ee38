use log::debug;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

use lstun::header::{Header, TransId};
use lstun::packet::SuccessResponse;
use lstun::util::{new_trans_id, print_bytes};
use lstun::DecodeError;

pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("io, {0}")]
    Io(#[from] io::Error),

    #[error("decode, {0}")]
    Decode(#[from] DecodeError),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("transaction id mismatch")]
    TransIdMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    Udp,
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub mapped_address: SocketAddrV4,
    // already un-xored
    pub xor_mapped_address: SocketAddrV4,
}

pub async fn probe(server: SocketAddr, proto: Proto) -> Result<ProbeResult, ProbeError> {
    match proto {
        Proto::Udp => probe_udp(server).await,
        Proto::Tcp => probe_tcp(server).await,
    }
}

pub async fn probe_udp(server: SocketAddr) -> Result<ProbeResult, ProbeError> {
    let sock = UdpSocket::bind("0.0.0.0:0").await?;
    let trans_id = new_trans_id();
    let buf = Header::binding_request(trans_id).pack();

    debug!(
        "{:?} --> {}\n{}",
        sock.local_addr(),
        server,
        print_bytes(&buf, " ", 8)
    );
    let sent = sock.send_to(&buf, server).await?;
    debug!("sent: {}", sent);

    let mut recv_buf = vec![0u8; 1024];
    let (len, remote_addr) = match timeout(RESPONSE_TIMEOUT, sock.recv_from(&mut recv_buf)).await {
        Ok(v) => v?,
        Err(_) => return Err(ProbeError::Timeout(RESPONSE_TIMEOUT)),
    };
    debug!(
        "{:?} <-- {}\n{}",
        sock.local_addr(),
        remote_addr,
        print_bytes(&recv_buf[..len], " ", 8)
    );

    parse_response(&recv_buf[..len], &trans_id)
}

pub async fn probe_tcp(server: SocketAddr) -> Result<ProbeResult, ProbeError> {
    let mut stream = TcpStream::connect(server).await?;
    let trans_id = new_trans_id();
    let buf = Header::binding_request(trans_id).pack();

    debug!(
        "{:?} --> {}\n{}",
        stream.local_addr(),
        server,
        print_bytes(&buf, " ", 8)
    );
    stream.write_all(&buf).await?;

    // the server answers once and closes
    let mut recv_buf = vec![];
    match timeout(RESPONSE_TIMEOUT, stream.read_to_end(&mut recv_buf)).await {
        Ok(v) => v?,
        Err(_) => return Err(ProbeError::Timeout(RESPONSE_TIMEOUT)),
    };
    debug!(
        "{:?} <-- {}\n{}",
        stream.local_addr(),
        server,
        print_bytes(&recv_buf, " ", 8)
    );

    parse_response(&recv_buf, &trans_id)
}

fn parse_response(buf: &[u8], trans_id: &TransId) -> Result<ProbeResult, ProbeError> {
    let response = SuccessResponse::unpack(buf)?;
    if &response.header.trans_id != trans_id {
        return Err(ProbeError::TransIdMismatch);
    }

    Ok(ProbeResult {
        mapped_address: response.mapped.address(),
        xor_mapped_address: response.xor_mapped.address(response.header.cookie),
    })
}
