use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    AddressFamily(#[from] AddressFamilyError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    // buf不够
    #[error("buf len:{len} < {need}")]
    BufSize { len: usize, need: usize },

    // 字段的值不合规
    #[error("bad value, {0}")]
    BadValue(String),
}

/// The observed peer address has no 4 byte representation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not an ipv4 address: {0}")]
pub struct AddressFamilyError(pub IpAddr);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bind {addr}, {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("accept, {0}")]
    Accept(#[source] io::Error),

    #[error("read, {0}")]
    Read(#[source] io::Error),

    #[error("write, {0}")]
    Write(#[source] io::Error),

    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Timeout(_) => true,
            TransportError::Read(e) | TransportError::Write(e) => {
                e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock
            }
            _ => false,
        }
    }
}
