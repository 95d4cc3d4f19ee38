use bytes::Bytes;
use log::{debug, error, warn};
use std::net::SocketAddr;

use lstun::constants::HEADER_LEN;
use lstun::header::Header;
use lstun::packet::SuccessResponse;
use lstun::util::print_bytes;
use lstun::{AddressFamilyError, DecodeError, Error};

pub fn parse_request(buf: &[u8]) -> Result<Header, DecodeError> {
    Header::unpack(buf)
}

// every request of at least HEADER_LEN bytes gets a success response,
// whatever its type and cookie
pub fn get_response(
    req: &Header,
    remote_addr: SocketAddr,
) -> Result<SuccessResponse, AddressFamilyError> {
    SuccessResponse::for_peer(req, remote_addr)
}

pub fn process_request(buf: &[u8], remote_addr: SocketAddr) -> Result<SuccessResponse, Error> {
    let request = parse_request(buf)?;

    if !request.has_magic_cookie() {
        warn!(
            "request from {} without magic cookie, xor with {:#010x}",
            remote_addr, request.cookie
        );
    }
    debug!("request: {}", request);

    Ok(get_response(&request, remote_addr)?)
}

/// The bytes to send back for `buf`, or `None` when the peer gets nothing.
pub fn reply(buf: &[u8], local_addr: SocketAddr, remote_addr: SocketAddr) -> Option<Bytes> {
    if buf.len() < HEADER_LEN {
        debug!(
            "drop short request, len: {}, {} <--- {}",
            buf.len(),
            local_addr,
            remote_addr
        );
        return None;
    }

    debug!(
        "{} <--- {}\n{}",
        local_addr,
        remote_addr,
        print_bytes(buf, " ", 8)
    );

    let response = match process_request(buf, remote_addr) {
        Ok(v) => v,
        Err(e) => {
            error!(
                "error, from remote:{}, local:{}, {}",
                remote_addr, local_addr, e
            );
            return None;
        }
    };

    let data = response.pack();
    debug!(
        "{} ---> {}\n{}",
        local_addr,
        remote_addr,
        print_bytes(&data, " ", 8)
    );
    Some(data)
}
