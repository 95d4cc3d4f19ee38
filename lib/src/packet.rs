use bytes::{Bytes, BytesMut};
use std::net::{IpAddr, SocketAddr};

use crate::attrs::address_attr::{ipv4_of, MappedAddress};
use crate::attrs::xor_address::XorMappedAddress;
use crate::constants::*;
use crate::error::{AddressFamilyError, DecodeError};
use crate::header::Header;

// header + mapped-address + xor-mapped-address, 44 bytes, no padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessResponse {
    pub header: Header,
    pub mapped: MappedAddress,
    pub xor_mapped: XorMappedAddress,
}

/// Builds the answer to `request` for a peer seen at `port`/`ip`.
///
/// The response type is always the success code, whatever the request type
/// was. Cookie and transaction id are echoed, and the cookie is also the xor
/// key for the xor-mapped-address.
pub fn build_success_response(
    request: &Header,
    port: u16,
    ip: IpAddr,
) -> Result<SuccessResponse, AddressFamilyError> {
    let ip = ipv4_of(ip)?;

    let header = Header::new(
        MESSAGE_TYPE_BIND_RES,
        RESPONSE_ATTRS_LEN,
        request.cookie,
        request.trans_id,
    );

    Ok(SuccessResponse {
        header,
        mapped: MappedAddress::new(port, ip),
        xor_mapped: XorMappedAddress::new(port, ip, request.cookie),
    })
}

impl SuccessResponse {
    pub fn for_peer(request: &Header, peer: SocketAddr) -> Result<Self, AddressFamilyError> {
        build_success_response(request, peer.port(), peer.ip())
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RESPONSE_LEN);
        self.header.put(&mut buf);
        self.mapped.put(&mut buf);
        self.xor_mapped.put(&mut buf);
        buf.freeze()
    }

    pub fn unpack(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < RESPONSE_LEN {
            return Err(DecodeError::BufSize {
                len: buf.len(),
                need: RESPONSE_LEN,
            });
        }

        let header = Header::unpack(buf)?;
        if header.msg_type != MESSAGE_TYPE_BIND_RES {
            return Err(DecodeError::BadValue(format!(
                "msg_type: {:#06x}",
                header.msg_type
            )));
        }
        if header.msg_len != RESPONSE_ATTRS_LEN {
            return Err(DecodeError::BadValue(format!(
                "msg_len: {} != {}",
                header.msg_len, RESPONSE_ATTRS_LEN
            )));
        }

        let mut attrs = &buf[HEADER_LEN..RESPONSE_LEN];
        let mapped = MappedAddress::get(&mut attrs)?;
        let xor_mapped = XorMappedAddress::get(&mut attrs)?;

        Ok(Self {
            header,
            mapped,
            xor_mapped,
        })
    }
}
