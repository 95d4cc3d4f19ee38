use bytes::{Buf, BufMut};
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};

use crate::attrs::AttrHeader;
use crate::constants::*;
use crate::error::{AddressFamilyError, DecodeError};

// family:u16(=1) port:u16 address:u32
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBody {
    pub family: u16,
    pub port: u16,
    pub address: u32,
}

impl AddressBody {
    pub fn new(port: u16, address: u32) -> Self {
        Self {
            family: ATTR_FAMILY_IPV4,
            port,
            address,
        }
    }

    pub fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.family);
        buf.put_u16(self.port);
        buf.put_u32(self.address);
    }

    pub fn get(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        if buf.remaining() < ADDRESS_BODY_LEN as usize {
            return Err(DecodeError::BufSize {
                len: buf.remaining(),
                need: ADDRESS_BODY_LEN as usize,
            });
        }

        let family = buf.get_u16();
        if family != ATTR_FAMILY_IPV4 {
            return Err(DecodeError::BadValue(format!("ip family: {}", family)));
        }
        let port = buf.get_u16();
        let address = buf.get_u32();

        Ok(Self {
            family,
            port,
            address,
        })
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::from(self.address), self.port)
    }
}

/// Reads an attribute header and checks it against the fixed shape.
pub(crate) fn get_attr_header(buf: &mut impl Buf, attr_type: u16) -> Result<(), DecodeError> {
    let header = AttrHeader::get(buf)?;
    if header.attr_type != attr_type {
        return Err(DecodeError::BadValue(format!(
            "attr type: {:#06x} != {:#06x}",
            header.attr_type, attr_type
        )));
    }
    if header.attr_len != ADDRESS_BODY_LEN {
        return Err(DecodeError::BadValue(format!(
            "attr len: {} != {}",
            header.attr_len, ADDRESS_BODY_LEN
        )));
    }
    Ok(())
}

// mapped-address, observed port and ip verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedAddress {
    pub header: AttrHeader,
    pub body: AddressBody,
}

impl MappedAddress {
    pub fn new(port: u16, ip: Ipv4Addr) -> Self {
        Self {
            header: AttrHeader::new(ATTR_MAPPED_ADDRESS, ADDRESS_BODY_LEN),
            body: AddressBody::new(port, u32::from(ip)),
        }
    }

    pub fn address(&self) -> SocketAddrV4 {
        self.body.socket_addr()
    }

    pub fn put(&self, buf: &mut impl BufMut) {
        self.header.put(buf);
        self.body.put(buf);
    }

    pub fn get(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        get_attr_header(buf, ATTR_MAPPED_ADDRESS)?;
        let body = AddressBody::get(buf)?;
        Ok(Self {
            header: AttrHeader::new(ATTR_MAPPED_ADDRESS, ADDRESS_BODY_LEN),
            body,
        })
    }
}

/// Peers reaching an IPv4 socket through a dual-stack listener show up as
/// `::ffff:a.b.c.d`; those still have a 4 byte form.
pub fn ipv4_of(ip: IpAddr) -> Result<Ipv4Addr, AddressFamilyError> {
    match ip {
        IpAddr::V4(v) => Ok(v),
        IpAddr::V6(v) => v.to_ipv4_mapped().ok_or(AddressFamilyError(ip)),
    }
}
