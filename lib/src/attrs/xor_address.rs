use bytes::{Buf, BufMut};
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::attrs::address_attr::{get_attr_header, AddressBody};
use crate::attrs::AttrHeader;
use crate::constants::*;
use crate::error::DecodeError;
use crate::util;

// xor-mapped-address 端口和ip需要混淆
// port 和 cookie 高16位 做 xor
// address 和 cookie 做 xor
//
// the cookie is whatever the request carried, not MAGIC_COOKIE

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorMappedAddress {
    pub header: AttrHeader,
    pub body: AddressBody,
}

impl XorMappedAddress {
    pub fn new(port: u16, ip: Ipv4Addr, cookie: u32) -> Self {
        let body = AddressBody::new(
            util::xor_port(port, cookie),
            util::xor_ipv4(u32::from(ip), cookie),
        );

        Self {
            header: AttrHeader::new(ATTR_XOR_MAPPED_ADDRESS, ADDRESS_BODY_LEN),
            body,
        }
    }

    /// The plain address, undoing the xor with `cookie`.
    pub fn address(&self, cookie: u32) -> SocketAddrV4 {
        let port = util::xor_port(self.body.port, cookie);
        let ip = util::xor_ipv4(self.body.address, cookie);
        SocketAddrV4::new(Ipv4Addr::from(ip), port)
    }

    pub fn put(&self, buf: &mut impl BufMut) {
        self.header.put(buf);
        self.body.put(buf);
    }

    pub fn get(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        get_attr_header(buf, ATTR_XOR_MAPPED_ADDRESS)?;
        let body = AddressBody::get(buf)?;
        Ok(Self {
            header: AttrHeader::new(ATTR_XOR_MAPPED_ADDRESS, ADDRESS_BODY_LEN),
            body,
        })
    }
}
