use bytes::{Buf, BufMut};

use crate::constants::ATTR_HEADER_LEN;
use crate::error::DecodeError;

pub mod address_attr;
pub mod xor_address;

// generic TLV header, only two fixed bodies ever follow it here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrHeader {
    pub attr_type: u16,
    pub attr_len: u16,
}

impl AttrHeader {
    pub fn new(attr_type: u16, attr_len: u16) -> Self {
        Self {
            attr_type,
            attr_len,
        }
    }

    pub fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
    }

    pub fn get(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        if buf.remaining() < ATTR_HEADER_LEN {
            return Err(DecodeError::BufSize {
                len: buf.remaining(),
                need: ATTR_HEADER_LEN,
            });
        }

        let attr_type = buf.get_u16();
        let attr_len = buf.get_u16();
        Ok(Self {
            attr_type,
            attr_len,
        })
    }
}
