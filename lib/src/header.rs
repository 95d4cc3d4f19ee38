use crate::constants::*;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::error::DecodeError;

pub type TransId = [u8; TRANS_ID_LEN];

// type:u16 length:u16 cookie:u32 trans_id:12B, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub msg_type: u16,

    // 不包括header的20字节
    pub msg_len: u16,

    pub cookie: u32,

    pub trans_id: TransId,
}

impl Header {
    pub fn new(msg_type: u16, msg_len: u16, cookie: u32, trans_id: TransId) -> Self {
        Self {
            msg_type,
            msg_len,
            cookie,
            trans_id,
        }
    }

    /// A binding request with no attributes, as a client sends it.
    pub fn binding_request(trans_id: TransId) -> Self {
        Self::new(MESSAGE_TYPE_BIND_REQ, 0, MAGIC_COOKIE, trans_id)
    }

    pub fn has_magic_cookie(&self) -> bool {
        self.cookie == MAGIC_COOKIE
    }

    pub fn put(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.msg_type);
        buf.put_u16(self.msg_len);
        buf.put_u32(self.cookie);
        buf.put_slice(&self.trans_id);
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        self.put(&mut buf);
        buf.freeze()
    }

    /// Reads the first 20 bytes of `buf`; anything after them is ignored.
    ///
    /// Only the length is checked. `msg_type` and `cookie` are taken verbatim.
    pub fn unpack(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::BufSize {
                len: buf.len(),
                need: HEADER_LEN,
            });
        }

        let mut buf = &buf[..HEADER_LEN];
        let msg_type = buf.get_u16();
        let msg_len = buf.get_u16();
        let cookie = buf.get_u32();

        let mut trans_id = [0_u8; TRANS_ID_LEN];
        buf.copy_to_slice(&mut trans_id);

        Ok(Self {
            msg_type,
            msg_len,
            cookie,
            trans_id,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{type: {:#06x}, length: {}, cookie: {:#010x}, id: ",
            self.msg_type, self.msg_len, self.cookie
        )?;
        for b in self.trans_id.iter() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "}}")
    }
}
