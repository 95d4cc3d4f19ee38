// 0x2112A442
pub const MAGIC_COOKIE: u32 = 0x2112_A442;

pub const TRANS_ID_LEN: usize = 12;
pub const HEADER_LEN: usize = 20;

// attribute header: type + length
pub const ATTR_HEADER_LEN: usize = 4;
// family(2) + port(2) + ipv4(4)
pub const ADDRESS_BODY_LEN: u16 = 8;
// mapped-address + xor-mapped-address, no padding
pub const RESPONSE_ATTRS_LEN: u16 = 2 * (ATTR_HEADER_LEN as u16 + ADDRESS_BODY_LEN);
pub const RESPONSE_LEN: usize = HEADER_LEN + RESPONSE_ATTRS_LEN as usize;

pub const MESSAGE_TYPE_BIND_REQ: u16 = 0x0001;
pub const MESSAGE_TYPE_BIND_RES: u16 = 0x0101;

pub const ATTR_FAMILY_IPV4: u16 = 0x0001;

pub const ATTR_MAPPED_ADDRESS: u16 = 0x0001;
pub const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;

pub const DEFAULT_PORT: u16 = 3478;
