use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4};

use lstun::attrs::address_attr::MappedAddress;
use lstun::attrs::xor_address::XorMappedAddress;
use lstun::constants::*;
use lstun::header::Header;
use lstun::packet::{build_success_response, SuccessResponse};
use lstun::util;
use lstun::{AddressFamilyError, DecodeError};

const TRANS_ID: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

fn request_bytes(msg_type: u16, cookie: u32) -> Vec<u8> {
    let mut buf = vec![];
    buf.extend_from_slice(&msg_type.to_be_bytes());
    buf.extend_from_slice(&0_u16.to_be_bytes());
    buf.extend_from_slice(&cookie.to_be_bytes());
    buf.extend_from_slice(&TRANS_ID);
    buf
}

#[test]
pub fn test_mapped_address_vectors() {
    let cases = [
        (47746_u16, Ipv4Addr::new(172, 17, 0, 1), 2886795265_u32),
        (32657, Ipv4Addr::new(10, 0, 4, 128), 167773312),
    ];

    for (port, ip, address) in cases {
        let mapped = MappedAddress::new(port, ip);
        assert_eq!(mapped.header.attr_type, ATTR_MAPPED_ADDRESS);
        assert_eq!(mapped.header.attr_len, 8);
        assert_eq!(mapped.body.family, ATTR_FAMILY_IPV4);
        assert_eq!(mapped.body.port, port);
        assert_eq!(mapped.body.address, address);
    }
}

#[test]
pub fn test_xor_mapped_address_vectors() {
    let cookie = 0x2112a442;
    let cases = [
        (47746_u16, Ipv4Addr::new(172, 17, 0, 1), 39824_u16, 2365826115_u32),
        (32657, Ipv4Addr::new(10, 0, 4, 128), 24195, 722641090),
    ];

    for (port, ip, xor_port, xor_address) in cases {
        let xor = XorMappedAddress::new(port, ip, cookie);
        assert_eq!(xor.header.attr_type, ATTR_XOR_MAPPED_ADDRESS);
        assert_eq!(xor.header.attr_len, 8);
        assert_eq!(xor.body.family, ATTR_FAMILY_IPV4);
        assert_eq!(xor.body.port, xor_port);
        assert_eq!(xor.body.address, xor_address);

        assert_eq!(xor.address(cookie), SocketAddrV4::new(ip, port));
    }
}

#[test]
pub fn test_xor_uses_given_cookie() {
    let ip = Ipv4Addr::new(192, 168, 1, 20);
    let cookie = 0xdead_beef;
    let xor = XorMappedAddress::new(5000, ip, cookie);

    assert_eq!(xor.body.port, 5000 ^ 0xdead);
    assert_eq!(xor.body.address, u32::from(ip) ^ cookie);

    let zero = XorMappedAddress::new(5000, ip, 0);
    assert_eq!(zero.body.port, 5000);
    assert_eq!(zero.body.address, u32::from(ip));
}

#[test]
pub fn test_unpack_header() {
    let mut buf = request_bytes(MESSAGE_TYPE_BIND_REQ, MAGIC_COOKIE);
    // trailing bytes are ignored
    buf.extend_from_slice(&[0xff; 8]);

    let header = Header::unpack(&buf).unwrap();
    assert_eq!(header.msg_type, MESSAGE_TYPE_BIND_REQ);
    assert_eq!(header.msg_len, 0);
    assert_eq!(header.cookie, MAGIC_COOKIE);
    assert_eq!(header.trans_id, TRANS_ID);
    assert!(header.has_magic_cookie());
}

#[test]
pub fn test_unpack_header_too_short() {
    for len in 0..HEADER_LEN {
        let buf = vec![0_u8; len];
        assert_eq!(
            Header::unpack(&buf),
            Err(DecodeError::BufSize {
                len,
                need: HEADER_LEN
            })
        );
    }
}

#[test]
pub fn test_unpack_header_takes_any_type_and_cookie() {
    let buf = request_bytes(0x0115, 0x0102_0304);
    let header = Header::unpack(&buf).unwrap();
    assert_eq!(header.msg_type, 0x0115);
    assert_eq!(header.cookie, 0x0102_0304);
    assert!(!header.has_magic_cookie());
}

#[test]
pub fn test_response_layout() {
    let buf = request_bytes(MESSAGE_TYPE_BIND_REQ, MAGIC_COOKIE);
    let header = Header::unpack(&buf).unwrap();

    let res = build_success_response(&header, 47746, IpAddr::V4(Ipv4Addr::new(172, 17, 0, 1)))
        .unwrap();
    let data = res.pack();
    println!("{}", util::print_bytes(&data, " ", 8));

    // length 24 = two 12 byte attributes
    let mut expected = vec![0x01, 0x01, 0x00, 0x18, 0x21, 0x12, 0xa4, 0x42];
    expected.extend_from_slice(&TRANS_ID);
    // mapped-address
    expected.extend_from_slice(&[0x00, 0x01, 0x00, 0x08]);
    expected.extend_from_slice(&[0x00, 0x01]);
    expected.extend_from_slice(&47746_u16.to_be_bytes());
    expected.extend_from_slice(&[172, 17, 0, 1]);
    // xor-mapped-address
    expected.extend_from_slice(&[0x00, 0x20, 0x00, 0x08]);
    expected.extend_from_slice(&[0x00, 0x01]);
    expected.extend_from_slice(&39824_u16.to_be_bytes());
    expected.extend_from_slice(&2365826115_u32.to_be_bytes());

    assert_eq!(data.len(), 44);
    assert_eq!(data.len(), RESPONSE_LEN);
    assert_eq!(&data[..], &expected[..]);
}

#[test]
pub fn test_response_always_success_type() {
    for msg_type in [MESSAGE_TYPE_BIND_REQ, MESSAGE_TYPE_BIND_RES, 0x0111, 0xffff] {
        let buf = request_bytes(msg_type, 0x1234_5678);
        let header = Header::unpack(&buf).unwrap();
        let addr: SocketAddr = "10.0.4.128:32657".parse().unwrap();

        let res = SuccessResponse::for_peer(&header, addr).unwrap();
        assert_eq!(res.header.msg_type, MESSAGE_TYPE_BIND_RES);
        assert_eq!(res.header.msg_len, RESPONSE_ATTRS_LEN);
        assert_eq!(res.header.cookie, 0x1234_5678);
        assert_eq!(res.header.trans_id, TRANS_ID);
    }
}

#[test]
pub fn test_response_rejects_ipv6() {
    let header = Header::binding_request(util::new_trans_id());
    let ip = IpAddr::V6(Ipv6Addr::new(1, 2, 3, 4, 5, 6, 7, 8));

    assert_eq!(
        build_success_response(&header, 8080, ip),
        Err(AddressFamilyError(ip))
    );
}

#[test]
pub fn test_response_accepts_ipv4_mapped_ipv6() {
    let header = Header::binding_request(util::new_trans_id());
    let ip = IpAddr::V6(Ipv4Addr::new(10, 20, 30, 40).to_ipv6_mapped());

    let res = build_success_response(&header, 1234, ip).unwrap();
    assert_eq!(
        res.mapped.address(),
        SocketAddrV4::new(Ipv4Addr::new(10, 20, 30, 40), 1234)
    );
}

#[test]
pub fn test_unpack_response() {
    let trans_id = util::new_trans_id();
    let header = Header::binding_request(trans_id);
    let addr: SocketAddr = "172.17.0.1:47746".parse().unwrap();

    let res = SuccessResponse::for_peer(&header, addr).unwrap();
    let buf = res.pack();

    let decoded = SuccessResponse::unpack(&buf).unwrap();
    assert_eq!(decoded, res);
    assert_eq!(decoded.header.trans_id, trans_id);
    assert_eq!(
        decoded.xor_mapped.address(decoded.header.cookie),
        decoded.mapped.address()
    );
}

#[test]
pub fn test_unpack_response_bad_input() {
    let header = Header::binding_request(TRANS_ID);
    let addr: SocketAddr = "10.0.4.128:32657".parse().unwrap();
    let buf = SuccessResponse::for_peer(&header, addr).unwrap().pack();

    assert!(matches!(
        SuccessResponse::unpack(&buf[..RESPONSE_LEN - 1]),
        Err(DecodeError::BufSize { .. })
    ));

    // request type instead of success
    let mut wrong_type = buf.to_vec();
    wrong_type[1] = 0x01;
    wrong_type[0] = 0x00;
    assert!(matches!(
        SuccessResponse::unpack(&wrong_type),
        Err(DecodeError::BadValue(_))
    ));

    // swapped attribute order
    let mut swapped = buf.to_vec();
    swapped[HEADER_LEN + 1] = 0x20;
    assert!(matches!(
        SuccessResponse::unpack(&swapped),
        Err(DecodeError::BadValue(_))
    ));

    // ipv6 family
    let mut family = buf.to_vec();
    family[HEADER_LEN + 5] = 0x02;
    assert!(matches!(
        SuccessResponse::unpack(&family),
        Err(DecodeError::BadValue(_))
    ));
}

#[test]
pub fn test_binding_request_pack() {
    let header = Header::binding_request(TRANS_ID);
    let buf = header.pack();

    assert_eq!(&buf[..], &request_bytes(MESSAGE_TYPE_BIND_REQ, MAGIC_COOKIE)[..]);
    assert_eq!(Header::unpack(&buf).unwrap(), header);
}

#[test]
pub fn test_header_display() {
    let header = Header::binding_request(TRANS_ID);
    assert_eq!(
        header.to_string(),
        "{type: 0x0001, length: 0, cookie: 0x2112a442, id: 0102030405060708090a0b0c}"
    );
}

#[test]
pub fn test_response_length_matches_attrs() {
    assert_eq!(RESPONSE_ATTRS_LEN, 24);
    assert_eq!(RESPONSE_LEN, 44);

    let header = Header::binding_request(TRANS_ID);
    let addr: SocketAddr = "172.17.0.1:47746".parse().unwrap();
    let buf = SuccessResponse::for_peer(&header, addr).unwrap().pack();

    let msg_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    assert_eq!(msg_len, buf.len() - HEADER_LEN);
}

#[test]
pub fn test_print_bytes_rows() {
    assert_eq!(util::print_bytes(&[1, 2, 3, 4], " ", 2), "01 02\n03 04\n");
    // zero width, no row breaks
    assert_eq!(util::print_bytes(&[1, 2, 0xab], " ", 0), "01 02 AB ");
    assert_eq!(util::print_bytes(&[], " ", 0), "");
}
