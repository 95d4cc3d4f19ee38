use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::timeout;

use client::client::{probe, probe_udp, ProbeError, Proto};
use server::config::{Configuration, ServerConf};
use server::server::Server;
use server::tracker::TaskTracker;

fn loopback(addr: SocketAddr) -> SocketAddr {
    SocketAddr::new(Ipv4Addr::LOCALHOST.into(), addr.port())
}

#[tokio::test]
async fn test_probe_both_transports() {
    let conf = Configuration {
        udp: ServerConf {
            enabled: true,
            port: 0,
        },
        tcp: ServerConf {
            enabled: true,
            port: 0,
        },
        ..Default::default()
    };
    let server = Server::new(&conf).await.unwrap();
    let udp = loopback(server.udp_addr().unwrap());
    let tcp = loopback(server.tcp_addr().unwrap());

    let (signal_tx, signal_rx) = watch::channel(false);
    let tracker = TaskTracker::new();
    server.start(signal_rx, &tracker.handle());

    for (addr, proto) in [(udp, Proto::Udp), (tcp, Proto::Tcp)] {
        let res = probe(addr, proto).await.unwrap();
        assert_eq!(*res.mapped_address.ip(), Ipv4Addr::LOCALHOST);
        assert_ne!(res.mapped_address.port(), 0);
        assert_eq!(res.mapped_address, res.xor_mapped_address);
    }

    signal_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), tracker.wait())
        .await
        .expect("server did not stop");
}

#[tokio::test]
async fn test_probe_silent_server() {
    // bound but never answers
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();

    assert!(matches!(
        probe_udp(addr).await,
        Err(ProbeError::Timeout(_))
    ));
}
