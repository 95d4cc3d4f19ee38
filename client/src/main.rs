use std::net::SocketAddr;
use std::process;

use clap::builder::ValueParser;
use clap::{Arg, Command};
use client::client::{probe, Proto};
use log::{error, info};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_addr(s: &str) -> Result<SocketAddr, String> {
    let addr = match s.parse::<SocketAddr>() {
        Ok(v) => v,
        Err(e) => {
            return Err(format!("{}", e));
        }
    };
    // 不能是 0.0.0.0
    match addr {
        SocketAddr::V4(addr_v4) => {
            if addr_v4.ip().is_unspecified() {
                return Err("0.0.0.0 not allow".to_string());
            }
        }
        SocketAddr::V6(_) => {
            return Err("ipv6 not support".to_string());
        }
    }

    Ok(addr)
}

fn parse_proto(s: &str) -> Result<Proto, String> {
    match s {
        "udp" => Ok(Proto::Udp),
        "tcp" => Ok(Proto::Tcp),
        v => Err(format!("unknown proto: {}", v)),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client, asks the server which address it sees")
        .arg(
            Arg::new("server")
                .long("server")
                .takes_value(true)
                .required(true)
                .help("server address")
                .value_parser(ValueParser::new(parse_addr)),
        )
        .arg(
            Arg::new("proto")
                .long("proto")
                .takes_value(true)
                .default_value("udp")
                .help("udp or tcp")
                .value_parser(ValueParser::new(parse_proto)),
        )
        .get_matches();

    let server: SocketAddr = *app.get_one("server").expect("wrong server address");
    let proto: Proto = *app.get_one("proto").expect("wrong proto");

    match probe(server, proto).await {
        Ok(v) => {
            info!("mapped_address: {}", v.mapped_address);
            info!("xor_mapped_address: {}", v.xor_mapped_address);
            println!("{}", v.mapped_address);
        }
        Err(e) => {
            error!("error, probe {:?} {}, {}", proto, server, e);
            process::exit(1);
        }
    }
}
