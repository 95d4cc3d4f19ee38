// ./server --udp-port 3478 --tcp-port 3478 --config ./config/stun.toml

use log::{debug, error, info};
use std::path::PathBuf;
use std::process;

use clap::{Arg, Command};
use tokio::sync::watch;

use server::config::{
    Configuration, Overrides, ENV_CONFIG, ENV_MONITORING_PATH, ENV_MONITORING_PORT, ENV_TCP_PORT,
    ENV_UDP_PORT,
};
use server::info::BuildInfo;
use server::monitoring::Monitoring;
use server::server::Server;
use server::signal::wait_shutdown;
use server::tracker::TaskTracker;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn log_startup(build_info: &BuildInfo, conf: &Configuration) {
    info!("build info: {}", build_info);
    info!("using configuration: {}", conf);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun binding server over udp and tcp")
        .arg(
            Arg::new("config")
                .long("config")
                .env(ENV_CONFIG)
                .takes_value(true)
                .help("config file, default: first of /etc/stun/stun.toml, ./config/stun.toml")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("udp-port")
                .long("udp-port")
                .env(ENV_UDP_PORT)
                .takes_value(true)
                .help("Stun server udp port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("tcp-port")
                .long("tcp-port")
                .env(ENV_TCP_PORT)
                .takes_value(true)
                .help("Stun server tcp port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("monitoring-port")
                .long("monitoring-port")
                .env(ENV_MONITORING_PORT)
                .takes_value(true)
                .help("metrics http port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("monitoring-path")
                .long("monitoring-path")
                .env(ENV_MONITORING_PATH)
                .takes_value(true)
                .help("metrics http path")
                .value_parser(clap::value_parser!(String)),
        )
        .get_matches();

    let overrides = Overrides {
        config_path: app.get_one::<PathBuf>("config").cloned(),
        udp_port: app.get_one::<u16>("udp-port").copied(),
        tcp_port: app.get_one::<u16>("tcp-port").copied(),
        monitoring_port: app.get_one::<u16>("monitoring-port").copied(),
        monitoring_path: app.get_one::<String>("monitoring-path").cloned(),
    };

    let conf = match Configuration::resolve(&overrides) {
        Ok(v) => v,
        Err(e) => {
            error!("error, {}", e);
            process::exit(1);
        }
    };

    let build_info = BuildInfo::from_env();
    log_startup(&build_info, &conf);

    let (signal_tx, signal_rx) = watch::channel(false);

    let server = match Server::new(&conf).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, {}", e);
            process::exit(1);
        }
    };

    let monitoring = match conf.monitoring.enabled {
        true => match Monitoring::bind(&conf.monitoring, build_info.clone()).await {
            Ok(v) => Some(v),
            Err(e) => {
                error!("error, {}", e);
                process::exit(1);
            }
        },
        false => None,
    };

    let tracker = TaskTracker::new();
    let handle = tracker.handle();
    if let Some(monitoring) = monitoring {
        handle.spawn(monitoring.run(signal_rx.clone()));
    }
    server.start(signal_rx, &handle);
    drop(handle);

    wait_shutdown().await;
    info!("Stopping threads ...");

    if let Err(e) = signal_tx.send(true) {
        debug!("no responder left to stop, {:?}", e);
    }

    tracker.wait().await;
    info!("stopped, uptime: {:?}", build_info.uptime());
}
