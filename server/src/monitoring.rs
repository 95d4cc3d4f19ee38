//! Prometheus endpoint exporting build info and uptime.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use lstun::TransportError;

use crate::config::MonitoringConf;
use crate::info::BuildInfo;
use crate::server::{shutdown_requested, ShutdownRx};

pub const NAMESPACE: &str = "lstun";

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("metrics, {0}")]
    Metrics(#[from] prometheus::Error),
}

pub struct Metrics {
    registry: Registry,
    uptime: Gauge,
    build_info: BuildInfo,
}

impl Metrics {
    pub fn new(build_info: BuildInfo) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let info_gauge = Gauge::with_opts(
            Opts::new("build_info", "Information about lstun binary")
                .namespace(NAMESPACE)
                .const_label("version", build_info.version)
                .const_label("build_date", build_info.build_date)
                .const_label("env", build_info.env.as_str()),
        )?;
        info_gauge.set(1.0);
        registry.register(Box::new(info_gauge))?;

        let uptime = Gauge::with_opts(
            Opts::new("uptime_sec", "Information about binary uptime").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(uptime.clone()))?;

        Ok(Self {
            registry,
            uptime,
            build_info,
        })
    }

    /// Text exposition format, uptime sampled now.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        self.uptime.set(self.build_info.uptime().as_secs() as f64);

        let mut buf = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

pub struct Monitoring {
    listener: TcpListener,
    local_addr: SocketAddr,
    path: String,
    metrics: Metrics,
}

impl Monitoring {
    pub async fn bind(
        conf: &MonitoringConf,
        build_info: BuildInfo,
    ) -> Result<Self, MonitoringError> {
        let metrics = Metrics::new(build_info)?;

        let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), conf.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::Bind { addr, source: e })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        Ok(Self {
            listener,
            local_addr,
            path: conf.path.clone(),
            metrics,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until `shutdown` turns true, then finishes open requests.
    pub async fn run(self, mut shutdown: ShutdownRx) {
        let port = self.local_addr.port();
        info!(
            "Starting Monitoring server, listening port at {}{}",
            port, self.path
        );

        let app = Router::new()
            .route(&self.path, get(metrics_handler))
            .with_state(Arc::new(self.metrics));

        let res = axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { shutdown_requested(&mut shutdown).await })
            .await;
        if let Err(e) = res {
            error!("Monitoring server error, {}", e);
        }

        info!("Stopped Monitoring server, {}", port);
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> Response {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("error, render metrics, {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let metrics = Metrics::new(BuildInfo::new("test".to_string())).unwrap();
        let text = metrics.render().unwrap();

        assert!(text.contains("lstun_build_info{"));
        assert!(text.contains("env=\"test\""));
        assert!(text.contains(&format!("version=\"{}\"", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains("lstun_uptime_sec 0"));
    }
}
