pub mod config;
pub mod info;
pub mod monitoring;
pub mod server;
pub mod signal;
pub mod stun;
pub mod tcp;
pub mod tracker;
pub mod udp;
