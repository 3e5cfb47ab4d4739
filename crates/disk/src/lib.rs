//! ydg-disk: Yandex Disk REST adapter for ydg
//!
//! This crate provides the implementations of the DiskApi and ByteTransport
//! traits using reqwest. It is the only crate that speaks HTTP.

pub mod client;
pub mod transport;
mod wire;

pub use client::{DiskClient, http_client};
pub use transport::HttpTransport;

use ydg_core::{Config, Result};

/// Build the metadata client and byte transport on one connection pool
pub fn connect(config: &Config) -> Result<(DiskClient, HttpTransport)> {
    let http = http_client(&config.transport)?;
    let client = DiskClient::with_http(http.clone(), &config.api.base_url)?;
    Ok((client, HttpTransport::with_http(http)))
}
