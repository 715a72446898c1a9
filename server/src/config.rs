//! Server configuration from flags, environment and `.env`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "pdfyard_server=info,pdfyard=info,tower_http=debug";

const BYTES_PER_MB: usize = 1024 * 1024;

/// Command-line arguments for the pdfyard server
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfyard-server")]
#[command(about = "HTTP service that extracts images from uploaded PDFs")]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "PDFYARD_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PDFYARD_PORT", default_value = "8000")]
    pub port: u16,

    /// Directory for uploaded PDFs and extracted images
    #[arg(long, env = "PDFYARD_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// URL path under which the upload directory is served
    #[arg(
        long,
        env = "PDFYARD_URL_PREFIX",
        default_value = "/uploads",
        value_parser = parse_url_prefix
    )]
    pub url_prefix: String,

    /// Largest accepted request body, in megabytes
    #[arg(long, env = "PDFYARD_MAX_UPLOAD_MB", default_value = "50")]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// URL prefix with a leading slash and no trailing one.
    pub fn normalized_prefix(&self) -> String {
        format!("/{}", self.url_prefix.trim_matches('/'))
    }
}

/// The upload directory cannot be mounted at the site root.
fn parse_url_prefix(value: &str) -> Result<String, String> {
    if value.trim_matches('/').is_empty() {
        return Err("URL prefix must name a path below /, e.g. /uploads".to_string());
    }
    Ok(value.to_string())
}
