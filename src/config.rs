use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::naming::Variant;
use crate::transport::{ClientConfig, DEFAULT_BASE_URL};
use crate::types::PageQuery;

/// Demo front end for the vehicle trading ledger.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Base URL of the ledger REST API.
    #[arg(long, env = "CARTRADE_BACKEND_URL", default_value = DEFAULT_BASE_URL)]
    pub backend_url: Url,

    /// Address the web front end listens on.
    #[arg(long, env = "CARTRADE_LISTEN", default_value = "0.0.0.0:42069")]
    pub listen: SocketAddr,

    /// Entity naming of the backend deployment.
    #[arg(long, env = "CARTRADE_VARIANT", value_enum, default_value_t = Variant::CarDealer)]
    pub variant: Variant,

    /// Records per list page.
    #[arg(long, env = "CARTRADE_PAGE_SIZE", default_value_t = PageQuery::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Per-request timeout towards the backend, in seconds.
    #[arg(long, env = "CARTRADE_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Largest certificate upload accepted by the front end, in MiB.
    #[arg(long, env = "CARTRADE_UPLOAD_LIMIT_MIB", default_value_t = 64)]
    pub upload_limit_mib: usize,

    /// Directory served under /assets/.
    #[arg(long, env = "CARTRADE_ASSETS", default_value = "./assets")]
    pub assets: PathBuf,
}

impl Config {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Body limit of the certificate upload routes, in bytes.
    pub fn upload_limit(&self) -> usize {
        self.upload_limit_mib.saturating_mul(1024 * 1024)
    }
}
