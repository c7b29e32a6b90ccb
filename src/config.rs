use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Telequeue";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4785";

/// Get the application data directory
/// ~/Telequeue/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Telequeue")
}

/// Database path: `TELEQUEUE_DB_PATH` override, else the data dir default.
pub fn default_db_path() -> PathBuf {
    match std::env::var("TELEQUEUE_DB_PATH") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("queue.db"),
    }
}

/// Listen address: `TELEQUEUE_ADDR` override, else loopback on 4785.
pub fn bind_addr() -> SocketAddr {
    if let Ok(raw) = std::env::var("TELEQUEUE_ADDR") {
        match raw.parse() {
            Ok(addr) => return addr,
            Err(_) => tracing::warn!(%raw, "Invalid TELEQUEUE_ADDR, using default"),
        }
    }
    DEFAULT_BIND_ADDR
        .parse()
        .expect("default bind address is valid")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "telequeue=info,tower_http=info"
}
