// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub use state::AppState;
pub use types::Config;

/// Config file looked up when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config";
/// Picture directory name used when `pictures.dir` is unset
const DEFAULT_PICTURES_DIR: &str = "pictures";

impl Config {
    /// Load configuration from the path given as first CLI argument, or `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest precedence first: built-in defaults, the file (optional),
    /// `PICTURES__SECTION__KEY` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "picture-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.cache_max_age", 3600)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PICTURES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Absolute picture directory derived from the executable's location
    pub fn picture_dir(&self) -> io::Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "executable path has no parent directory",
            )
        })?;
        Ok(resolve_picture_dir(base, self.pictures.dir.as_deref()))
    }
}

fn resolve_picture_dir(base: &Path, configured: Option<&str>) -> PathBuf {
    // Joining an absolute path replaces the base
    base.join(configured.unwrap_or(DEFAULT_PICTURES_DIR))
}
