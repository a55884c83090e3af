use serde::{Deserialize, Serialize};
use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

const DATABASE_FILE_NAME: &str = "dmr-builder.db";

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `127.0.0.1`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `3000`. `PORT` overrides.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: next to the executable when
    /// `PORTABLE_EXECUTABLE_DIR` is set, otherwise `db/dmr-builder.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Directory holding the web UI; `index.html` is served at `/`.
    /// TOML: `basic.public_dir`. Default: `public`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            public_dir: default_public_dir(),
        }
    }
}

impl BasicConfig {
    /// Filesystem path of the database when `database_url` is a file-backed `sqlite:` URL.
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

fn default_database_url() -> String {
    let path = match env::var_os("PORTABLE_EXECUTABLE_DIR") {
        Some(dir) => Path::new(&dir).join(DATABASE_FILE_NAME),
        None => Path::new("db").join(DATABASE_FILE_NAME),
    };
    format!("sqlite://{}", path.display())
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::LOCALHOST.into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    3000
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}
