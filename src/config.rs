use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub debug: bool,
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_header: String,
    pub mrt_data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);
        let debug = env::var("DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let sqlite_path =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "data/mrtblog.sqlite".to_string());
        let database_url = env::var("DATABASE_URL").ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-mrtblog".to_string());
        let token_header = env::var("TOKEN_HEADER").unwrap_or_else(|_| "token".to_string());

        let mrt_data_dir = env::var("MRT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("crawler"));

        Self {
            server_host,
            server_port,
            debug,
            sqlite_path,
            database_url,
            jwt_secret,
            token_header,
            mrt_data_dir,
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let path = self.sqlite_path.trim();
        if path.starts_with("sqlite:") || path.starts_with("file:") {
            return path.to_string();
        }
        format!("sqlite://{}", path)
    }

    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(sqlite_path: &str, database_url: Option<&str>) -> AppConfig {
        AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            debug: false,
            sqlite_path: sqlite_path.to_string(),
            database_url: database_url.map(str::to_string),
            jwt_secret: "secret".to_string(),
            token_header: "token".to_string(),
            mrt_data_dir: PathBuf::from("crawler"),
        }
    }

    #[test]
    fn plain_path_gets_sqlite_scheme() {
        let cfg = config_with("data/app.sqlite", None);
        assert_eq!(cfg.database_url(), "sqlite://data/app.sqlite");
    }

    #[test]
    fn explicit_url_wins() {
        let cfg = config_with("data/app.sqlite", Some("sqlite::memory:"));
        assert_eq!(cfg.database_url(), "sqlite::memory:");
    }

    #[test]
    fn prefixed_path_is_kept() {
        let cfg = config_with("sqlite:/tmp/x.db", None);
        assert_eq!(cfg.database_url(), "sqlite:/tmp/x.db");
    }
}
