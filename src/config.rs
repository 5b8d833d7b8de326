use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Intake Flow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind address (loopback only, single operator).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5100";

/// Environment overrides
pub const ENV_DB_PATH: &str = "INTAKE_DB_PATH";
pub const ENV_BIND_ADDR: &str = "INTAKE_BIND_ADDR";

/// Get the application data directory
/// ~/IntakeFlow/ on all platforms. Falls back to the working directory
/// when no home directory can be resolved (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("IntakeFlow")
}

/// Path of the SQLite database holding patients and intake records.
pub fn database_path() -> PathBuf {
    match std::env::var(ENV_DB_PATH) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("intake.db"),
    }
}

/// Address the API server listens on.
pub fn bind_addr() -> SocketAddr {
    let raw = std::env::var(ENV_BIND_ADDR).ok();
    parse_bind_addr(raw.as_deref())
}

fn parse_bind_addr(raw: Option<&str>) -> SocketAddr {
    let default: SocketAddr = ([127, 0, 0, 1], 5100).into();
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "Invalid {ENV_BIND_ADDR}, using {DEFAULT_BIND_ADDR}");
            default
        }),
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,intake_lib=debug"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_folder() {
        assert!(app_data_dir().ends_with("IntakeFlow"));
    }

    #[test]
    fn default_bind_matches_constant() {
        assert_eq!(parse_bind_addr(None).to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn bind_addr_override_is_parsed() {
        let addr = parse_bind_addr(Some("0.0.0.0:8080"));
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn invalid_bind_addr_falls_back() {
        assert_eq!(parse_bind_addr(Some("not-an-addr")).to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(parse_bind_addr(Some("   ")).to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
