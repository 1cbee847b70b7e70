use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::tokens::DEFAULT_TOKEN_BYTES;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::{HeaderProfile, SecurityHeadersLayer};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STORAGE_ROOT: &str = "storage/public";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3001";

/// A named bearer token accepted on the admin routes.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredential {
    pub name: String,
    pub token: String,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database URL the server keeps records in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub storage_root: PathBuf,
    /// Origin used to build shareable private-event links.
    pub public_base_url: String,
    pub admin_credentials: Vec<AdminCredential>,
    pub access_token_bytes: usize,
    pub cors_allowed_origins: String,
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            admin_credentials: Vec::new(),
            access_token_bytes: DEFAULT_TOKEN_BYTES,
            cors_allowed_origins: cors::DEFAULT_ALLOWED_ORIGINS.to_string(),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let admin_credentials = env::var("ADMIN_API_TOKENS")
            .map(|raw| parse_admin_credentials(&raw))
            .unwrap_or_default();
        if admin_credentials.is_empty() {
            tracing::warn!("Config: ADMIN_API_TOKENS is empty, admin routes will reject every request");
        }

        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", defaults.database_max_connections),
            host: parse_or("HOST", defaults.host),
            port: parse_or("PORT", defaults.port),
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            admin_credentials,
            access_token_bytes: parse_or("ACCESS_TOKEN_BYTES", defaults.access_token_bytes),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            production: env::var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Shareable link for a private event.
    pub fn private_url(&self, token: &str) -> String {
        format!("{}/private/{}", self.public_base_url, token)
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Config: invalid {} '{}', using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Parses `name:token` pairs separated by commas. A bare token is named `admin`.
pub fn parse_admin_credentials(raw: &str) -> Vec<AdminCredential> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (name, token) = match entry.split_once(':') {
                Some((name, token)) => (name.trim(), token.trim()),
                None => ("admin", entry),
            };
            if name.is_empty() || token.is_empty() {
                tracing::warn!("Config: ignoring malformed admin credential");
                return None;
            }
            Some(AdminCredential {
                name: name.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_bare_credentials() {
        let creds = parse_admin_credentials("alice:tok-a, tok-b ,:missing,bob:");
        assert_eq!(
            creds,
            vec![
                AdminCredential {
                    name: "alice".into(),
                    token: "tok-a".into()
                },
                AdminCredential {
                    name: "admin".into(),
                    token: "tok-b".into()
                },
            ]
        );
    }

    #[test]
    fn credential_debug_hides_token() {
        let cred = AdminCredential {
            name: "alice".into(),
            token: "super-secret".into(),
        };
        let printed = format!("{:?}", cred);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn private_url_uses_base() {
        let config = Config {
            public_base_url: "https://events.example.org".into(),
            ..Config::default()
        };
        assert_eq!(
            config.private_url("abc123"),
            "https://events.example.org/private/abc123"
        );
    }

    #[test]
    fn defaults_bind_on_3001() {
        assert_eq!(Config::default().bind_addr().port(), 3001);
        assert_eq!(Config::default().access_token_bytes, 32);
    }
}
