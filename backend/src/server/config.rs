//! Application settings loaded via OrthoConfig, plus the server
//! configuration object derived from them.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ATLAS_BASE_URL: &str = "https://api.boardgameatlas.com/api/";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Which persistence adapter backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Elastic,
}

/// Which catalog adapter backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Atlas,
    Fixture,
}

/// Settings read from `BORGA_*` environment variables, CLI flags, and an
/// optional configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BORGA")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `memory` or `elastic`.
    pub store: Option<String>,
    /// Root URL of the document store.
    pub elasticsearch_url: Option<String>,
    /// `atlas` or `fixture`.
    pub catalog: Option<String>,
    /// Board Game Atlas client id.
    pub atlas_client_id: Option<String>,
    /// Board Game Atlas API root.
    pub atlas_base_url: Option<String>,
    /// Timeout applied to every outbound request.
    pub http_timeout_secs: Option<u64>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark cookies `Secure`.
    pub cookie_secure: Option<bool>,
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn parse_url(name: &str, raw: &str) -> io::Result<Url> {
    let url = Url::parse(raw).map_err(|error| invalid(format!("{name} {raw:?}: {error}")))?;
    // Relative joins drop the last segment unless the path ends in '/'.
    if url.path().ends_with('/') {
        Ok(url)
    } else {
        let mut url = url;
        let path = format!("{}/", url.path());
        url.set_path(&path);
        Ok(url)
    }
}

/// Use 64+ bytes directly; derive from 32+ bytes; reject anything shorter.
fn key_from_bytes(bytes: &[u8], path: &std::path::Path) -> io::Result<Key> {
    if let Ok(key) = Key::try_from(bytes) {
        return Ok(key);
    }
    if bytes.len() >= 32 {
        return Ok(Key::derive_from(bytes));
    }
    Err(invalid(format!(
        "session key at {} must hold at least 32 bytes",
        path.display()
    )))
}

impl AppSettings {
    /// Listening address.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|error| invalid(format!("bind address {raw:?}: {error}")))
    }

    /// Selected persistence adapter.
    pub fn store(&self) -> io::Result<StoreKind> {
        match self.store.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => Ok(StoreKind::Memory),
            Some("elastic" | "elasticsearch") => Ok(StoreKind::Elastic),
            Some(other) => Err(invalid(format!(
                "unknown store {other:?}; expected memory or elastic"
            ))),
        }
    }

    /// Document store root, with a trailing slash. Required when the
    /// elastic store is selected.
    pub fn elasticsearch_url(&self) -> io::Result<Url> {
        let raw = self
            .elasticsearch_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| invalid("BORGA_ELASTICSEARCH_URL is required".to_owned()))?;
        parse_url("elasticsearch url", raw)
    }

    /// Selected catalog adapter.
    pub fn catalog(&self) -> io::Result<CatalogKind> {
        match self.catalog.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("atlas") => Ok(CatalogKind::Atlas),
            Some("fixture") => Ok(CatalogKind::Fixture),
            Some(other) => Err(invalid(format!(
                "unknown catalog {other:?}; expected atlas or fixture"
            ))),
        }
    }

    /// The Atlas client id. Required when the Atlas catalog is selected.
    pub fn atlas_client_id(&self) -> io::Result<&str> {
        self.atlas_client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("BORGA_ATLAS_CLIENT_ID is required".to_owned()))
    }

    /// Atlas API root, with a trailing slash.
    pub fn atlas_base_url(&self) -> io::Result<Url> {
        parse_url(
            "atlas base url",
            self.atlas_base_url
                .as_deref()
                .unwrap_or(DEFAULT_ATLAS_BASE_URL),
        )
    }

    /// Outbound request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Whether cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Session signing and encryption key.
    ///
    /// Reads the key file; falls back to a random key only in debug builds or
    /// when `session_allow_ephemeral` is set.
    pub fn session_key(&self) -> io::Result<Key> {
        let path = self
            .session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE));
        match std::fs::read(&path) {
            Ok(bytes) => key_from_bytes(&bytes, &path),
            Err(error) if cfg!(debug_assertions) || self.session_allow_ephemeral => {
                warn!(path = %path.display(), %error, "using temporary session key (dev only)");
                Ok(Key::generate())
            }
            Err(error) => Err(io::Error::other(format!(
                "failed to read session key at {}: {error}",
                path.display()
            ))),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Derive the server configuration from loaded settings.
    pub fn from_settings(settings: &AppSettings) -> io::Result<Self> {
        Ok(Self {
            key: settings.session_key()?,
            cookie_secure: settings.cookie_secure(),
            same_site: SameSite::Lax,
            bind_addr: settings.bind_addr()?,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "BORGA_BIND_ADDR",
        "BORGA_STORE",
        "BORGA_ELASTICSEARCH_URL",
        "BORGA_CATALOG",
        "BORGA_ATLAS_CLIENT_ID",
        "BORGA_ATLAS_BASE_URL",
        "BORGA_HTTP_TIMEOUT_SECS",
        "BORGA_SESSION_KEY_FILE",
        "BORGA_SESSION_ALLOW_EPHEMERAL",
        "BORGA_COOKIE_SECURE",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("borga")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:3000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.store().expect("store"), StoreKind::Memory);
        assert_eq!(settings.catalog().expect("catalog"), CatalogKind::Atlas);
        assert_eq!(settings.http_timeout(), Duration::from_secs(10));
        assert!(settings.cookie_secure());
        assert!(!settings.session_allow_ephemeral);
        assert_eq!(
            settings.atlas_base_url().expect("url").as_str(),
            DEFAULT_ATLAS_BASE_URL
        );
        assert!(settings.atlas_client_id().is_err());
    }

    #[rstest]
    #[case(&[("BORGA_STORE", "elastic")])]
    #[case(&[("BORGA_STORE", "elastic"), ("BORGA_ELASTICSEARCH_URL", "  ")])]
    fn elastic_store_requires_a_url(#[case] overrides: &[(&str, &str)]) {
        let settings = load_with(overrides);
        assert_eq!(settings.store().expect("store"), StoreKind::Elastic);
        let error = settings.elasticsearch_url().expect_err("url required");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert!(error.to_string().contains("BORGA_ELASTICSEARCH_URL"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("BORGA_BIND_ADDR", "127.0.0.1:8088"),
            ("BORGA_STORE", "elastic"),
            ("BORGA_ELASTICSEARCH_URL", "http://es:9200/borga"),
            ("BORGA_CATALOG", "fixture"),
            ("BORGA_ATLAS_CLIENT_ID", "abc123"),
            ("BORGA_HTTP_TIMEOUT_SECS", "3"),
            ("BORGA_COOKIE_SECURE", "false"),
        ]);
        assert_eq!(settings.bind_addr().expect("addr").port(), 8088);
        assert_eq!(settings.store().expect("store"), StoreKind::Elastic);
        assert_eq!(
            settings.elasticsearch_url().expect("url").as_str(),
            "http://es:9200/borga/"
        );
        assert_eq!(settings.catalog().expect("catalog"), CatalogKind::Fixture);
        assert_eq!(settings.atlas_client_id().expect("client id"), "abc123");
        assert_eq!(settings.http_timeout(), Duration::from_secs(3));
        assert!(!settings.cookie_secure());
    }

    #[rstest]
    #[case(16, false)]
    #[case(32, true)]
    #[case(64, true)]
    fn session_keys_need_enough_material(#[case] len: usize, #[case] ok: bool) {
        let bytes = vec![7_u8; len];
        assert_eq!(
            key_from_bytes(&bytes, std::path::Path::new("key")).is_ok(),
            ok
        );
    }

    #[rstest]
    #[case("BORGA_STORE", "postgres")]
    #[case("BORGA_CATALOG", "bgg")]
    #[case("BORGA_BIND_ADDR", "not-an-address")]
    fn invalid_values_fail_with_input_errors(#[case] var: &str, #[case] value: &str) {
        let settings = load_with(&[(var, value)]);
        let failures = [
            settings.store().err(),
            settings.catalog().err(),
            settings.bind_addr().err(),
        ];
        let error = failures.into_iter().flatten().next().expect("one failure");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
