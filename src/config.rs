//! Configuration resolution for the Amazon Pay client.

use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use crate::constants::API_VERSION;
use crate::{Error, Result};

/// Prefix on public key ids issued for the live environment.
const LIVE_PREFIX: &str = "LIVE-";
/// Prefix on public key ids issued for the sandbox environment.
const SANDBOX_PREFIX: &str = "SANDBOX-";

/// Regions the Amazon Pay API is served from. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// North America.
    Na,
    /// Europe.
    Eu,
    /// Japan.
    Jp,
}

impl Region {
    /// The regional API host.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Region::Na => "pay-api.amazon.com",
            Region::Eu => "pay-api.amazon.eu",
            Region::Jp => "pay-api.amazon.jp",
        }
    }

    /// The region code sent in the `x-amz-pay-region` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Na => "na",
            Region::Eu => "eu",
            Region::Jp => "jp",
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "na" => Ok(Region::Na),
            "eu" => Ok(Region::Eu),
            "jp" => Ok(Region::Jp),
            _ => Err(Error::config_invalid(format!(
                "Unknown region: '{s}'. Valid regions are: na, eu, jp."
            ))),
        }
    }
}

/// Deployment tier of the remote API. Affects the base URL only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production.
    Live,
    /// Test.
    Sandbox,
}

impl Environment {
    /// The base URL path segment for this environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Sandbox => "sandbox",
        }
    }
}

/// Caller-supplied configuration.
///
/// `region`, `public_key_id` and `private_key` are required. `sandbox` is
/// consulted only when the public key id prefix does not already pin the
/// environment.
#[derive(Clone, Default)]
pub struct Config {
    /// Region code: `na`, `eu` or `jp`.
    pub region: Option<String>,
    /// Public key id. A `LIVE-`/`SANDBOX-` prefix pins the environment.
    pub public_key_id: Option<String>,
    /// PEM-encoded RSA private key (PKCS#8 or PKCS#1).
    pub private_key: Option<String>,
    /// Target the sandbox environment when the key prefix is ambiguous.
    pub sandbox: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("public_key_id", &self.public_key_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

/// Immutable session context resolved from a [`Config`].
///
/// Created once at client construction and shared read-only by every
/// request. The base URL is derived, never independently settable.
#[derive(Clone)]
pub struct Session {
    region: Region,
    environment: Environment,
    public_key_id: String,
    private_key: String,
    base_url: String,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("region", &self.region)
            .field("environment", &self.environment)
            .field("public_key_id", &self.public_key_id)
            .field("private_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Session {
    /// Validate and normalize a [`Config`] into a session context.
    ///
    /// No side effects beyond deriving fields; no network access.
    pub fn resolve(config: &Config) -> Result<Self> {
        // Collect every missing required key, not just the first.
        let required = [
            ("region", config.region.is_none()),
            ("public_key_id", config.public_key_id.is_none()),
            ("private_key", config.private_key.is_none()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::config_invalid(format!(
                "Missing required config keys: {}",
                missing.join(", ")
            )));
        }

        let region: Region = config.region.as_deref().unwrap_or_default().parse()?;
        let public_key_id = config.public_key_id.clone().unwrap_or_default();
        let private_key = config.private_key.clone().unwrap_or_default();

        // Environment precedence: key prefix first, sandbox flag last.
        let environment = if public_key_id.starts_with(LIVE_PREFIX) {
            Environment::Live
        } else if public_key_id.starts_with(SANDBOX_PREFIX) {
            Environment::Sandbox
        } else if config.sandbox {
            Environment::Sandbox
        } else {
            Environment::Live
        };

        let base_url = format!(
            "https://{}/{}/{}/",
            region.endpoint(),
            environment.as_str(),
            API_VERSION
        );

        Ok(Session {
            region,
            environment,
            public_key_id,
            private_key,
            base_url,
        })
    }

    /// The resolved region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The resolved environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// The public key id sent in the authorization header.
    pub fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    /// The PEM private key material.
    pub(crate) fn private_key(&self) -> &str {
        &self.private_key
    }

    /// The derived base URL: `https://{host}/{environment}/v2/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn config(region: &str, public_key_id: &str, sandbox: bool) -> Config {
        Config {
            region: Some(region.to_string()),
            public_key_id: Some(public_key_id.to_string()),
            private_key: Some("dummy_private_key".to_string()),
            sandbox,
        }
    }

    #[test_case("na", "pay-api.amazon.com"; "north america")]
    #[test_case("eu", "pay-api.amazon.eu"; "europe")]
    #[test_case("jp", "pay-api.amazon.jp"; "japan")]
    fn test_region_endpoint(code: &str, endpoint: &str) {
        let region: Region = code.parse().unwrap();
        assert_eq!(region.endpoint(), endpoint);
        assert_eq!(region.as_str(), code);
    }

    #[test]
    fn test_unknown_region() {
        let err = Session::resolve(&config("unknown", "key", false)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
        assert_eq!(
            err.to_string(),
            "Unknown region: 'unknown'. Valid regions are: na, eu, jp."
        );
    }

    #[test]
    fn test_missing_keys_listed_in_declaration_order() {
        let cfg = Config {
            region: None,
            public_key_id: None,
            private_key: Some("dummy_private_key".to_string()),
            sandbox: true,
        };
        let err = Session::resolve(&cfg).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config keys: region, public_key_id"
        );
    }

    #[test]
    fn test_all_keys_missing() {
        let err = Session::resolve(&Config::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config keys: region, public_key_id, private_key"
        );
    }

    #[test_case("LIVE-1234", true, Environment::Live; "live prefix wins over sandbox flag")]
    #[test_case("SANDBOX-1234", false, Environment::Sandbox; "sandbox prefix wins over live flag")]
    #[test_case("OTHER-KEY", true, Environment::Sandbox; "flag true yields sandbox")]
    #[test_case("OTHER-KEY", false, Environment::Live; "flag false yields live")]
    fn test_environment_precedence(public_key_id: &str, sandbox: bool, expected: Environment) {
        let session = Session::resolve(&config("jp", public_key_id, sandbox)).unwrap();
        assert_eq!(session.environment(), expected);
    }

    #[test]
    fn test_base_url_derivation() {
        let session = Session::resolve(&config("jp", "SANDBOX-1234", false)).unwrap();
        assert_eq!(session.base_url(), "https://pay-api.amazon.jp/sandbox/v2/");

        let session = Session::resolve(&config("na", "LIVE-1234", true)).unwrap();
        assert_eq!(session.base_url(), "https://pay-api.amazon.com/live/v2/");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let cfg = config("eu", "LIVE-1234", false);
        let a = Session::resolve(&cfg).unwrap();
        let b = Session::resolve(&cfg).unwrap();
        assert_eq!(a.base_url(), b.base_url());
        assert_eq!(a.region(), b.region());
        assert_eq!(a.environment(), b.environment());
        assert_eq!(a.public_key_id(), b.public_key_id());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let session = Session::resolve(&config("jp", "SANDBOX-1234", false)).unwrap();
        let out = format!("{session:?}");
        assert!(!out.contains("dummy_private_key"));
    }
}
