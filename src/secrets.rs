//! Remote store credentials embedded at build time.
//!
//! The database host and auth token are baked into the image XOR-masked
//! with a one-byte key, hex encoded in three build environment variables:
//!
//! | Variable              | Content                       |
//! |-----------------------|-------------------------------|
//! | `ROOMCTL_XOR_KEY`     | mask byte, e.g. `3F`          |
//! | `ROOMCTL_DB_HOST_OBF` | masked host, hex              |
//! | `ROOMCTL_DB_AUTH_OBF` | masked auth token, hex        |
//!
//! Masking only keeps the strings out of a casual `strings` dump of the
//! flash image.  The `obfuscate-credentials` tool produces the values.

use core::fmt;

use crate::error::{Error, Result};

/// Longest credential accepted, terminator excluded.
pub const MAX_CREDENTIAL_LEN: usize = 99;

/// Minimum plausible length of a database secret.
pub const MIN_AUTH_LEN: usize = 20;

const HOST_SUFFIXES: [&str; 2] = [".firebaseio.com", ".firebasedatabase.app"];

/// Decoded host and auth token for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub host: String,
    pub auth: String,
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("host", &self.host)
            .field("auth", &"<redacted>")
            .finish()
    }
}

impl RemoteCredentials {
    /// Decode the values captured from the build environment.
    pub fn from_build_env() -> Result<Self> {
        let key = option_env!("ROOMCTL_XOR_KEY")
            .ok_or(Error::Config("ROOMCTL_XOR_KEY not set at build time"))?;
        let host = option_env!("ROOMCTL_DB_HOST_OBF")
            .ok_or(Error::Config("ROOMCTL_DB_HOST_OBF not set at build time"))?;
        let auth = option_env!("ROOMCTL_DB_AUTH_OBF")
            .ok_or(Error::Config("ROOMCTL_DB_AUTH_OBF not set at build time"))?;
        Self::decode(key, host, auth)
    }

    /// Unmask hex-encoded credentials and check them with [`validate`].
    pub fn decode(key_hex: &str, host_hex: &str, auth_hex: &str) -> Result<Self> {
        let key = parse_key(key_hex)?;
        let host = deobfuscate(&decode_hex(host_hex)?, key);
        let auth = deobfuscate(&decode_hex(auth_hex)?, key);

        if let Some(issue) = validate(&host, &auth).into_iter().next() {
            return Err(Error::Config(issue.message()));
        }
        Ok(Self { host, auth })
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A problem with a credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
    EmptyHost,
    UnexpectedHost,
    EmptyAuth,
    ShortAuth,
    TooLong,
}

impl CredentialIssue {
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyHost => "database host is empty",
            Self::UnexpectedHost => "database host is not a Firebase RTDB host",
            Self::EmptyAuth => "database auth token is empty",
            Self::ShortAuth => "database auth token is shorter than 20 characters",
            Self::TooLong => "credential longer than 99 characters",
        }
    }
}

impl fmt::Display for CredentialIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every issue found with `host` / `auth`; empty means acceptable.
pub fn validate(host: &str, auth: &str) -> Vec<CredentialIssue> {
    let mut issues = Vec::new();

    if host.is_empty() {
        issues.push(CredentialIssue::EmptyHost);
    } else if !is_rtdb_host(host) {
        issues.push(CredentialIssue::UnexpectedHost);
    }

    if auth.is_empty() {
        issues.push(CredentialIssue::EmptyAuth);
    } else if auth.len() < MIN_AUTH_LEN {
        issues.push(CredentialIssue::ShortAuth);
    }

    if host.len() > MAX_CREDENTIAL_LEN || auth.len() > MAX_CREDENTIAL_LEN {
        issues.push(CredentialIssue::TooLong);
    }
    issues
}

fn is_rtdb_host(host: &str) -> bool {
    let starts_ok = host
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-');
    starts_ok
        && HOST_SUFFIXES
            .iter()
            .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix))
}

// ---------------------------------------------------------------------------
// Masking
// ---------------------------------------------------------------------------

pub fn obfuscate(text: &str, key: u8) -> Vec<u8> {
    text.bytes().map(|b| b ^ key).collect()
}

/// Unmask up to the first NUL byte, at most [`MAX_CREDENTIAL_LEN`] bytes.
pub fn deobfuscate(masked: &[u8], key: u8) -> String {
    masked
        .iter()
        .take_while(|&&b| b != 0)
        .take(MAX_CREDENTIAL_LEN)
        .map(|&b| char::from(b ^ key))
        .collect()
}

pub fn parse_key(hex: &str) -> Result<u8> {
    let hex = hex.trim().trim_start_matches("0x").trim_start_matches("0X");
    match u8::from_str_radix(hex, 16) {
        Ok(0) => Err(Error::Config("XOR key must be non-zero")),
        Ok(key) => Ok(key),
        Err(_) => Err(Error::Config("XOR key is not a hex byte")),
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(|e| match e {
        hex::FromHexError::OddLength => Error::Config("hex string has odd length"),
        _ => Error::Config("hex string contains a non-hex digit"),
    })
}
