//! Firebase Realtime Database adapter (REST).
//!
//! Implements [`RemoteStorePort`] over the database's REST surface:
//!
//! ```text
//! GET https://<host><path>.json?auth=<token>          → 1 | 0 | -1 | null
//! PUT https://<host><path>.json?auth=<token>   body: 1 | 21.5
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: HTTPS through `EspHttpConnection` wrapped
//!   in an `embedded-svc` client, certificates from the ESP-IDF bundle.
//! - **all other targets**: an in-memory tree holding the same JSON
//!   bodies, for host-side simulation.
//!
//! URL building and body parsing are shared by both backends.

use log::info;

use crate::error::StoreError;
use crate::secrets::RemoteCredentials;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use embedded_svc::{
    http::{Method, Status, client::Client},
    io::{Read, Write},
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

use crate::app::ports::RemoteStorePort;

/// Largest response body accepted; scalar values are a few bytes.
pub const MAX_BODY_LEN: usize = 256;

// ───────────────────────────────────────────────────────────────
// Wire helpers
// ───────────────────────────────────────────────────────────────

/// REST URL for `path` (which must start with `/`).
pub fn build_url(host: &str, path: &str, auth: &str) -> Result<String, StoreError> {
    if !path.starts_with('/') {
        return Err(StoreError::Decode);
    }
    Ok(format!("https://{host}{path}.json?auth={auth}"))
}

/// Parse a scalar integer body; JSON `null` means the key holds nothing.
pub fn parse_int_body(body: &[u8]) -> Result<Option<i32>, StoreError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| StoreError::Decode)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or(StoreError::Decode),
        _ => Err(StoreError::Decode),
    }
}

pub fn int_body(value: i32) -> String {
    value.to_string()
}

/// JSON body for a float; non-finite values have no JSON form.
pub fn float_body(value: f32) -> Result<String, StoreError> {
    if !value.is_finite() {
        return Err(StoreError::Decode);
    }
    serde_json::to_string(&value).map_err(|_| StoreError::Decode)
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct FirebaseStore {
    credentials: RemoteCredentials,
    #[cfg(target_os = "espidf")]
    client: Client<EspHttpConnection>,
    #[cfg(not(target_os = "espidf"))]
    tree: HashMap<String, String>,
}

impl FirebaseStore {
    /// `timeout_ms` bounds every request; see
    /// [`ControllerConfig::store_timeout_ms`](crate::config::ControllerConfig::store_timeout_ms).
    #[cfg(target_os = "espidf")]
    pub fn new(credentials: RemoteCredentials, timeout_ms: u32) -> Result<Self, crate::error::Error> {
        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(timeout_ms))),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| crate::error::Error::Init("HTTP client"))?;
        info!("FirebaseStore: {} (timeout {} ms)", credentials.host, timeout_ms);
        Ok(Self {
            credentials,
            client: Client::wrap(connection),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(credentials: RemoteCredentials, timeout_ms: u32) -> Result<Self, crate::error::Error> {
        info!("FirebaseStore(sim): {} (timeout {} ms)", credentials.host, timeout_ms);
        Ok(Self {
            credentials,
            tree: HashMap::new(),
        })
    }

    fn url(&self, path: &str) -> Result<String, StoreError> {
        build_url(&self.credentials.host, path, &self.credentials.auth)
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn get(&mut self, path: &str) -> Result<heapless::Vec<u8, MAX_BODY_LEN>, StoreError> {
        let url = self.url(path)?;
        let request = self
            .client
            .request(Method::Get, &url, &[("accept", "application/json")])
            .map_err(|_| StoreError::Transport)?;
        let mut response = request.submit().map_err(|_| StoreError::Transport)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(StoreError::Http(status));
        }

        let mut body = heapless::Vec::new();
        let mut chunk = [0u8; 64];
        loop {
            let n = response.read(&mut chunk).map_err(|_| StoreError::Transport)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n])
                .map_err(|()| StoreError::Decode)?;
        }
        Ok(body)
    }

    #[cfg(target_os = "espidf")]
    fn put(&mut self, path: &str, body: &str) -> Result<(), StoreError> {
        let url = self.url(path)?;
        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];
        let mut request = self
            .client
            .request(Method::Put, &url, &headers)
            .map_err(|_| StoreError::Transport)?;
        request
            .write_all(body.as_bytes())
            .map_err(|_| StoreError::Transport)?;
        request.flush().map_err(|_| StoreError::Transport)?;
        let response = request.submit().map_err(|_| StoreError::Transport)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(StoreError::Http(status));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn get(&mut self, path: &str) -> Result<heapless::Vec<u8, MAX_BODY_LEN>, StoreError> {
        let url = self.url(path)?;
        let body = self.tree.get(&url).map_or("null", String::as_str);
        heapless::Vec::from_slice(body.as_bytes()).map_err(|()| StoreError::Decode)
    }

    #[cfg(not(target_os = "espidf"))]
    fn put(&mut self, path: &str, body: &str) -> Result<(), StoreError> {
        let url = self.url(path)?;
        self.tree.insert(url, body.to_string());
        Ok(())
    }
}

impl RemoteStorePort for FirebaseStore {
    fn get_int(&mut self, path: &str) -> Result<Option<i32>, StoreError> {
        let body = self.get(path)?;
        parse_int_body(&body)
    }

    fn set_int(&mut self, path: &str, value: i32) -> Result<(), StoreError> {
        self.put(path, &int_body(value))
    }

    fn set_float(&mut self, path: &str, value: f32) -> Result<(), StoreError> {
        let body = float_body(value)?;
        self.put(path, &body)
    }
}
