//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary between the control loop
//! and the network link.  The first connection is made at boot and is
//! required; afterwards [`ConnectivityPort::poll`] watches the link and
//! reconnects in the background of the loop.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` wrapped in `BlockingWifi`.
//! - **all other targets**: a simulated link for host-side tests.
//!
//! ## Reconnection policy
//!
//! After a drop the adapter retries on an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s).  A successful connect resets the backoff.

use core::fmt;
use log::{error, info, warn};

use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    Link(CommsError),
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::Link(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

impl From<CommsError> for ConnectivityError {
    fn from(e: CommsError) -> Self {
        Self::Link(e)
    }
}

impl From<ConnectivityError> for crate::error::Error {
    fn from(e: ConnectivityError) -> Self {
        match e {
            ConnectivityError::InvalidSsid => Self::Config("WiFi SSID invalid"),
            ConnectivityError::InvalidPassword => Self::Config("WiFi password invalid"),
            ConnectivityError::Link(c) => Self::Comms(c),
        }
    }
}

pub trait ConnectivityPort {
    /// Bring the link up, trying up to `attempts` times.
    fn connect(&mut self, attempts: u32) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Detect drops and retry on the backoff schedule.
    fn poll(&mut self, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32, last_try_ms: u32 },
}

const INITIAL_BACKOFF_MS: u32 = 2_000;
const MAX_BACKOFF_MS: u32 = 60_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_ms: u32,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: whether the access point is reachable.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> Result<Self, crate::error::Error> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs))
            .map_err(|_| crate::error::Error::Init("WiFi driver"))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sys_loop)
            .map_err(|_| crate::error::Error::Init("WiFi event loop"))?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: copy_str(ssid)?,
            password: copy_str(password)?,
            backoff_ms: INITIAL_BACKOFF_MS,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, crate::error::Error> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: copy_str(ssid)?,
            password: copy_str(password)?,
            backoff_ms: INITIAL_BACKOFF_MS,
            sim_ap_up: true,
            sim_link_up: false,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn backoff_ms(&self) -> u32 {
        self.backoff_ms
    }

    /// Simulation: make the access point reachable or not.  Taking it down
    /// also drops an established link.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap(&mut self, up: bool) {
        self.sim_ap_up = up;
        if !up {
            self.sim_link_up = false;
        }
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_ms = INITIAL_BACKOFF_MS;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if !self.wifi.is_started().unwrap_or(false) {
            let auth_method = if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPAWPA2Personal
            };
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration {
                    ssid: self.ssid.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
                    password: self
                        .password
                        .as_str()
                        .try_into()
                        .map_err(|_| CommsError::WifiConnectFailed)?,
                    auth_method,
                    ..Default::default()
                }))
                .map_err(|_| CommsError::WifiConnectFailed)?;
            self.wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
        }
        self.wifi.connect().map_err(|_| CommsError::WifiConnectFailed)?;
        self.wifi
            .wait_netif_up()
            .map_err(|_| CommsError::WifiConnectFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if !self.sim_ap_up {
            return Err(CommsError::WifiConnectFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): link up to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }
}

fn copy_str<const N: usize>(s: &str) -> Result<heapless::String<N>, crate::error::Error> {
    let mut out = heapless::String::new();
    out.push_str(s)
        .map_err(|()| crate::error::Error::Config("WiFi credential too long"))?;
    Ok(out)
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self, attempts: u32) -> Result<(), ConnectivityError> {
        if self.state == WifiState::Connected && self.platform_is_connected() {
            return Ok(());
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        for attempt in 1..=attempts.max(1) {
            match self.platform_connect() {
                Ok(()) => {
                    self.on_connected();
                    info!("WiFi: connected on attempt {}", attempt);
                    return Ok(());
                }
                Err(e) => warn!("WiFi: attempt {}/{} failed: {}", attempt, attempts.max(1), e),
            }
        }
        error!("WiFi: could not connect to '{}'", self.ssid);
        self.state = WifiState::Disconnected;
        Err(CommsError::WifiConnectFailed.into())
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn poll(&mut self, now_ms: u32) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: {}, entering reconnect", CommsError::WifiDisconnected);
                    self.state = WifiState::Reconnecting {
                        attempt: 0,
                        last_try_ms: now_ms,
                    };
                }
            }
            WifiState::Reconnecting { attempt, last_try_ms } => {
                if now_ms.wrapping_sub(last_try_ms) < self.backoff_ms {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {} ms)", attempt + 1, self.backoff_ms);
                match self.platform_connect() {
                    Ok(()) => {
                        self.on_connected();
                        info!("WiFi: reconnected");
                    }
                    Err(_) => {
                        self.backoff_ms = self.backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                        self.state = WifiState::Reconnecting {
                            attempt: attempt + 1,
                            last_try_ms: now_ms,
                        };
                    }
                }
            }
            WifiState::Disconnected => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
