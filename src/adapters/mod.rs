//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `firebase` | RemoteStorePort    | Firebase RTDB REST / sim tree |
//! | `hardware` | SensorPort         | PIR inputs, DHT22             |
//! |            | ActuatorPort       | Relays, pump servo (LEDC)     |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `nvs`      | ConfigPort         | NVS / in-memory store         |
//! | `time`     | TimePort           | ESP32 system timer            |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod firebase;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
