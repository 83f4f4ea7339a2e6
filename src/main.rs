//! Room controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (TimePort)      │
//! │  FirebaseStore     WifiAdapter                                 │
//! │  (RemoteStore)     (Connectivity)                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        ControllerService (pure logic)                  │    │
//! │  │  light · device · pump reconcilers                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (command poll + telemetry cadences)                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::FromValueType;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use roomctl::adapters::firebase::FirebaseStore;
use roomctl::adapters::hardware::HardwareAdapter;
use roomctl::adapters::log_sink::LogEventSink;
use roomctl::adapters::nvs::NvsAdapter;
use roomctl::adapters::time::Esp32TimeAdapter;
use roomctl::adapters::wifi::{ConnectivityPort, WifiAdapter};
use roomctl::app::ports::{ConfigPort, TimePort};
use roomctl::config::ControllerConfig;
use roomctl::drivers::relay::RelayDriver;
use roomctl::drivers::servo::{ServoDriver, SERVO_FREQ_HZ};
use roomctl::drivers::watchdog::Watchdog;
use roomctl::pins;
use roomctl::runtime::ControlLoop;
use roomctl::secrets::RemoteCredentials;
use roomctl::sensors::dht22::Dht22;
use roomctl::sensors::motion::PirSensor;

const WIFI_CONNECT_ATTEMPTS: u32 = 5;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  roomctl v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new(nvs_partition.clone()) {
        Ok(nvs) => nvs.load().unwrap_or_else(|e| {
            warn!("NVS config load failed ({}), using defaults", e);
            ControllerConfig::default()
        }),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            ControllerConfig::default()
        }
    };

    let credentials = RemoteCredentials::from_build_env().context("remote store credentials")?;
    info!("Remote store: {}", credentials.host);

    // ── 3. Network (required before anything talks to the store) ──
    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sys_loop,
        nvs_partition,
        config.wifi_ssid.as_str(),
        config.wifi_password.as_str(),
    )?;
    wifi.connect(WIFI_CONNECT_ATTEMPTS)
        .context("WiFi startup failed")?;

    // ── 4. Peripherals ────────────────────────────────────────
    // SAFETY: each GPIO number in `pins` is claimed exactly once here.
    let light = PinDriver::output(unsafe { AnyOutputPin::new(pins::RELAY_LIGHT_GPIO) })?;
    let device = PinDriver::output(unsafe { AnyOutputPin::new(pins::RELAY_DEVICE_GPIO) })?;
    let pir_room = PinDriver::input(unsafe { AnyInputPin::new(pins::PIR_ROOM_GPIO) })?;
    let pir_dorm = PinDriver::input(unsafe { AnyInputPin::new(pins::PIR_DORM_GPIO) })?;
    let dht_line = PinDriver::input_output_od(unsafe { AnyIOPin::new(pins::DHT_GPIO) })?;

    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(SERVO_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits14),
    )?;
    let servo_channel = LedcDriver::new(
        peripherals.ledc.channel0,
        servo_timer,
        unsafe { AnyOutputPin::new(pins::SERVO_GPIO) },
    )?;
    info!(
        "Servo: {} Hz, {}-bit duty",
        SERVO_FREQ_HZ,
        pins::SERVO_PWM_RESOLUTION_BITS
    );

    let hw = HardwareAdapter::new(
        RelayDriver::new(light),
        RelayDriver::new(device),
        ServoDriver::new(servo_channel),
        PirSensor::new(pir_room, "room"),
        PirSensor::new(pir_dorm, "dorm"),
        Dht22::new(dht_line, Ets, Esp32TimeAdapter::new()),
    );

    // ── 5. Control loop ───────────────────────────────────────
    let store = FirebaseStore::new(credentials, config.store_timeout_ms)?;
    let clock = Esp32TimeAdapter::new();
    let mut control = ControlLoop::new(&config, hw, store, LogEventSink::new())?;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    control.start(clock.now_ms());
    info!("System ready. Entering control loop.");

    loop {
        watchdog.feed();
        let now_ms = clock.now_ms();
        wifi.poll(now_ms);
        control.run_once_feeding(now_ms, &mut || watchdog.feed());
        FreeRtos::delay_ms(config.loop_delay_ms);
    }
}
