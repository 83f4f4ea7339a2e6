//! HC-SR501 passive-infrared motion sensor.
//!
//! The module drives its output HIGH while motion is detected (the
//! on-board hold time is set by its potentiometer).  A failed GPIO read
//! counts as "no motion" so a broken wire can only ever let an output
//! time out, never hold it on.

use embedded_hal::digital::InputPin;
use log::warn;

pub struct PirSensor<P> {
    pin: P,
    label: &'static str,
}

impl<P: InputPin> PirSensor<P> {
    pub fn new(pin: P, label: &'static str) -> Self {
        Self { pin, label }
    }

    pub fn read(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(_) => {
                warn!("PIR {}: GPIO read failed, treating as no motion", self.label);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Broken;

    impl embedded_hal::digital::Error for Broken {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    struct Pin(Result<bool, ()>);

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Broken;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Broken> {
            self.0.map_err(|()| Broken)
        }
        fn is_low(&mut self) -> Result<bool, Broken> {
            self.is_high().map(|h| !h)
        }
    }

    #[test]
    fn high_is_motion() {
        let mut pir = PirSensor::new(Pin(Ok(true)), "room");
        assert!(pir.read());
        let mut idle = PirSensor::new(Pin(Ok(false)), "dorm");
        assert!(!idle.read());
    }

    #[test]
    fn read_error_is_no_motion() {
        let mut pir = PirSensor::new(Pin(Err(())), "dorm");
        assert!(!pir.read());
    }
}
