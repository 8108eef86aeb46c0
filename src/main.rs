//! IrVolumeRemote - Firmware entry point
//!
//! Wiring (ESP32-S3):
//!
//! ```text
//! GPIO5  IR receiver output
//! GPIO6  feedback LED (red)
//! GPIO7  controller LED (green)
//! GPIO8  I2C SDA ──▶ PT2257
//! GPIO9  I2C SCL ──▶ PT2257
//! ```
//!
//! The record lives in one NVS blob that is presented to the controller as
//! a byte-addressable medium.

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::PinDriver;
    use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_svc::hal::peripherals::Peripherals as EspPeripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::log::EspLogger;
    use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
    use esp_idf_svc::sys::{self as esp_idf_sys, EspError};

    use ir_volume_remote::config::{CHECKSUM_SIZE, RECORD_SIZE, STORAGE_OFFSET};
    use ir_volume_remote::hal::{IrDecoder, IrFrame, Storage};
    use ir_volume_remote::{App, ControllerConfig, FaultState, Peripherals};

    static FAULT_STATE: FaultState = FaultState::new();

    const NVS_NAMESPACE: &str = "volremote";
    const NVS_KEY: &str = "config";
    const BLOB_SIZE: usize = STORAGE_OFFSET + RECORD_SIZE + CHECKSUM_SIZE;

    #[derive(Debug)]
    enum NvsStorageError {
        OutOfBounds,
        Esp(EspError),
    }

    impl From<EspError> for NvsStorageError {
        fn from(e: EspError) -> Self {
            NvsStorageError::Esp(e)
        }
    }

    /// One NVS blob seen as EEPROM. A missing blob reads as erased (0xFF).
    struct NvsStorage {
        nvs: EspNvs<NvsDefault>,
    }

    impl NvsStorage {
        fn new(partition: EspDefaultNvsPartition) -> Result<Self, EspError> {
            Ok(Self {
                nvs: EspNvs::new(partition, NVS_NAMESPACE, true)?,
            })
        }

        fn load(&self) -> Result<[u8; BLOB_SIZE], NvsStorageError> {
            let mut blob = [0xFF; BLOB_SIZE];
            let mut buf = [0u8; BLOB_SIZE];
            if let Some(stored) = self.nvs.get_raw(NVS_KEY, &mut buf)? {
                let len = stored.len().min(BLOB_SIZE);
                blob[..len].copy_from_slice(&stored[..len]);
            }
            Ok(blob)
        }
    }

    fn blob_range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, NvsStorageError> {
        match offset.checked_add(len) {
            Some(end) if end <= BLOB_SIZE => Ok(offset..end),
            _ => Err(NvsStorageError::OutOfBounds),
        }
    }

    impl Storage for NvsStorage {
        type Error = NvsStorageError;

        fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
            let range = blob_range(offset, buf.len())?;
            buf.copy_from_slice(&self.load()?[range]);
            Ok(())
        }

        fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
            let range = blob_range(offset, data.len())?;
            let mut blob = self.load()?;
            blob[range].copy_from_slice(data);
            self.nvs.set_raw(NVS_KEY, &blob)?;
            Ok(())
        }
    }

    /// IR receiver on GPIO5.
    // TODO: decode NEC frames from an RMT receive channel on GPIO5; until then no frame is reported
    struct IrReceiver;

    impl IrDecoder for IrReceiver {
        fn poll(&mut self) -> Option<IrFrame> {
            None
        }
    }

    fn now_ms() -> u64 {
        // SAFETY: esp_timer_get_time is always safe to call after boot
        (unsafe { esp_idf_sys::esp_timer_get_time() } / 1000) as u64
    }

    pub fn run() -> Result<(), EspError> {
        // Initialize ESP-IDF
        esp_idf_sys::link_patches();
        EspLogger::initialize_default();
        log::info!("~ {}", env!("VERSION_STRING"));
        log::warn!("No IR decoder wired on GPIO5: remote frames are never received");

        let p = EspPeripherals::take()?;
        let i2c = I2cDriver::new(
            p.i2c0,
            p.pins.gpio8,
            p.pins.gpio9,
            &I2cConfig::new().baudrate(100.kHz().into()),
        )?;
        let feedback_led = PinDriver::output(p.pins.gpio6)?;
        let controller_led = PinDriver::output(p.pins.gpio7)?;
        let storage = NvsStorage::new(EspDefaultNvsPartition::take()?)?;

        let mut app = App::new(
            Peripherals {
                decoder: IrReceiver,
                storage,
                i2c,
                feedback_led,
                controller_led,
            },
            ControllerConfig::default(),
            &FAULT_STATE,
        );

        app.start(now_ms());
        loop {
            app.tick(now_ms());

            if FAULT_STATE.is_active() {
                let faults = FAULT_STATE.snapshot();
                log::warn!(
                    "Fault: {} (bus errors {}, storage errors {})",
                    faults.code.as_str(),
                    faults.bus_errors,
                    faults.storage_errors
                );
                FAULT_STATE.clear();
            }

            // Yield so the idle task can feed the watchdog
            FreeRtos::delay_ms(1);
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    if let Err(e) = firmware::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{}: firmware image, build for an ESP-IDF target to flash it",
        env!("VERSION_STRING")
    );
}
