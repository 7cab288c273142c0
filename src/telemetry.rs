//! One cycle's sensor readings.

/// Raw ADC reading of a bone-dry probe.
pub const SOIL_DRY: u16 = 4095;
/// Raw ADC reading of a probe in water.
pub const SOIL_WET: u16 = 1500;

/// Readings taken in one cycle, already normalized.
///
/// Built fresh every cycle and consumed by a single submission.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySample {
    temperature: f32,
    humidity: f32,
    soil_moisture: u8,
    soil_raw: u16,
}

impl TelemetrySample {
    /// Normalize raw sensor output.
    ///
    /// A failed climate read shows up as NaN in either value; both are then
    /// reported as zero, matching what the collector has always received.
    pub fn new(temperature: f32, humidity: f32, soil_raw: u16) -> Self {
        let (temperature, humidity) = if temperature.is_finite() && humidity.is_finite() {
            (temperature, humidity)
        } else {
            warn!("climate sensor read failed, reporting zeros");
            (0.0, 0.0)
        };
        Self {
            temperature,
            humidity,
            soil_moisture: soil_percent(soil_raw),
            soil_raw,
        }
    }

    /// Degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Soil moisture in percent, 0..=100.
    pub fn soil_moisture(&self) -> u8 {
        self.soil_moisture
    }

    /// The ADC value the percentage was derived from.
    pub fn soil_raw(&self) -> u16 {
        self.soil_raw
    }
}

/// Map a raw probe reading linearly from [`SOIL_DRY`] (0 %) to [`SOIL_WET`]
/// (100 %), clamped.
pub fn soil_percent(raw: u16) -> u8 {
    let dry = i32::from(SOIL_DRY);
    let wet = i32::from(SOIL_WET);
    let percent = (dry - i32::from(raw)) * 100 / (dry - wet);
    percent.clamp(0, 100) as u8
}
