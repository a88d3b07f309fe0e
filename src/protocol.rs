//! Register map and typed values of the pressure transducer's Modbus interface.
//!
//! The device exposes its configuration as a flat block of 16-bit holding
//! registers. Most registers pack two independent byte-wide fields: the most
//! significant byte (MSB) and the least significant byte (LSB) of a register
//! carry different settings. This module provides
//!
//! - the register address map ([`SENSOR_SETTINGS_REG_ADDR`], [`RESTART_REG_ADDR`], ...),
//! - the byte/float codec used to pick those fields apart,
//! - one strongly typed enum per coded setting with an exact code table,
//! - the decoded [`Configuration`] snapshot and the [`Pressure`] reading.
//!
//! Decoding never coerces an unknown code to a default variant, it fails
//! with [`Error::UnrecognizedCode`].

use std::fmt;
use std::str::FromStr;

/// Errors raised while interpreting register contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A byte field holds a code that is not part of its table.
    #[error("Unrecognized {table} code {code:#04x}")]
    UnrecognizedCode { table: &'static str, code: u8 },

    /// The identity register does not carry the sensor marker.
    #[error("The device is not a recognized sensor (identity marker {0:#04x}, expected 0x11)")]
    NotASensor(u8),

    /// The device answered with fewer registers than the value needs.
    #[error("Expected {expected} registers, got {actual}")]
    RegisterCount { expected: usize, actual: usize },
}

/// Modbus unit identifier the configurator talks to.
pub const UNIT_ID: u8 = 1;

/// First register of the configuration block.
pub const SENSOR_SETTINGS_REG_ADDR: u16 = 0x0000;
/// The configuration block is always read as a whole.
pub const SENSOR_SETTINGS_REG_QUAN: u16 = 0x39;

/// Sensor address (LSB) and ADC sampling rate (MSB).
pub const ADDRESS_RATE_REG_ADDR: u16 = 0x0000;
/// Range index (MSB) and output dimension (LSB).
pub const RANGE_DIMENSION_REG_ADDR: u16 = 0x0001;
/// Damping constant (MSB).
pub const DAMPING_REG_ADDR: u16 = 0x0002;
/// Exchange rate (MSB) and parity (LSB).
pub const EXCHANGE_PARITY_REG_ADDR: u16 = 0x0003;

pub const RESTART_REG_ADDR: u16 = 0x001F;
pub const RESTART_REG_DATA: u16 = 0x5A;

pub const IDENTITY_REG_ADDR: u16 = 0x0020;
pub const IDENTITY_REG_QUAN: u16 = 1;
pub const IDENTITY_MARKER: u8 = 0x11;

pub const PRESSURE_REG_ADDR: u16 = 0x0027;
pub const PRESSURE_REG_QUAN: u16 = 2;

/// Returns the most significant byte of a register.
pub fn high_byte(value: u16) -> u8 {
    (value >> 8) as u8
}

/// Returns the least significant byte of a register.
pub fn low_byte(value: u16) -> u8 {
    (value & 0xFF) as u8
}

/// Replaces the LSB of `value`, keeping whatever field lives in the MSB.
pub fn replace_low_byte(value: u16, low: u8) -> u16 {
    (value & 0xFF00) | low as u16
}

/// Reconstructs an IEEE-754 single from two consecutive registers.
///
/// The register at the lower address (`hi`) supplies the most significant
/// 16 bits. In terms of the little-endian byte image of the float:
/// `[lsb(lo), msb(lo), lsb(hi), msb(hi)]`.
pub fn float_from_register_pair(hi: u16, lo: u16) -> f32 {
    f32::from_le_bytes([low_byte(lo), high_byte(lo), low_byte(hi), high_byte(hi)])
}

fn check_register_count(words: &[u16], expected: u16) -> Result<(), Error> {
    if words.len() < expected as usize {
        Err(Error::RegisterCount {
            expected: expected as usize,
            actual: words.len(),
        })
    } else {
        Ok(())
    }
}

/// Verifies the device identity register read from [`IDENTITY_REG_ADDR`].
pub fn check_identity(words: &[u16]) -> Result<(), Error> {
    check_register_count(words, IDENTITY_REG_QUAN)?;
    let marker = high_byte(words[0]);
    if marker == IDENTITY_MARKER {
        Ok(())
    } else {
        Err(Error::NotASensor(marker))
    }
}

/// Conversion rate of the sensor's ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AdcSamplingRate {
    Hz8 = 0,
    Hz16 = 1,
    Hz32 = 2,
}

impl AdcSamplingRate {
    pub const ALL: [AdcSamplingRate; 3] = [Self::Hz8, Self::Hz16, Self::Hz32];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_hz(&self) -> u16 {
        match self {
            Self::Hz8 => 8,
            Self::Hz16 => 16,
            Self::Hz32 => 32,
        }
    }
}

impl TryFrom<u8> for AdcSamplingRate {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Hz8),
            1 => Ok(Self::Hz16),
            2 => Ok(Self::Hz32),
            _ => Err(Error::UnrecognizedCode {
                table: "ADC sampling rate",
                code,
            }),
        }
    }
}

impl fmt::Display for AdcSamplingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.as_hz())
    }
}

/// Physical unit of the pressure output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Dimension {
    Percent = 0,
    Pascal = 1,
    Kilopascal = 2,
    Megapascal = 3,
    KgfPerSquareCentimeter = 4,
    KgfPerSquareMeter = 5,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Self::Percent,
        Self::Pascal,
        Self::Kilopascal,
        Self::Megapascal,
        Self::KgfPerSquareCentimeter,
        Self::KgfPerSquareMeter,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Short unit label, also accepted by [`Dimension::from_str`].
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::Pascal => "Pa",
            Self::Kilopascal => "kPa",
            Self::Megapascal => "MPa",
            Self::KgfPerSquareCentimeter => "kgf/cm2",
            Self::KgfPerSquareMeter => "kgf/m2",
        }
    }
}

impl TryFrom<u8> for Dimension {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Percent),
            1 => Ok(Self::Pascal),
            2 => Ok(Self::Kilopascal),
            3 => Ok(Self::Megapascal),
            4 => Ok(Self::KgfPerSquareCentimeter),
            5 => Ok(Self::KgfPerSquareMeter),
            _ => Err(Error::UnrecognizedCode {
                table: "dimension",
                code,
            }),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a dimension name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dimension '{0}', expected one of: percent, pa, kpa, mpa, kgf/cm2, kgf/m2")]
pub struct ParseDimensionError(String);

impl FromStr for Dimension {
    type Err = ParseDimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "%" | "percent" => Ok(Self::Percent),
            "pa" | "pascal" => Ok(Self::Pascal),
            "kpa" | "kilopascal" => Ok(Self::Kilopascal),
            "mpa" | "megapascal" => Ok(Self::Megapascal),
            "kgf/cm2" | "kgf/cm²" => Ok(Self::KgfPerSquareCentimeter),
            "kgf/m2" | "kgf/m²" => Ok(Self::KgfPerSquareMeter),
            _ => Err(ParseDimensionError(s.to_string())),
        }
    }
}

/// Output filter time constant.
///
/// The steps roughly double, so they are named by their value in tenths of
/// a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DampingConstant {
    Off = 0,
    Ds2 = 1,
    Ds4 = 2,
    Ds8 = 3,
    Ds16 = 4,
    Ds33 = 5,
    Ds66 = 6,
    Ds133 = 7,
    Ds266 = 8,
}

impl DampingConstant {
    pub const ALL: [DampingConstant; 9] = [
        Self::Off,
        Self::Ds2,
        Self::Ds4,
        Self::Ds8,
        Self::Ds16,
        Self::Ds33,
        Self::Ds66,
        Self::Ds133,
        Self::Ds266,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Time constant in seconds.
    pub fn as_secs_f32(&self) -> f32 {
        self.deciseconds() as f32 / 10.0
    }

    fn deciseconds(&self) -> u16 {
        match self {
            Self::Off => 0,
            Self::Ds2 => 2,
            Self::Ds4 => 4,
            Self::Ds8 => 8,
            Self::Ds16 => 16,
            Self::Ds33 => 33,
            Self::Ds66 => 66,
            Self::Ds133 => 133,
            Self::Ds266 => 266,
        }
    }
}

impl TryFrom<u8> for DampingConstant {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Off),
            1 => Ok(Self::Ds2),
            2 => Ok(Self::Ds4),
            3 => Ok(Self::Ds8),
            4 => Ok(Self::Ds16),
            5 => Ok(Self::Ds33),
            6 => Ok(Self::Ds66),
            7 => Ok(Self::Ds133),
            8 => Ok(Self::Ds266),
            _ => Err(Error::UnrecognizedCode {
                table: "damping constant",
                code,
            }),
        }
    }
}

impl fmt::Display for DampingConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self.deciseconds();
        write!(f, "{}.{} s", ds / 10, ds % 10)
    }
}

/// Baud rate of the device's serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ExchangeRate {
    B1200 = 0,
    B2400 = 1,
    B4800 = 2,
    #[default]
    B9600 = 3,
    B19200 = 4,
    B38400 = 5,
    B57600 = 6,
    B115200 = 7,
}

impl ExchangeRate {
    pub const ALL: [ExchangeRate; 8] = [
        Self::B1200,
        Self::B2400,
        Self::B4800,
        Self::B9600,
        Self::B19200,
        Self::B38400,
        Self::B57600,
        Self::B115200,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_baud(&self) -> u32 {
        match self {
            Self::B1200 => 1200,
            Self::B2400 => 2400,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B19200 => 19200,
            Self::B38400 => 38400,
            Self::B57600 => 57600,
            Self::B115200 => 115200,
        }
    }
}

impl TryFrom<u8> for ExchangeRate {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::B1200),
            1 => Ok(Self::B2400),
            2 => Ok(Self::B4800),
            3 => Ok(Self::B9600),
            4 => Ok(Self::B19200),
            5 => Ok(Self::B38400),
            6 => Ok(Self::B57600),
            7 => Ok(Self::B115200),
            _ => Err(Error::UnrecognizedCode {
                table: "exchange rate",
                code,
            }),
        }
    }
}

/// Error returned when a baud rate has no exchange rate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported baud rate {0}")]
pub struct UnsupportedBaudRate(pub u32);

impl TryFrom<u32> for ExchangeRate {
    type Error = UnsupportedBaudRate;

    fn try_from(baud: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.as_baud() == baud)
            .ok_or(UnsupportedBaudRate(baud))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} baud", self.as_baud())
    }
}

/// Parity setting of the device's serial line.
///
/// The device knows two distinct "no parity" settings; both are kept so a
/// read-modify-write never changes one into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Parity {
    Even = 0,
    Odd = 1,
    None1 = 2,
    None2 = 3,
}

impl Parity {
    pub const ALL: [Parity; 4] = [Self::Even, Self::Odd, Self::None1, Self::None2];

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Parity {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Even),
            1 => Ok(Self::Odd),
            2 => Ok(Self::None1),
            3 => Ok(Self::None2),
            _ => Err(Error::UnrecognizedCode {
                table: "parity",
                code,
            }),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => f.write_str("even"),
            Self::Odd => f.write_str("odd"),
            Self::None1 => f.write_str("none (1)"),
            Self::None2 => f.write_str("none (2)"),
        }
    }
}

/// Immutable snapshot of the device configuration.
///
/// A snapshot is either decoded in full from the configuration block
/// ([`Configuration::decode_from_holding_registers`]) or it is the
/// placeholder returned by [`Configuration::default`], which reports
/// [`Configuration::is_valid`] as `false`.
///
/// With the `serde` feature the snapshot can be serialized but not
/// deserialized, a valid snapshot only ever comes from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Configuration {
    pub sensor_address: u8,
    pub adc_sampling_rate: AdcSamplingRate,
    /// Device internal range index, not interpreted.
    pub range: u8,
    pub dimension: Dimension,
    pub damping_constant: DampingConstant,
    pub exchange_rate: ExchangeRate,
    pub parity: Parity,
    valid: bool,
}

impl Configuration {
    pub const ADDRESS: u16 = SENSOR_SETTINGS_REG_ADDR;
    pub const QUANTITY: u16 = SENSOR_SETTINGS_REG_QUAN;

    /// Decodes the configuration block starting at register 0.
    ///
    /// Only the first four registers carry settings; the rest of the block
    /// is ignored. Any unknown code fails the whole decode.
    pub fn decode_from_holding_registers(words: &[u16]) -> Result<Self, Error> {
        // Only the packed settings are required, the tail of the block is optional.
        check_register_count(words, EXCHANGE_PARITY_REG_ADDR + 1)?;
        let address_rate = words[ADDRESS_RATE_REG_ADDR as usize];
        let range_dimension = words[RANGE_DIMENSION_REG_ADDR as usize];
        let damping = words[DAMPING_REG_ADDR as usize];
        let exchange_parity = words[EXCHANGE_PARITY_REG_ADDR as usize];

        Ok(Self {
            sensor_address: low_byte(address_rate),
            adc_sampling_rate: AdcSamplingRate::try_from(high_byte(address_rate))?,
            range: high_byte(range_dimension),
            dimension: Dimension::try_from(low_byte(range_dimension))?,
            damping_constant: DampingConstant::try_from(high_byte(damping))?,
            exchange_rate: ExchangeRate::try_from(high_byte(exchange_parity))?,
            parity: Parity::try_from(low_byte(exchange_parity))?,
            valid: true,
        })
    }

    /// `false` only for the placeholder that exists before the first read.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sensor_address: 1,
            adc_sampling_rate: AdcSamplingRate::Hz8,
            range: 0,
            dimension: Dimension::Kilopascal,
            damping_constant: DampingConstant::Off,
            exchange_rate: ExchangeRate::B9600,
            parity: Parity::Even,
            valid: false,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return f.write_str("Configuration not read yet");
        }
        writeln!(f, "Sensor address: {}", self.sensor_address)?;
        writeln!(f, "ADC sampling rate: {}", self.adc_sampling_rate)?;
        writeln!(f, "Range index: {}", self.range)?;
        writeln!(f, "Output dimension: {}", self.dimension)?;
        writeln!(f, "Damping constant: {}", self.damping_constant)?;
        writeln!(f, "Exchange rate: {}", self.exchange_rate)?;
        write!(f, "Parity: {}", self.parity)
    }
}

/// Live pressure reading, in the currently configured [`Dimension`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pressure(f32);

impl Pressure {
    pub const ADDRESS: u16 = PRESSURE_REG_ADDR;
    pub const QUANTITY: u16 = PRESSURE_REG_QUAN;

    pub fn decode_from_holding_registers(words: &[u16]) -> Result<Self, Error> {
        check_register_count(words, Self::QUANTITY)?;
        Ok(Self(float_from_register_pair(words[0], words[1])))
    }
}

impl std::ops::Deref for Pressure {
    type Target = f32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Pressure> for f32 {
    fn from(pressure: Pressure) -> Self {
        pressure.0
    }
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn byte_fields() {
        for value in [0x0000u16, 0x00FF, 0xFF00, 0x1234, 0xABCD, 0xFFFF] {
            assert_eq!(high_byte(value) as u16, (value >> 8) & 0xFF);
            assert_eq!(low_byte(value) as u16, value & 0xFF);
        }
        assert_eq!(high_byte(0x1234), 0x12);
        assert_eq!(low_byte(0x1234), 0x34);
    }

    #[test]
    fn replace_low_byte_keeps_high_byte() {
        assert_eq!(replace_low_byte(0x1234, 0xAB), 0x12AB);
        assert_eq!(replace_low_byte(0xFF00, 0x05), 0xFF05);
        assert_eq!(replace_low_byte(0x00FF, 0x00), 0x0000);
        let replaced = replace_low_byte(0xBEEF, 0x42);
        assert_eq!(high_byte(replaced), 0xBE);
        assert_eq!(low_byte(replaced), 0x42);
    }

    #[test]
    fn float_from_register_pair_test() {
        // 0x40490FDB is the IEEE-754 single closest to pi.
        let value = float_from_register_pair(0x4049, 0x0FDB);
        assert_eq!(value.to_bits(), 0x4049_0FDB);
        assert!((value - std::f32::consts::PI).abs() < 1e-6);

        assert_eq!(float_from_register_pair(0x0000, 0x0000), 0.0);
        assert_eq!(float_from_register_pair(0x3F80, 0x0000), 1.0);
        assert_eq!(float_from_register_pair(0xC2C8, 0x0000), -100.0);
        // The low-address register must end up in the upper half.
        assert_ne!(
            float_from_register_pair(0x0FDB, 0x4049).to_bits(),
            0x4049_0FDB
        );
    }

    #[test]
    fn check_identity_test() {
        assert_matches!(check_identity(&[0x1100]), Ok(()));
        assert_matches!(check_identity(&[0x11FF]), Ok(()));
        assert_matches!(check_identity(&[0x0011]), Err(Error::NotASensor(0x00)));
        assert_matches!(check_identity(&[0x1200]), Err(Error::NotASensor(0x12)));
        assert_matches!(
            check_identity(&[]),
            Err(Error::RegisterCount {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn code_tables_round_trip() {
        for (code, rate) in AdcSamplingRate::ALL.iter().enumerate() {
            assert_eq!(rate.code() as usize, code);
            assert_eq!(AdcSamplingRate::try_from(rate.code()), Ok(*rate));
        }
        for (code, dimension) in Dimension::ALL.iter().enumerate() {
            assert_eq!(dimension.code() as usize, code);
            assert_eq!(Dimension::try_from(dimension.code()), Ok(*dimension));
        }
        for (code, damping) in DampingConstant::ALL.iter().enumerate() {
            assert_eq!(damping.code() as usize, code);
            assert_eq!(DampingConstant::try_from(damping.code()), Ok(*damping));
        }
        for (code, rate) in ExchangeRate::ALL.iter().enumerate() {
            assert_eq!(rate.code() as usize, code);
            assert_eq!(ExchangeRate::try_from(rate.code()), Ok(*rate));
        }
        for (code, parity) in Parity::ALL.iter().enumerate() {
            assert_eq!(parity.code() as usize, code);
            assert_eq!(Parity::try_from(parity.code()), Ok(*parity));
        }
    }

    #[test]
    fn code_tables_reject_unknown_codes() {
        assert_matches!(
            AdcSamplingRate::try_from(3),
            Err(Error::UnrecognizedCode { code: 3, .. })
        );
        assert_matches!(
            Dimension::try_from(6),
            Err(Error::UnrecognizedCode { code: 6, .. })
        );
        assert_matches!(
            DampingConstant::try_from(9),
            Err(Error::UnrecognizedCode { code: 9, .. })
        );
        assert_matches!(
            ExchangeRate::try_from(8u8),
            Err(Error::UnrecognizedCode { code: 8, .. })
        );
        assert_matches!(
            Parity::try_from(4),
            Err(Error::UnrecognizedCode { code: 4, .. })
        );
        assert_matches!(
            Dimension::try_from(0xFF),
            Err(Error::UnrecognizedCode {
                table: "dimension",
                ..
            })
        );
    }

    #[test]
    fn exchange_rate_from_baud() {
        assert_eq!(ExchangeRate::try_from(9600u32), Ok(ExchangeRate::B9600));
        assert_eq!(
            ExchangeRate::try_from(115200u32),
            Ok(ExchangeRate::B115200)
        );
        assert_eq!(
            ExchangeRate::try_from(9601u32),
            Err(UnsupportedBaudRate(9601))
        );
    }

    #[test]
    fn dimension_from_str() {
        assert_eq!("kPa".parse(), Ok(Dimension::Kilopascal));
        assert_eq!(" percent ".parse(), Ok(Dimension::Percent));
        assert_eq!("MPA".parse(), Ok(Dimension::Megapascal));
        assert_eq!("kgf/cm2".parse(), Ok(Dimension::KgfPerSquareCentimeter));
        assert_eq!("kgf/m²".parse(), Ok(Dimension::KgfPerSquareMeter));
        for dimension in Dimension::ALL {
            assert_eq!(dimension.symbol().parse(), Ok(dimension));
        }
        assert!("bar".parse::<Dimension>().is_err());
    }

    #[test]
    fn display_labels() {
        assert_eq!(AdcSamplingRate::Hz16.to_string(), "16 Hz");
        assert_eq!(DampingConstant::Off.to_string(), "0.0 s");
        assert_eq!(DampingConstant::Ds2.to_string(), "0.2 s");
        assert_eq!(DampingConstant::Ds266.to_string(), "26.6 s");
        assert_eq!(DampingConstant::Ds133.as_secs_f32(), 13.3);
        assert_eq!(ExchangeRate::B57600.to_string(), "57600 baud");
        assert_eq!(Parity::None2.to_string(), "none (2)");
    }

    #[test]
    fn configuration_decode() {
        let configuration =
            Configuration::decode_from_holding_registers(&[0x0001, 0x0200, 0x0300, 0x0403])
                .unwrap();
        assert!(configuration.is_valid());
        assert_eq!(configuration.sensor_address, 1);
        assert_eq!(configuration.adc_sampling_rate, AdcSamplingRate::Hz8);
        assert_eq!(configuration.range, 2);
        assert_eq!(configuration.dimension, Dimension::Percent);
        assert_eq!(configuration.damping_constant, DampingConstant::Ds8);
        assert_eq!(configuration.exchange_rate, ExchangeRate::B19200);
        assert_eq!(configuration.parity, Parity::None2);
        assert!(configuration
            .to_string()
            .contains("\nExchange rate: 19200 baud\n"));

        let configuration =
            Configuration::decode_from_holding_registers(&[0x02F7, 0x0702, 0x08AA, 0x0701])
                .unwrap();
        assert_eq!(configuration.sensor_address, 0xF7);
        assert_eq!(configuration.adc_sampling_rate, AdcSamplingRate::Hz32);
        assert_eq!(configuration.range, 7);
        assert_eq!(configuration.dimension, Dimension::Kilopascal);
        // The LSB of the damping register is not a setting.
        assert_eq!(configuration.damping_constant, DampingConstant::Ds266);
        assert_eq!(configuration.exchange_rate, ExchangeRate::B115200);
        assert_eq!(configuration.parity, Parity::Odd);
    }

    #[test]
    fn configuration_decode_full_block() {
        let mut words = vec![0u16; SENSOR_SETTINGS_REG_QUAN as usize];
        words[1] = 0x0003;
        words[0x20] = 0x1100;
        let configuration = Configuration::decode_from_holding_registers(&words).unwrap();
        assert_eq!(configuration.dimension, Dimension::Megapascal);
    }

    #[test]
    fn configuration_decode_rejects_unknown_codes() {
        assert_matches!(
            Configuration::decode_from_holding_registers(&[0x0301, 0x0200, 0x0300, 0x0403]),
            Err(Error::UnrecognizedCode {
                table: "ADC sampling rate",
                code: 3
            })
        );
        assert_matches!(
            Configuration::decode_from_holding_registers(&[0x0001, 0x0206, 0x0300, 0x0403]),
            Err(Error::UnrecognizedCode {
                table: "dimension",
                code: 6
            })
        );
        assert_matches!(
            Configuration::decode_from_holding_registers(&[0x0001, 0x0200, 0x0300, 0x0404]),
            Err(Error::UnrecognizedCode {
                table: "parity",
                code: 4
            })
        );
        assert_matches!(
            Configuration::decode_from_holding_registers(&[0x0001, 0x0200, 0x0300]),
            Err(Error::RegisterCount {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn default_configuration_is_invalid() {
        let configuration = Configuration::default();
        assert!(!configuration.is_valid());
        assert_eq!(configuration.sensor_address, 1);
        assert_eq!(configuration.dimension, Dimension::Kilopascal);
        assert_eq!(configuration.exchange_rate, ExchangeRate::B9600);
        assert_eq!(configuration.to_string(), "Configuration not read yet");
    }

    #[test]
    fn pressure_decode() {
        let pressure = Pressure::decode_from_holding_registers(&[0x4049, 0x0FDB]).unwrap();
        assert_eq!(pressure.to_bits(), 0x4049_0FDB);
        assert_eq!(f32::from(pressure), std::f32::consts::PI);
        assert_matches!(
            Pressure::decode_from_holding_registers(&[0x4049]),
            Err(Error::RegisterCount {
                expected: 2,
                actual: 1
            })
        );
    }
}
