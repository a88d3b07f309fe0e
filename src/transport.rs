//! The byte-level side of the configurator.
//!
//! [`Transport`] is the Modbus master the session talks through. It only
//! needs "read holding registers" and "write multiple registers", always
//! addressed to [`crate::protocol::UNIT_ID`]. [`Connector`] opens a transport for a
//! port identifier such as `/dev/ttyUSB0` or `COM3`.
//!
//! With the `rtu-sync` feature both are implemented on top of the blocking
//! `tokio-modbus` RTU client.

/// Failure of a single register transaction.
///
/// The session never looks inside; it only forwards these to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Wraps `std::io::Error`, including timeouts and serial port failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wraps `tokio_modbus::Error`.
    #[cfg(feature = "rtu-sync")]
    #[error("Modbus error: {0}")]
    Modbus(#[from] tokio_modbus::Error),

    /// Wraps `tokio_modbus::ExceptionCode`.
    #[cfg(feature = "rtu-sync")]
    #[error("Modbus exception: {0}")]
    Exception(#[from] tokio_modbus::ExceptionCode),

    /// The response does not carry the requested number of registers.
    #[error("Expected {expected} registers in response, got {actual}")]
    ResponseLength { expected: usize, actual: usize },
}

impl TransportError {
    /// `true` if the transaction ran into the response timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Io(err) => err.kind() == std::io::ErrorKind::TimedOut,
            #[cfg(feature = "rtu-sync")]
            Self::Modbus(tokio_modbus::Error::Transport(err)) => {
                err.kind() == std::io::ErrorKind::TimedOut
            }
            _ => false,
        }
    }
}

/// Modbus master bound to one serial link.
pub trait Transport {
    /// Reads `quantity` holding registers starting at `address`.
    fn read_holding_registers(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u16>, TransportError>;

    /// Writes `values` to consecutive holding registers starting at `address`.
    fn write_multiple_registers(
        &mut self,
        address: u16,
        values: &[u16],
    ) -> Result<(), TransportError>;
}

/// Opens a [`Transport`] for a port identifier.
pub trait Connector {
    type Transport: Transport;

    fn open(&mut self, port: &str) -> Result<Self::Transport, TransportError>;
}

#[cfg(feature = "rtu-sync")]
pub use rtu::*;

#[cfg(feature = "rtu-sync")]
mod rtu {
    use super::{Connector, Transport, TransportError};
    use crate::protocol as proto;
    use std::time::Duration;
    use tokio_modbus::client::sync::Context;
    use tokio_modbus::prelude::{SyncReader, SyncWriter};

    /// The parity used for serial communication.
    pub const PARITY: &tokio_serial::Parity = &tokio_serial::Parity::Even;
    /// The number of stop bits used for serial communication.
    pub const STOP_BITS: &tokio_serial::StopBits = &tokio_serial::StopBits::One;
    /// The number of data bits used for serial communication.
    pub const DATA_BITS: &tokio_serial::DataBits = &tokio_serial::DataBits::Eight;
    /// Bound of every request/response round trip.
    pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(1000);

    /// Creates a `tokio_serial::SerialPortBuilder` with the sensor's framing.
    ///
    /// # Arguments
    ///
    /// * `device` - The path to the serial port device (e.g., `/dev/ttyUSB0`).
    /// * `baud_rate` - The line speed the sensor is configured for.
    pub fn serial_port_builder(
        device: &str,
        baud_rate: &proto::ExchangeRate,
    ) -> tokio_serial::SerialPortBuilder {
        tokio_serial::new(device, baud_rate.as_baud())
            .parity(*PARITY)
            .stop_bits(*STOP_BITS)
            .data_bits(*DATA_BITS)
            .flow_control(tokio_serial::FlowControl::None)
    }

    /// Lists the names of the serial ports present on this machine.
    pub fn available_ports() -> Result<Vec<String>, TransportError> {
        let ports = tokio_serial::available_ports()
            .map_err(|err| TransportError::Io(std::io::Error::from(err)))?;
        Ok(ports.into_iter().map(|port| port.port_name).collect())
    }

    /// Helper function to map tokio result to our result.
    fn map_tokio_result<T>(result: tokio_modbus::Result<T>) -> Result<T, TransportError> {
        match result {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(err.into()), // Modbus exception
            Err(err) => Err(err.into()),     // IO error
        }
    }

    impl Transport for Context {
        fn read_holding_registers(
            &mut self,
            address: u16,
            quantity: u16,
        ) -> Result<Vec<u16>, TransportError> {
            let words = map_tokio_result(SyncReader::read_holding_registers(
                self, address, quantity,
            ))?;
            if words.len() != quantity as usize {
                return Err(TransportError::ResponseLength {
                    expected: quantity as usize,
                    actual: words.len(),
                });
            }
            Ok(words)
        }

        fn write_multiple_registers(
            &mut self,
            address: u16,
            values: &[u16],
        ) -> Result<(), TransportError> {
            map_tokio_result(SyncWriter::write_multiple_registers(self, address, values))
        }
    }

    /// Opens blocking Modbus RTU connections to the sensor.
    #[derive(Debug, Clone)]
    pub struct RtuConnector {
        baud_rate: proto::ExchangeRate,
        timeout: Duration,
    }

    impl RtuConnector {
        pub fn new(baud_rate: proto::ExchangeRate) -> Self {
            Self {
                baud_rate,
                timeout: RESPONSE_TIMEOUT,
            }
        }

        /// Overrides [`RESPONSE_TIMEOUT`].
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn baud_rate(&self) -> proto::ExchangeRate {
            self.baud_rate
        }

        pub fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    impl Default for RtuConnector {
        fn default() -> Self {
            Self::new(proto::ExchangeRate::default())
        }
    }

    impl Connector for RtuConnector {
        type Transport = Context;

        fn open(&mut self, port: &str) -> Result<Context, TransportError> {
            log::debug!(
                "Opening {port} at {}, timeout {:?}",
                self.baud_rate,
                self.timeout
            );
            let mut ctx = tokio_modbus::client::sync::rtu::connect_slave(
                &serial_port_builder(port, &self.baud_rate),
                tokio_modbus::Slave(proto::UNIT_ID),
            )?;
            ctx.set_timeout(self.timeout);
            Ok(ctx)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn rtu_connector_defaults() {
            let connector = RtuConnector::default();
            assert_eq!(connector.baud_rate(), proto::ExchangeRate::B9600);
            assert_eq!(connector.timeout(), Duration::from_millis(1000));

            let connector =
                RtuConnector::new(proto::ExchangeRate::B19200).with_timeout(Duration::from_millis(250));
            assert_eq!(connector.baud_rate(), proto::ExchangeRate::B19200);
            assert_eq!(connector.timeout(), Duration::from_millis(250));
        }

        #[test]
        fn timeout_detection() {
            let timeout = TransportError::Modbus(tokio_modbus::Error::Transport(
                std::io::Error::new(std::io::ErrorKind::TimedOut, "no response"),
            ));
            assert!(timeout.is_timeout());
            let broken = TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "unplugged",
            ));
            assert!(!broken.is_timeout());
            assert!(!TransportError::ResponseLength {
                expected: 2,
                actual: 1
            }
            .is_timeout());
        }
    }
}
