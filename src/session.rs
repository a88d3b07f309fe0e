//! Connection lifecycle and register operations for one pressure transducer.
#![cfg_attr(
    feature = "rtu-sync",
    doc = r#"
## Example

```no_run
use ptconf_lib::{protocol::Dimension, session::SensorSession, transport::RtuConnector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = SensorSession::new(RtuConnector::default());
    session.subscribe_state(|state| println!("{state}"));

    session.connect("/dev/ttyUSB0")?;
    session.read_full_state()?;
    session.write_dimension(Dimension::Kilopascal)?;
    println!("Pressure: {}", session.read_pressure()?);
    session.disconnect()?;
    Ok(())
}
```
"#
)]

use crate::{
    error::{Error, Result},
    protocol as proto,
    subject::{Subject, SubscriptionId},
    transport::{Connector, Transport},
};
use log::{debug, info, warn};

/// Stateful client for a single sensor on a serial link.
///
/// The session is either disconnected or owns exactly one open transport.
/// Operations other than [`SensorSession::connect`] need a connection and
/// fail with [`Error::NotConnected`] without touching the link otherwise.
///
/// Calls are blocking and must not overlap; observers run on the caller's
/// thread while the triggering call is still in progress.
pub struct SensorSession<C: Connector> {
    connector: C,
    transport: Option<C::Transport>,
    connection: Subject<bool>,
    state: Subject<proto::Configuration>,
}

impl<C: Connector> SensorSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            transport: None,
            connection: Subject::new(false),
            state: Subject::new(proto::Configuration::default()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// The last published snapshot; invalid until the first successful read.
    pub fn state(&self) -> proto::Configuration {
        *self.state.latest()
    }

    /// Observes connection changes, starting with the current connection state.
    pub fn subscribe_connection<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&bool) + 'static,
    {
        self.connection.subscribe(observer)
    }

    pub fn unsubscribe_connection(&mut self, id: SubscriptionId) -> bool {
        self.connection.unsubscribe(id)
    }

    /// Observes published snapshots, starting with the current one.
    pub fn subscribe_state<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&proto::Configuration) + 'static,
    {
        self.state.subscribe(observer)
    }

    pub fn unsubscribe_state(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Opens `port` and checks that a sensor answers on it.
    ///
    /// On an identity mismatch the transport is closed again and the session
    /// stays disconnected.
    pub fn connect(&mut self, port: &str) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }
        let mut transport = self.connector.open(port)?;
        let words =
            transport.read_holding_registers(proto::IDENTITY_REG_ADDR, proto::IDENTITY_REG_QUAN)?;
        if let Err(err) = proto::check_identity(&words) {
            warn!("Device on {port} rejected: {err}");
            return Err(err.into());
        }
        self.transport = Some(transport);
        info!("Connected to sensor on {port}");
        self.connection.emit(true);
        Ok(())
    }

    /// Releases the transport.
    pub fn disconnect(&mut self) -> Result<()> {
        if self.transport.take().is_none() {
            return Err(Error::NotConnected);
        }
        info!("Disconnected from sensor");
        self.connection.emit(false);
        Ok(())
    }

    fn transport(&mut self) -> Result<&mut C::Transport> {
        self.transport.as_mut().ok_or(Error::NotConnected)
    }

    /// Helper function to read holding registers and decode them into a specific type.
    fn read_and_decode<T, F>(&mut self, address: u16, quantity: u16, decoder: F) -> Result<T>
    where
        F: FnOnce(&[u16]) -> std::result::Result<T, proto::Error>,
    {
        debug!("Reading {quantity} register(s) at {address:#06x}");
        let words = self.transport()?.read_holding_registers(address, quantity)?;
        Ok(decoder(&words)?)
    }

    fn write_registers(&mut self, address: u16, values: &[u16]) -> Result<()> {
        debug!("Writing {values:04x?} at {address:#06x}");
        Ok(self.transport()?.write_multiple_registers(address, values)?)
    }

    /// Reads and decodes the whole configuration block.
    ///
    /// A snapshot is only published when every field decodes; otherwise the
    /// previous snapshot stays in place.
    pub fn read_full_state(&mut self) -> Result<proto::Configuration> {
        let configuration = self.read_and_decode(
            proto::Configuration::ADDRESS,
            proto::Configuration::QUANTITY,
            proto::Configuration::decode_from_holding_registers,
        )?;
        self.state.emit(configuration);
        Ok(configuration)
    }

    /// Changes the output dimension and re-reads the configuration.
    ///
    /// The range index sharing the register is written back unchanged.
    pub fn write_dimension(&mut self, dimension: proto::Dimension) -> Result<proto::Configuration> {
        let current = self.read_raw_register(proto::RANGE_DIMENSION_REG_ADDR)?;
        let modified = proto::replace_low_byte(current, dimension.code());
        info!("Setting output dimension to {dimension}");
        self.write_registers(proto::RANGE_DIMENSION_REG_ADDR, &[modified])?;
        self.read_full_state()
    }

    /// Sends the soft restart command. The device is not read back.
    pub fn restart(&mut self) -> Result<()> {
        info!("Restarting sensor");
        self.write_registers(proto::RESTART_REG_ADDR, &[proto::RESTART_REG_DATA])
    }

    pub fn read_raw_register(&mut self, address: u16) -> Result<u16> {
        self.read_and_decode(address, 1, |words| match words.first() {
            Some(word) => Ok(*word),
            None => Err(proto::Error::RegisterCount {
                expected: 1,
                actual: 0,
            }),
        })
    }

    pub fn write_raw_register(&mut self, address: u16, value: u16) -> Result<()> {
        self.write_registers(address, &[value])
    }

    /// Reads the live pressure value.
    pub fn read_pressure(&mut self) -> Result<proto::Pressure> {
        self.read_and_decode(
            proto::Pressure::ADDRESS,
            proto::Pressure::QUANTITY,
            proto::Pressure::decode_from_holding_registers,
        )
    }
}
