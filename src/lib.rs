//! A library for configuring Modbus RTU pressure transducers.
//!
//! The sensor keeps its settings in a small block of holding registers,
//! several of them packing two byte-wide fields into one register. This
//! crate maps that register space onto typed values and offers a stateful
//! session to read and change them.
//!
//! ## Features
//!
//! - **Protocol Implementation**: register map, byte/float codec and exact
//!   code tables for every coded setting, see [`protocol`].
//! - **Sensor Session**: connection lifecycle with device identity check,
//!   configuration snapshots and change notifications, see [`session`].
//! - **Pluggable Transport**: the session runs on any [`transport::Transport`];
//!   the `rtu-sync` feature provides one based on `tokio-modbus`.
#![cfg_attr(
    feature = "rtu-sync",
    doc = r#"
## Quick Start

```no_run
use ptconf_lib::{session::SensorSession, transport::RtuConnector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = SensorSession::new(RtuConnector::default());
    session.connect("/dev/ttyUSB0")?;

    let configuration = session.read_full_state()?;
    println!("{configuration}");

    Ok(())
}
```
"#
)]

pub mod error;
pub mod protocol;
pub mod session;
pub mod subject;
pub mod transport;

pub use error::{Error, Result};
