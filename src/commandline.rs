use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use ptconf_lib::protocol as proto;
use std::time::Duration;

fn default_device_name() -> String {
    if cfg!(target_os = "windows") {
        String::from("COM1")
    } else {
        String::from("/dev/ttyUSB0")
    }
}

fn parse_register(s: &str) -> Result<u16, String> {
    clap_num::maybe_hex::<u16>(s).map_err(|e| format!("Invalid register address format: {e}"))
}

fn parse_register_value(s: &str) -> Result<u16, String> {
    clap_num::maybe_hex::<u16>(s).map_err(|e| format!("Invalid register value format: {e}"))
}

fn parse_dimension(s: &str) -> Result<proto::Dimension, String> {
    s.parse::<proto::Dimension>().map_err(|e| e.to_string())
}

fn parse_baud_rate(s: &str) -> Result<proto::ExchangeRate, String> {
    // Accepts the "9600 baud" label printed for the default as well.
    let rate_val = s
        .trim()
        .trim_end_matches("baud")
        .trim_end()
        .parse::<u32>()
        .map_err(|e| format!("Invalid baud rate number format: {e}"))?;
    proto::ExchangeRate::try_from(rate_val).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliConnection {
    /// List the serial ports available on this machine.
    ListPorts,
    /// Connect to a pressure sensor via Modbus RTU (Serial).
    Rtu {
        /// Serial port device name.
        /// Examples: "/dev/ttyUSB0" (Linux), "COM3" (Windows).
        #[arg(short, long, default_value_t = default_device_name())]
        device: String,

        /// Baud rate for serial communication.
        /// Must match the exchange rate configured in the sensor.
        /// Supported values: 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200.
        #[arg(long, default_value_t = proto::ExchangeRate::default(), value_parser = parse_baud_rate, verbatim_doc_comment)]
        baud_rate: proto::ExchangeRate,

        /// RTU-specific commands for the connected sensor.
        #[command(subcommand)]
        command: CliCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommands {
    /// Read and display the complete sensor configuration.
    Read {
        /// Print the configuration as YAML.
        #[arg(long)]
        yaml: bool,
    },

    /// Read and display the current pressure.
    ReadPressure,

    /// Continuously read the pressure and print it to the console.
    Monitor {
        /// Interval for reading the pressure (e.g., "500ms", "2s")
        #[arg(value_parser = humantime::parse_duration, short, long, default_value = "1s")]
        poll_interval: Duration,
    },

    /// Set the physical unit of the pressure output.
    /// The range index stored in the same register is left unchanged.
    #[clap(verbatim_doc_comment)]
    SetDimension {
        /// One of: percent, pa, kpa, mpa, kgf/cm2, kgf/m2.
        #[arg(value_parser = parse_dimension)]
        dimension: proto::Dimension,
    },

    /// Restart the sensor.
    /// The sensor may not answer this command before it reboots.
    #[clap(verbatim_doc_comment)]
    Restart,

    /// Read a single holding register.
    ReadRegister {
        /// Register address, decimal or hexadecimal (e.g., "32" or "0x20").
        #[arg(value_parser = parse_register)]
        address: u16,
    },

    /// Write a single holding register.
    /// **Warning:** No sanity checks are applied to the address or the value.
    #[clap(verbatim_doc_comment)]
    WriteRegister {
        /// Register address, decimal or hexadecimal (e.g., "31" or "0x1F").
        #[arg(value_parser = parse_register)]
        address: u16,
        /// Register value, decimal or hexadecimal (e.g., "90" or "0x5A").
        #[arg(value_parser = parse_register_value)]
        value: u16,
    },
}

const fn about_text() -> &'static str {
    "Pressure sensor configurator CLI - Read and change pressure transducer settings via Modbus RTU."
}

#[derive(Parser, Debug)]
#[command(name="ptconf", author, version, about=about_text(), long_about = None, propagate_version = true)]
pub struct CliArgs {
    /// Configure verbosity of logging output.
    /// -v for info, -vv for debug, -vvv for trace. Default is off.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// Specifies the connection method and device-specific commands.
    #[command(subcommand)]
    pub connection: CliConnection,

    /// Modbus response timeout for read/write operations.
    /// Examples: "1s", "500ms".
    #[arg(global = true, long, default_value = "1000ms", value_parser = humantime::parse_duration, verbatim_doc_comment)]
    pub timeout: Duration,

    /// Minimum delay between multiple Modbus commands sent to the sensor.
    /// Important for Modbus RTU, especially with USB-to-RS485 converters that need time
    /// to switch between transmitting (TX) and receiving (RX) modes.
    /// Examples: "50ms", "100ms".
    #[arg(global = true, long, default_value = "50ms", value_parser = humantime::parse_duration, verbatim_doc_comment)]
    pub delay: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values() {
        assert_eq!(parse_register("0x20"), Ok(0x20));
        assert_eq!(parse_register("39"), Ok(39));
        assert!(parse_register("0x10000").is_err());
        assert_eq!(parse_register_value("0x5A"), Ok(0x5A));
        assert_eq!(parse_dimension("kpa"), Ok(proto::Dimension::Kilopascal));
        assert!(parse_dimension("psi").is_err());
        assert_eq!(parse_baud_rate("57600"), Ok(proto::ExchangeRate::B57600));
        assert_eq!(parse_baud_rate("9600 baud"), Ok(proto::ExchangeRate::B9600));
        assert!(parse_baud_rate("300").is_err());
    }

    #[test]
    fn parse_command_line() {
        let args = CliArgs::try_parse_from([
            "ptconf",
            "rtu",
            "--device",
            "/dev/ttyUSB1",
            "--baud-rate",
            "19200",
            "set-dimension",
            "MPa",
        ])
        .unwrap();
        assert_eq!(args.timeout, Duration::from_millis(1000));
        assert_eq!(
            args.connection,
            CliConnection::Rtu {
                device: String::from("/dev/ttyUSB1"),
                baud_rate: proto::ExchangeRate::B19200,
                command: CliCommands::SetDimension {
                    dimension: proto::Dimension::Megapascal
                },
            }
        );

        let args = CliArgs::try_parse_from(["ptconf", "rtu", "read"]).unwrap();
        assert_eq!(
            args.connection,
            CliConnection::Rtu {
                device: default_device_name(),
                baud_rate: proto::ExchangeRate::B9600,
                command: CliCommands::Read { yaml: false },
            }
        );

        let args = CliArgs::try_parse_from(["ptconf", "list-ports"]).unwrap();
        assert_eq!(args.connection, CliConnection::ListPorts);
    }
}
