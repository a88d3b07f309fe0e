//! Pressure Sensor Configurator CLI
//!
//! A command-line interface (CLI) application for configuring pressure
//! transducers over Modbus RTU (serial).
//!
//! This tool allows users to:
//! - List the serial ports of this machine.
//! - Connect to a sensor, verifying that the device really is one.
//! - Read and display the complete sensor configuration.
//! - Change the output dimension (physical unit) of the sensor.
//! - Read the current pressure, once or continuously.
//! - Restart the sensor.
//! - Read and write raw holding registers for diagnostics.
//!
//! The CLI leverages the `ptconf_lib` crate for protocol definitions and the sensor session.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use flexi_logger::{Logger, LoggerHandle};
use log::*;
use ptconf_lib::{protocol as proto, session::SensorSession, transport::RtuConnector};
use std::{panic, time::Duration};

mod commandline;

fn logging_init(loglevel: LevelFilter) -> LoggerHandle {
    let log_handle = Logger::try_with_env_or_str(loglevel.as_str())
        .expect("Cannot init logging")
        .start()
        .expect("Cannot start logging");

    panic::set_hook(Box::new(|panic_info| {
        let (filename, line, column) = panic_info
            .location()
            .map(|loc| (loc.file(), loc.line(), loc.column()))
            .unwrap_or(("<unknown_file>", 0, 0));

        let cause_str = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            *s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "<unknown_panic_cause>"
        };

        error!(
            target: "panic",
            "Thread '{}' panicked at '{}': {}:{} - Cause: {}",
            std::thread::current().name().unwrap_or("<unnamed>"),
            filename,
            line,
            column,
            cause_str
        );
    }));
    log_handle
}

/// Calculates the minimum recommended delay for Modbus RTU based on baud rate.
/// This is typically 3.5 character times.
fn minimum_rtu_delay(baud_rate: &proto::ExchangeRate) -> Duration {
    // 1 start bit + 8 data bits + 1 parity bit + 1 stop bit
    let bits_per_char = 11.0;
    let rate = baud_rate.as_baud() as f64;

    let char_time_secs = bits_per_char / rate;
    let inter_frame_delay_secs = 3.5 * char_time_secs;
    let delay_micros = (inter_frame_delay_secs * 1_000_000.0) as u64;

    // Modbus fixes the silent interval at 1.75ms above 19200 baud.
    const PRACTICAL_MIN_INTER_FRAME_DELAY_MICROS: u64 = 1_750;
    Duration::from_micros(delay_micros.max(PRACTICAL_MIN_INTER_FRAME_DELAY_MICROS))
}

/// Checks if the user-provided RTU delay is sufficient; if not, uses the calculated minimum.
fn check_rtu_delay(user_delay: Duration, baud_rate: &proto::ExchangeRate) -> Duration {
    let min_rtu_delay = minimum_rtu_delay(baud_rate);
    if user_delay < min_rtu_delay {
        warn!(
            "User-defined RTU delay of {user_delay:?} is below the recommended minimum of {min_rtu_delay:?} at {baud_rate}. Using minimum."
        );
        min_rtu_delay
    } else {
        user_delay
    }
}

fn handle_list_ports() -> Result<()> {
    let ports = ptconf_lib::transport::available_ports().context("Cannot enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found.");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

/// Opens the serial port and verifies that a sensor is attached.
fn create_session(
    device: &str,
    baud_rate: &proto::ExchangeRate,
    timeout: Duration,
) -> Result<SensorSession<RtuConnector>> {
    let mut session = SensorSession::new(RtuConnector::new(*baud_rate).with_timeout(timeout));
    session.subscribe_connection(|connected| debug!("Connection state changed: {connected}"));
    info!("Attempting to connect via RTU to device {device} at {baud_rate}...");
    session
        .connect(device)
        .with_context(|| format!("Cannot connect to a sensor on {device}"))?;
    Ok(session)
}

/// Handles the restart command.
///
/// The sensor may reboot before it answers, so a timeout is not treated as a failure.
fn handle_restart(session: &mut SensorSession<RtuConnector>) -> Result<()> {
    if !Confirm::new()
        .with_prompt("Are you sure you want to restart the sensor?")
        .default(false)
        .show_default(true)
        .interact()?
    {
        info!("Restart aborted by user.");
        return Ok(());
    }

    info!("Sending restart command...");
    match session.restart() {
        Ok(()) => {}
        Err(ptconf_lib::Error::Transport(error)) if error.is_timeout() => {
            debug!("Restart returned TimeOut error, can be ignored");
        }
        Err(error) => return Err(error).context("Failed to restart the sensor"),
    }
    println!("Restart command sent successfully.");
    Ok(())
}

fn print_configuration(configuration: &proto::Configuration, yaml: bool) -> Result<()> {
    if yaml {
        print!(
            "{}",
            serde_yaml::to_string(configuration).context("Cannot serialize configuration")?
        );
    } else {
        println!("{configuration}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = commandline::CliArgs::parse();

    // 1. Initialize logging as early as possible
    let _log_handle = logging_init(args.verbose.log_level_filter());
    info!(
        "Pressure sensor CLI started. Log level: {}",
        args.verbose.log_level_filter()
    );

    let (device, baud_rate, command) = match &args.connection {
        commandline::CliConnection::ListPorts => return handle_list_ports(),
        commandline::CliConnection::Rtu {
            device,
            baud_rate,
            command,
        } => (device, baud_rate, command),
    };

    // 2. Connect and verify the sensor
    let delay = check_rtu_delay(args.delay, baud_rate);
    let mut session = create_session(device, baud_rate, args.timeout)?;
    std::thread::sleep(delay);

    // 3. Execute the command
    match command {
        commandline::CliCommands::Read { yaml } => {
            info!("Executing: Read Configuration");
            let configuration = session
                .read_full_state()
                .with_context(|| "Cannot read sensor configuration")?;
            print_configuration(&configuration, *yaml)?;
        }
        commandline::CliCommands::ReadPressure => {
            info!("Executing: Read Pressure");
            let pressure = session
                .read_pressure()
                .with_context(|| "Cannot read pressure")?;
            println!("Pressure: {pressure}");
        }
        commandline::CliCommands::Monitor { poll_interval } => {
            info!("Starting monitor mode: interval={poll_interval:?}");
            let configuration = session
                .read_full_state()
                .with_context(|| "Cannot read sensor configuration")?;
            loop {
                std::thread::sleep(delay.max(*poll_interval));
                debug!("Monitor: Reading pressure...");
                let pressure = session
                    .read_pressure()
                    .with_context(|| "Cannot read pressure")?;
                println!("Pressure: {pressure} {}", configuration.dimension);
            }
        }
        commandline::CliCommands::SetDimension { dimension } => {
            info!("Executing: Set Dimension to {dimension}");
            let configuration = session
                .write_dimension(*dimension)
                .with_context(|| format!("Failed to set dimension to {dimension}"))?;
            if configuration.dimension != *dimension {
                bail!(
                    "Sensor reports dimension {} after writing {dimension}",
                    configuration.dimension
                );
            }
            println!("Output dimension set to {dimension} successfully.");
        }
        commandline::CliCommands::Restart => {
            handle_restart(&mut session)?;
        }
        commandline::CliCommands::ReadRegister { address } => {
            info!("Executing: Read Register {address:#06x}");
            let value = session
                .read_raw_register(*address)
                .with_context(|| format!("Cannot read register {address:#06x}"))?;
            println!("Register {address:#06x}: {value} ({value:#06x})");
        }
        commandline::CliCommands::WriteRegister { address, value } => {
            info!("Executing: Write Register {address:#06x} = {value:#06x}");
            session
                .write_raw_register(*address, *value)
                .with_context(|| format!("Failed to write register {address:#06x}"))?;
            println!("Register {address:#06x} set to {value:#06x} successfully.");
        }
    }

    session.disconnect()?;
    Ok(())
}
