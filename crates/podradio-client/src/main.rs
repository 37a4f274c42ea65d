//! podradio-ctl entry point.

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use podradio_client::cli::{Cli, Command, ConfigAction};
use podradio_client::client::{Outcome, PodRadioClient};
use podradio_client::commands;
use podradio_client::config::{ClientConfig, TransportKind};
use podradio_client::error::ClientResult;
use podradio_client::transport::{Connector, TcpConnector};
use podradio_core::{TracingConfig, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let loaded = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);

    // Initialize tracing
    let tracing_config = if config.debug {
        TracingConfig::verbose()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(&cli, &config) {
        Ok(Outcome::Completed(value)) => {
            print_value(&value);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Refused(refusal)) => {
            eprintln!("error: {}", refusal);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_value(value: &Value) {
    if value.is_null() {
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<Outcome<Value>> {
    if let Command::Config { ref action } = cli.command {
        match action {
            ConfigAction::Dump => commands::config::dump(config)?,
            ConfigAction::Path => commands::config::path()?,
        }
        return Ok(Outcome::Completed(Value::Null));
    }

    match config.connection.transport {
        TransportKind::Tcp => remote(cli, config, TcpConnector::new()),
        #[cfg(target_os = "linux")]
        TransportKind::Rfcomm => remote(cli, config, podradio_client::RfcommConnector::new()),
        #[cfg(not(target_os = "linux"))]
        TransportKind::Rfcomm => Err(podradio_client::ClientError::Config(
            "the rfcomm transport is only available on Linux".into(),
        )),
    }
}

fn remote<C: Connector>(
    cli: &Cli,
    config: &ClientConfig,
    connector: C,
) -> ClientResult<Outcome<Value>> {
    let mut client = PodRadioClient::new(config.resolver(), connector, config.session_options());
    client.connect(cli.address.as_deref())?;
    let outcome = commands::remote::run(&mut client, &cli.command);
    client.disconnect();
    outcome
}
