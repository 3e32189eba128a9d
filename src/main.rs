use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use eyetrack::config::Config;
use eyetrack::notify::NotificationChannel;
use eyetrack::poller::{Poller, RequestParameters};
use eyetrack::soap::SoapClient;

#[derive(Parser)]
#[command(name = "eyetrack")]
#[command(about = "Live satellite position tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate { config: String },
    /// Poll the position service and print every update until interrupted
    Track {
        config: String,
        #[command(flatten)]
        overrides: RequestOverrides,
    },
    /// Serve the poller control API
    Serve { config: String },
}

/// Request parameters given on the command line take precedence over the config file.
#[derive(Args, Default)]
struct RequestOverrides {
    /// NORAD id of the satellite
    #[arg(long)]
    id: Option<String>,
    /// Caller IP sent to the service
    #[arg(long)]
    ip: Option<String>,
    /// Lookback window in seconds
    #[arg(long)]
    seconds: Option<u32>,
    /// Service license key
    #[arg(long)]
    key: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Track { config, overrides } => track(&config, overrides).await,
        Commands::Serve { config } => serve(&config).await,
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    println!("Configuration is valid");
    println!("  service: {} ({})", config.service.url, config.service.soap_action());
    println!(
        "  poller: every {} on '{}'",
        humantime::format_duration(config.poller.interval),
        config.poller.topic
    );
    match &config.request {
        Some(request) => println!("  request: platform {}", request.platform_id),
        None => println!("  request: none (supply --id/--ip/--seconds/--key)"),
    }
    println!("  web: {}", config.web.bind);
    ExitCode::SUCCESS
}

async fn track(path: &str, overrides: RequestOverrides) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let params = match resolve_parameters(config.request.clone(), overrides) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match SoapClient::new(config.service.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating SOAP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let channel = NotificationChannel::new(config.poller.subscriber_buffer);
    let mut poller = Poller::new(client, channel.clone(), config.poller.poller_config());
    channel.subscribe(&config.poller.topic, |record| {
        println!("{}\n", record);
    });

    let handle = match poller.start(params) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error starting poller: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Error waiting for Ctrl-C: {}", e);
    }

    handle.stop();
    handle.join().await;

    let status = handle.status();
    println!(
        "Tracking stopped after {} cycles ({} positions, {} failures)",
        status.cycles, status.publications, status.failures
    );
    ExitCode::SUCCESS
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    match eyetrack::web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_parameters(
    base: Option<RequestParameters>,
    overrides: RequestOverrides,
) -> Result<RequestParameters, String> {
    let missing = |name: &str| format!("missing request parameter '{}'", name);
    let base = base.as_ref();

    let params = RequestParameters {
        platform_id: overrides
            .id
            .or_else(|| base.map(|b| b.platform_id.clone()))
            .ok_or_else(|| missing("id"))?,
        caller_ip: overrides
            .ip
            .or_else(|| base.map(|b| b.caller_ip.clone()))
            .ok_or_else(|| missing("ip"))?,
        window_seconds: overrides
            .seconds
            .or_else(|| base.map(|b| b.window_seconds))
            .ok_or_else(|| missing("seconds"))?,
        license_key: overrides
            .key
            .or_else(|| base.map(|b| b.license_key.clone()))
            .ok_or_else(|| missing("key"))?,
    };

    params.validate().map_err(|e| e.to_string())?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let base = RequestParameters::new("27424", "10.0.0.5", 1, "ABC");
        let overrides = RequestOverrides {
            id: Some("25544".into()),
            seconds: Some(30),
            ..Default::default()
        };

        let params = resolve_parameters(Some(base), overrides).unwrap();
        assert_eq!(params, RequestParameters::new("25544", "10.0.0.5", 30, "ABC"));
    }

    #[test]
    fn test_overrides_alone_are_enough() {
        let overrides = RequestOverrides {
            id: Some("27424".into()),
            ip: Some("192.168.1.20".into()),
            seconds: Some(1),
            key: Some("ABC".into()),
        };
        assert!(resolve_parameters(None, overrides).is_ok());
    }

    #[test]
    fn test_missing_parameter_is_reported() {
        let overrides = RequestOverrides {
            id: Some("27424".into()),
            ..Default::default()
        };
        let err = resolve_parameters(None, overrides).unwrap_err();
        assert!(err.contains("'ip'"));
    }

    #[test]
    fn test_cli_parses_track_flags() {
        let cli = Cli::try_parse_from([
            "eyetrack", "track", "eyetrack.yaml", "--id", "27424", "--key", "ABC",
        ])
        .unwrap();

        match cli.command {
            Commands::Track { config, overrides } => {
                assert_eq!(config, "eyetrack.yaml");
                assert_eq!(overrides.id.as_deref(), Some("27424"));
                assert_eq!(overrides.key.as_deref(), Some("ABC"));
                assert!(overrides.ip.is_none());
            }
            _ => panic!("expected track command"),
        }
    }
}
