//! AQI Forecaster - PM2.5 forecasting CLI and HTTP service
//!
//! # Usage
//!
//! ```bash
//! # 24-hour forecast from a JSON history
//! aqi-forecaster forecast --input history.json
//!
//! # Three-day forecast from stdin, reproducible noise, JSON output
//! cat history.json | aqi-forecaster extended --stdin --days 3 --seed 7 --json
//!
//! # Average PM2.5 per hour of day in a history
//! aqi-forecaster profile --input history.json
//!
//! # AQI for a single concentration
//! aqi-forecaster aqi --pm25 42.0
//!
//! # HTTP service
//! aqi-forecaster serve --addr 127.0.0.1:8080
//! ```
//!
//! # Environment Variables
//!
//! - `AQI_FORECASTER_CONFIG`: Path to the TOML config (default: ./forecaster.toml)
//! - `AQI_FORECASTER_CORS_ORIGINS`: Comma-separated CORS origins for `serve`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use aqi_forecaster::acquisition::{load_observations, read_observations};
use aqi_forecaster::advisory::HealthAdvisory;
use aqi_forecaster::api::{create_app, ApiState};
use aqi_forecaster::aqi::{pm25_category, pm25_to_aqi, AqiCategory};
use aqi_forecaster::config::ForecasterConfig;
use aqi_forecaster::forecast::{
    daily_summaries, extended_forecast, hourly_averages, pattern_forecast, DailySummary, ForecastStats, GruPredictor,
    SeededNoise,
};
use aqi_forecaster::types::{ForecastPoint, Observation};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "aqi-forecaster")]
#[command(about = "PM2.5 forecasting and AQI classification")]
#[command(version)]
struct CliArgs {
    /// Path to a forecaster TOML file (overrides AQI_FORECASTER_CONFIG and ./forecaster.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the network weights (overrides [model].seed)
    #[arg(long, global = true)]
    model_seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON file with observations (array or one object per line)
    #[arg(long, value_name = "FILE", required_unless_present = "stdin", conflicts_with = "stdin")]
    input: Option<PathBuf>,

    /// Read observations from stdin
    #[arg(long)]
    stdin: bool,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Hour-by-hour forecast with the recurrent predictor
    Forecast {
        #[command(flatten)]
        input: InputArgs,
        /// Forecast horizon in hours (default: [forecast].horizon_hours)
        #[arg(long)]
        hours: Option<usize>,
        /// Seed for forecast noise
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Multi-day forecast on a rolling window, with daily summaries
    Extended {
        #[command(flatten)]
        input: InputArgs,
        /// Number of days (default: [forecast].extended_days)
        #[arg(long)]
        days: Option<usize>,
        /// Seed for forecast noise
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Pattern forecast without the recurrent network
    Baseline {
        #[command(flatten)]
        input: InputArgs,
        /// Forecast horizon in hours (default: [forecast].horizon_hours)
        #[arg(long)]
        hours: Option<usize>,
        /// Seed for forecast noise
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Average PM2.5 per hour of day across the input history
    Profile {
        #[command(flatten)]
        input: InputArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// AQI and category for a PM2.5 concentration
    Aqi {
        /// Concentration in µg/m³
        #[arg(long)]
        pm25: f64,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe the predictor architecture
    Summary {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the effective configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(long)]
        print: bool,
    },

    /// Run the HTTP service
    Serve {
        /// Override the server address (default: [server].addr)
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },
}

// ============================================================================
// Output types
// ============================================================================

#[derive(Serialize)]
struct ForecastOutput {
    points: Vec<ForecastPoint>,
    stats: Option<ForecastStats>,
    advisory: HealthAdvisory,
}

#[derive(Serialize)]
struct ExtendedOutput {
    points: Vec<ForecastPoint>,
    days: Vec<DailySummary>,
    stats: Option<ForecastStats>,
    hourly_profile: [f64; 24],
}

#[derive(Serialize)]
struct ProfileEntry {
    hour: usize,
    pm25: f64,
    aqi: u32,
}

#[derive(Serialize)]
struct AqiOutput {
    pm25: f64,
    aqi: u32,
    category: AqiCategory,
    label: &'static str,
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout stays clean for forecast output
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &CliArgs) -> Result<ForecasterConfig> {
    let mut config = match &args.config {
        Some(path) => ForecasterConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ForecasterConfig::load(),
    };
    if args.model_seed.is_some() {
        config.model.seed = args.model_seed;
    }
    Ok(config)
}

fn read_input(input: &InputArgs) -> Result<Vec<Observation>> {
    let observations = match &input.input {
        Some(path) => load_observations(path)?,
        None => read_observations(std::io::stdin().lock()).context("Failed to read observations from stdin")?,
    };
    anyhow::ensure!(!observations.is_empty(), "No observations in input");
    Ok(observations)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_points(points: &[ForecastPoint]) {
    println!("{:<20} {:>8} {:>5}  Category", "Time (UTC)", "PM2.5", "AQI");
    for p in points {
        println!(
            "{:<20} {:>8.1} {:>5}  {}",
            p.timestamp.format("%Y-%m-%d %H:%M"),
            p.pm25,
            p.aqi,
            p.category
        );
    }
}

fn print_stats(stats: Option<&ForecastStats>) {
    if let Some(s) = stats {
        println!();
        println!("Average {:.1} µg/m³ | Peak {:.1} | Minimum {:.1}", s.average, s.peak, s.minimum);
    }
}

fn print_advisory(advisory: &HealthAdvisory) {
    println!();
    println!(
        "Current AQI {} ({}) | Forecast average AQI {} ({})",
        advisory.current_aqi, advisory.current_category, advisory.forecast_average_aqi, advisory.forecast_category
    );
    println!("Recommended actions:");
    for action in &advisory.recommended_actions {
        println!("  - {action}");
    }
    println!("Vulnerable groups: {}", advisory.vulnerable_groups.join(", "));
}

fn forecast_output(history: &[Observation], points: Vec<ForecastPoint>) -> ForecastOutput {
    let values: Vec<f64> = points.iter().map(|p| p.pm25).collect();
    let aqis: Vec<u32> = points.iter().map(|p| p.aqi).collect();
    let current = history.last().map_or(0, |o| pm25_to_aqi(o.pm25));
    ForecastOutput {
        stats: ForecastStats::from_values(&values),
        advisory: HealthAdvisory::assess(current, &aqis),
        points,
    }
}

fn emit_forecast(output: &ForecastOutput, json: bool) -> Result<()> {
    if json {
        return print_json(output);
    }
    print_points(&output.points);
    print_stats(output.stats.as_ref());
    print_advisory(&output.advisory);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn run_server(config: ForecasterConfig, addr: Option<String>) -> Result<()> {
    let server_addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let predictor = GruPredictor::new(&config)?;
    info!(seed = predictor.seed(), "Predictor ready");

    let app = create_app(ApiState::new(predictor, config));
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;

    info!("HTTP server listening on {}", server_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;

    match args.command {
        SubCommand::Forecast { input, hours, seed, json } => {
            let history = read_input(&input)?;
            let predictor = GruPredictor::new(&config)?;
            let hours = hours.unwrap_or(config.forecast.horizon_hours);
            let points = predictor.forecast_points(&history, hours, &mut SeededNoise::new(seed))?;
            emit_forecast(&forecast_output(&history, points), json)?;
        }

        SubCommand::Extended { input, days, seed, json } => {
            let history = read_input(&input)?;
            let predictor = GruPredictor::new(&config)?;
            let days = days.unwrap_or(config.forecast.extended_days);
            let points = extended_forecast(&predictor, &history, days, &mut SeededNoise::new(seed))?;
            let values: Vec<f64> = points.iter().map(|p| p.pm25).collect();
            let output = ExtendedOutput {
                days: daily_summaries(&points),
                stats: ForecastStats::from_values(&values),
                hourly_profile: hourly_averages(&history),
                points,
            };

            if json {
                print_json(&output)?;
            } else {
                println!("{:<4} {:<10} {:>8} {:>8} {:>8} {:>5}  Category", "Day", "Date", "Avg", "Min", "Max", "AQI");
                for d in &output.days {
                    println!(
                        "{:<4} {:<10} {:>8.1} {:>8.1} {:>8.1} {:>5}  {}",
                        d.day + 1,
                        d.date,
                        d.average_pm25,
                        d.min_pm25,
                        d.max_pm25,
                        d.average_aqi,
                        d.category
                    );
                }
                print_stats(output.stats.as_ref());
            }
        }

        SubCommand::Baseline { input, hours, seed, json } => {
            let history = read_input(&input)?;
            let hours = hours.unwrap_or(config.forecast.horizon_hours);
            let points = pattern_forecast(
                &history,
                hours,
                &config.model,
                &config.corrections,
                &mut SeededNoise::new(seed),
            )?;
            emit_forecast(&forecast_output(&history, points), json)?;
        }

        SubCommand::Profile { input, json } => {
            let history = read_input(&input)?;
            // Hours with no readings average to 0 and are left out
            let entries: Vec<ProfileEntry> = hourly_averages(&history)
                .iter()
                .enumerate()
                .filter(|&(_, &pm25)| pm25 > 0.0)
                .map(|(hour, &pm25)| ProfileEntry { hour, pm25, aqi: pm25_to_aqi(pm25) })
                .collect();

            if json {
                print_json(&entries)?;
            } else {
                println!("{:<6} {:>8} {:>5}", "Hour", "PM2.5", "AQI");
                for e in &entries {
                    println!("{:02}:00  {:>8.1} {:>5}", e.hour, e.pm25, e.aqi);
                }
            }
        }

        SubCommand::Aqi { pm25, json } => {
            anyhow::ensure!(pm25.is_finite() && pm25 >= 0.0, "pm25 must be a non-negative number, got {pm25}");
            let aqi = pm25_to_aqi(pm25);
            let category = pm25_category(pm25);
            if json {
                print_json(&AqiOutput { pm25, aqi, category, label: category.label() })?;
            } else {
                println!("PM2.5 {pm25:.1} µg/m³ → AQI {aqi} ({category})");
            }
        }

        SubCommand::Summary { json } => {
            let summary = GruPredictor::new(&config)?.summary();
            if json {
                print_json(&summary)?;
            } else {
                println!("{} ({} parameters, seed {})", summary.architecture, summary.parameters, summary.seed);
                for layer in &summary.layers {
                    println!("  {layer}");
                }
                println!("  Trained: {}", if summary.trained { "yes" } else { "no (random weights)" });
            }
        }

        SubCommand::Config { print } => {
            config.validate()?;
            if print {
                print!("{}", config.to_toml()?);
            } else {
                println!("Configuration OK");
            }
        }

        SubCommand::Serve { addr } => {
            run_server(config, addr).await?;
        }
    }

    Ok(())
}
