//! Command-line interface for efficient-frontier.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use efficient_frontier::config::SessionConfig;
use efficient_frontier::data::load_returns;
use efficient_frontier::error::{FrontierError, Result};
use efficient_frontier::report::{export, plot, table};
use efficient_frontier::session::{RunRequest, Session};

/// Mean-variance portfolio optimization on historical returns.
#[derive(Parser)]
#[command(name = "efficient-frontier")]
#[command(version)]
#[command(about = "Efficient frontiers and target portfolios from historical returns")]
#[command(long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the frontier and match targets
    Run {
        /// Session configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Return table (CSV); overrides the config file
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Benchmark index column (repeatable); overrides the config file
        #[arg(short, long = "benchmark")]
        benchmarks: Vec<String>,

        /// Number of frontier portfolios
        #[arg(short = 'k', long)]
        num_portfolios: Option<usize>,

        /// Target return
        #[arg(long)]
        target_return: Option<f64>,

        /// Target risk (standard deviation, same units as returns)
        #[arg(long)]
        target_risk: Option<f64>,

        /// Write `portfolio,return,risk` rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full report to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write an HTML plot to this file
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Prompt for the number of portfolios and the targets
        #[arg(short, long)]
        interactive: bool,
    },

    /// Write a configuration file with every default spelled out
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            data,
            benchmarks,
            num_portfolios,
            target_return,
            target_risk,
            csv,
            json,
            plot: plot_path,
            interactive,
        } => {
            let mut config = match config {
                Some(path) => SessionConfig::from_file(path)?,
                None => SessionConfig::default(),
            };

            // Flags override the file.
            if data.is_some() {
                config.data.path = data;
            }
            if !benchmarks.is_empty() {
                config.data.table.benchmarks = benchmarks;
            }
            if let Some(k) = num_portfolios {
                config.frontier.num_portfolios = k;
            }
            if target_return.is_some() {
                config.targets.target_return = target_return;
            }
            if target_risk.is_some() {
                config.targets.target_risk = target_risk;
            }
            if csv.is_some() {
                config.output.csv = csv;
            }
            if json.is_some() {
                config.output.json = json;
            }
            if plot_path.is_some() {
                config.output.plot = plot_path;
            }
            config.validate()?;

            let path = config.data.path.clone().ok_or_else(|| {
                FrontierError::InvalidParameter("no return data given (use --data)".into())
            })?;
            let returns = load_returns(&path, &config.data.table)?;
            let session = Session::from_table(returns, &config)?;

            let mut request = RunRequest::from_config(&config);
            if interactive {
                prompt_request(&mut request)?;
            }
            info!(?request, "running session");
            let report = session.run(&request)?;

            match cli.output {
                OutputFormat::Text => table::print_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }

            if let Some(path) = &config.output.csv {
                export::export_csv(&report, path)?;
            }
            if let Some(path) = &config.output.json {
                export::export_json(&report, path)?;
            }
            if let Some(path) = &config.output.plot {
                plot::write_plot(&report, path)?;
            }
            Ok(())
        }

        Commands::InitConfig { path } => {
            SessionConfig::default().save(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

/// Ask for the run parameters on stdin; an empty answer keeps the current value.
fn prompt_request(request: &mut RunRequest) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let answer = prompt::<usize>(
            &mut lines,
            "Number of frontier portfolios",
            Some(request.num_portfolios),
        )?;
        match answer {
            Some(0) => eprintln!("Please enter a number of at least 1."),
            Some(k) => {
                request.num_portfolios = k;
                break;
            }
            None => break,
        }
    }
    if let Some(r) = prompt::<f64>(&mut lines, "Target return", request.target_return)? {
        request.target_return = Some(r);
    }
    if let Some(s) = prompt::<f64>(&mut lines, "Target risk", request.target_risk)? {
        request.target_risk = Some(s);
    }
    Ok(())
}

fn prompt<T>(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    question: &str,
    current: Option<T>,
) -> Result<Option<T>>
where
    T: FromStr + std::fmt::Display + Copy,
{
    loop {
        match current {
            Some(v) => print!("{} [{}]: ", question, v),
            None => print!("{}: ", question),
        }
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(None),
        };
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<T>() {
            Ok(v) => return Ok(Some(v)),
            Err(_) => eprintln!("Could not parse '{}', try again.", answer),
        }
    }
}
