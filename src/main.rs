// Command-line entry point for rectrace.

use clap::Parser;
use rectrace::application::catalog::Demo;
use rectrace::application::{OutputFormat, VisualizeUsecase};
use rectrace::domain::tracer::TracerConfig;
use rectrace::infrastructure::config_loader::load_config;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recursive function to trace (fib, factorial, binomial, power-set, climb)
    demo: String,

    /// Arguments of the top-level call
    args: Vec<u64>,

    /// Log every finished call
    #[arg(short, long)]
    verbose: bool,

    /// Trace only; skip rendering
    #[arg(long)]
    no_animate: bool,

    /// Also save the HTML animation
    #[arg(long)]
    save: bool,

    /// Where --save writes the animation
    #[arg(long)]
    save_path: Option<String>,

    /// Output file path for dot/json/html
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (text, dot, json, html)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// TOML file with tracer options; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print every call and return in text mode
    #[arg(long)]
    steps: bool,

    /// Argument indices shown on node labels, e.g. 0,2
    #[arg(long, value_delimiter = ',')]
    display_args: Option<Vec<usize>>,
}

fn build_config(cli: &Cli) -> anyhow::Result<TracerConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TracerConfig::default(),
    };
    config.verbose |= cli.verbose;
    config.save |= cli.save;
    if cli.no_animate {
        config.animate = false;
    }
    if let Some(path) = &cli.save_path {
        config.path = path.clone();
    }
    if cli.display_args.is_some() {
        config.display_args = cli.display_args.clone();
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let Some(demo) = Demo::from_name(&cli.demo) else {
        let names: Vec<&str> = Demo::ALL.iter().map(|d| d.name()).collect();
        eprintln!("Error: unknown function '{}' (expected one of: {})", cli.demo, names.join(", "));
        std::process::exit(2);
    };
    let Some(format) = OutputFormat::from_name(&cli.format) else {
        eprintln!("Error: unknown format '{}' (expected text, dot, json or html)", cli.format);
        std::process::exit(2);
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let usecase = VisualizeUsecase {
        config,
        format,
        output: cli.output.clone(),
        steps: cli.steps,
    };

    match usecase.run(demo, &cli.args) {
        Ok(outcome) => {
            tracing::info!(
                function = %outcome.function,
                calls = outcome.calls,
                max_depth = outcome.max_depth,
                "Trace complete"
            );
            println!("{}({}) = {}", outcome.function, join_args(&cli.args), outcome.result);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn join_args(args: &[u64]) -> String {
    args.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
}
