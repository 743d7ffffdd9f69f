mod config;
#[cfg(feature = "web")]
mod page;
#[cfg(feature = "web")]
mod web;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use numplot_core::{analyze, parse_samples, Outcome, PlotStore};
use numplot_store::{legend, PngStore};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "numplot",
    version,
    about = "Interpolate, fit, differentiate or minimise a list of numbers and plot the result"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web form
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for generated images
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },

    /// Analyze numbers once and write the plot
    Run {
        /// Method: interpolation, fit, derivative or minimum
        #[arg(short, long)]
        method: String,

        /// Comma-separated numbers
        #[arg(short, long)]
        data: String,

        /// Directory for the generated image
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Skip writing the image
        #[arg(long)]
        no_plot: bool,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List generated images
    Plots {
        /// Image directory
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },

    /// Delete images older than a given age
    Prune {
        /// Age threshold in hours
        #[arg(long, default_value = "24")]
        older_than_hours: u64,

        /// Image directory
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// Preview without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the active configuration
    Config,
}

fn open_store(config: &Config, dir: Option<PathBuf>) -> Result<PngStore> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.plots.dir));
    PngStore::new(&dir, config.plots.size())
        .with_context(|| format!("failed to open image directory {}", dir.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            image_dir,
        } => cmd_serve(&config, host, port, image_dir),
        Commands::Run {
            method,
            data,
            out_dir,
            no_plot,
            json,
        } => cmd_run(&config, &method, &data, out_dir, no_plot, json),
        Commands::Plots { image_dir } => cmd_plots(&open_store(&config, image_dir)?),
        Commands::Prune {
            older_than_hours,
            image_dir,
            dry_run,
        } => cmd_prune(&open_store(&config, image_dir)?, older_than_hours, dry_run),
        Commands::Config => cmd_config(cli.config.as_deref(), &config),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[cfg(feature = "web")]
fn cmd_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    image_dir: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(config, image_dir)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let state = std::sync::Arc::new(web::AppState {
        store,
        opts: config.analysis.options(),
    });

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(web::serve(&host, port, state))
}

#[cfg(not(feature = "web"))]
fn cmd_serve(
    _config: &Config,
    _host: Option<String>,
    _port: Option<u16>,
    _image_dir: Option<PathBuf>,
) -> Result<()> {
    anyhow::bail!("web feature not enabled, rebuild with `--features web`")
}

fn cmd_run(
    config: &Config,
    method: &str,
    data: &str,
    out_dir: Option<PathBuf>,
    no_plot: bool,
    json: bool,
) -> Result<()> {
    let samples = parse_samples(data).context("invalid data")?;
    let outcome = analyze(&samples, method, &config.analysis.options())?;

    let analysis = match &outcome {
        Outcome::Analysis(a) => a,
        Outcome::Unrecognized => {
            println!("{}", outcome.summary());
            return Ok(());
        }
    };

    let image = if no_plot {
        None
    } else {
        let store = open_store(config, out_dir)?;
        let rec = store.save(analysis)?;
        Some(store.dir().join(rec.name))
    };

    if json {
        let mut value = serde_json::to_value(analysis)?;
        value["image"] = serde_json::json!(image.as_ref().map(|p| p.display().to_string()));
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", analysis.summary());
    for entry in legend(analysis) {
        println!("  {:<20} {} ({})", entry.label, entry.color, entry.shape);
    }
    if let Some(path) = image {
        println!("Plot: {}", path.display());
    }
    Ok(())
}

fn cmd_plots(store: &PngStore) -> Result<()> {
    let plots = store.list()?;
    if plots.is_empty() {
        println!("No plots in {}.", store.dir().display());
        return Ok(());
    }

    println!("{:<32} {:<17} Size", "Name", "Created");
    println!("{}", "-".repeat(60));
    for rec in &plots {
        println!(
            "{:<32} {:<17} {}",
            rec.name,
            rec.created_at.format("%Y-%m-%d %H:%M"),
            format_size(rec.size_bytes)
        );
    }
    Ok(())
}

fn cmd_prune(store: &PngStore, older_than_hours: u64, dry_run: bool) -> Result<()> {
    let max_age = Duration::from_secs(older_than_hours * 3600);
    if dry_run {
        let cutoff = Utc::now() - chrono::Duration::hours(older_than_hours as i64);
        let mut count = 0;
        for rec in store.list()? {
            if rec.created_at <= cutoff {
                count += 1;
                println!("  [dry-run] would prune: {}", rec.name);
            }
        }
        println!("Would prune {count} plots (older than {older_than_hours}h).");
    } else {
        let pruned = store.prune(max_age)?;
        println!("Pruned {pruned} plots (older than {older_than_hours}h).");
    }
    Ok(())
}

fn cmd_config(explicit: Option<&Path>, config: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path(explicit));
    println!();
    println!("[server]");
    println!("host = {:?}", config.server.host);
    println!("port = {}", config.server.port);
    println!();
    println!("[plots]");
    println!("dir = {:?}", config.plots.dir);
    println!("width = {}", config.plots.width);
    println!("height = {}", config.plots.height);
    println!();
    println!("[analysis]");
    println!("interp_points = {}", config.analysis.interp_points);
    println!("fit_degree = {}", config.analysis.fit_degree);
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_dir(dir: &Path) -> Config {
        let mut config = Config::default();
        config.plots.dir = dir.display().to_string();
        config
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "numplot", "run", "-m", "fit", "-d", "1,2,3", "--no-plot",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                method,
                data,
                no_plot,
                ..
            } => {
                assert_eq!(method, "fit");
                assert_eq!(data, "1,2,3");
                assert!(no_plot);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from(["numplot", "config", "--config", "/tmp/x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }

    #[test]
    fn test_run_writes_plot() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_dir(dir.path());
        cmd_run(&config, "minimum", "3,1,2", None, false, false).unwrap();
        let store = open_store(&config, None).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_run_unrecognized_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_dir(dir.path());
        cmd_run(&config, "spline", "1,2,3", None, false, false).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_bad_data_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_dir(dir.path());
        assert!(cmd_run(&config, "fit", "1,x", None, true, false).is_err());
    }

    #[test]
    fn test_prune_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_dir(dir.path());
        cmd_run(&config, "derivative", "1,2,3", None, false, true).unwrap();
        let store = open_store(&config, None).unwrap();
        cmd_prune(&store, 1, true).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        cmd_prune(&store, 0, false).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
