use crate::card::CardContent;
use crate::config::{Config, load_config};
use crate::ephemeris::EphemerisSnapshot;
use crate::fonts::load_font_set;
use crate::layout::compute_wheel;
use crate::render::{render_preview, write_output_png, write_output_svg};
use crate::server;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "wheelcard=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "wheelcard", version, about = "Astrological chart-wheel preview images")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve /og/{date}.png over HTTP
    Serve(ServeArgs),
    /// Render one wheel (svg) or card (png) from an ephemeris JSON file
    Render(RenderArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// Base URL of the reading/ephemeris service
    #[arg(long, env = "WHEELCARD_UPSTREAM_URL")]
    pub upstream: Option<String>,

    /// Font directory to probe; repeat to give several, in order
    #[arg(long = "font-dir")]
    pub font_dirs: Vec<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Ephemeris JSON file or '-' for stdin. Omit for an empty chart.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Date shown on the card
    #[arg(short = 'd', long = "date")]
    pub date: String,

    /// Card title. Defaults to "Reading for {date}".
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// Host used for the brand label
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Output file. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Font directory to probe; repeat to give several, in order
    #[arg(long = "font-dir")]
    pub font_dirs: Vec<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    match args.command {
        Command::Serve(args) => run_serve(args),
        Command::Render(args) => run_render(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let config = serve_config(&args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(server::serve(config))
}

fn serve_config(args: &ServeArgs) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(upstream) = &args.upstream {
        config.server.upstream_url = upstream.clone();
    }
    apply_font_dirs(&mut config, &args.font_dirs);
    Ok(config)
}

fn run_render(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_font_dirs(&mut config, &args.font_dirs);
    let snapshot = read_snapshot(args.input.as_deref())?;
    let theme = Theme::from_fonts(&config.fonts);

    match args.output_format {
        OutputFormat::Svg => {
            let wheel = compute_wheel(&snapshot, &theme, &config.wheel);
            write_output_svg(&wheel.to_svg(), args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let fonts = load_font_set(&config.fonts)?;
            let content = CardContent::new(args.title.as_deref(), &args.date, args.host.as_deref(), &config.card);
            let png = render_preview(&snapshot, &content, &fonts, &theme, &config)?;
            write_output_png(&png, &output)?;
            tracing::info!(output = %output.display(), bytes = png.len(), "wrote card");
        }
    }
    Ok(())
}

fn apply_font_dirs(config: &mut Config, dirs: &[PathBuf]) {
    if !dirs.is_empty() {
        config.fonts.candidate_dirs = dirs.to_vec();
    }
}

fn read_snapshot(path: Option<&Path>) -> Result<EphemerisSnapshot> {
    let Some(path) = path else {
        return Ok(EphemerisSnapshot::default());
    };
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    EphemerisSnapshot::parse_json(&content).with_context(|| format!("invalid ephemeris JSON in {}", path.display()))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
