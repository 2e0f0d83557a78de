use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pictor", version)]
struct Cli {
    /// More output; repeat for tool output and debug logs.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ship a scene out to a file.
    Ship(ShipArgs),
    /// Print the bounding box of a scene as JSON.
    Bounds(BoundsArgs),
}

#[derive(Args, Debug)]
struct ShipArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output prefix; `-` writes to standard output. Defaults to the scene file stem.
    #[arg(long)]
    prefix: Option<String>,

    /// Output format (`eps`, `pdf`, `png`, ...). Defaults to the engine's native format.
    #[arg(long)]
    format: Option<String>,

    /// Settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Show the result in a viewer.
    #[arg(long)]
    view: bool,

    /// Wait for the viewer to exit.
    #[arg(long)]
    wait: bool,

    /// Ship out as an embedded object at this magnification.
    #[arg(long, default_value_t = 0.0)]
    magnification: f64,
}

#[derive(Args, Debug)]
struct BoundsArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Ship(args) => cmd_ship(args, cli.verbose),
        Command::Bounds(args) => cmd_bounds(args, cli.verbose),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>, verbose: u8) -> anyhow::Result<pictor::Settings> {
    let mut settings = match path {
        Some(p) => pictor::Settings::from_json_file(p)?,
        None => pictor::Settings::default(),
    };
    settings.verbose = settings.verbose.max(verbose);
    Ok(settings)
}

fn cmd_ship(args: ShipArgs, verbose: u8) -> anyhow::Result<bool> {
    let mut settings = load_settings(args.settings.as_deref(), verbose)?;
    settings.view |= args.view;

    let scene = pictor::Scene::from_json_file(&args.in_path)?;
    let mut pic = scene.picture()?;
    let preamble = scene.preamble_picture()?;

    let prefix = match args.prefix {
        Some(p) => p,
        None => args
            .in_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .with_context(|| format!("no file stem in '{}'", args.in_path.display()))?,
    };
    let format = args.format.unwrap_or_default();

    let mut ctx = pictor::ShipoutContext::new(settings);
    let mut req = pictor::ShipoutRequest::new(&prefix)
        .format(&format)
        .magnification(args.magnification)
        .wait(args.wait);
    if let Some(preamble) = preamble.as_ref() {
        req = req.preamble(preamble);
    }
    Ok(pic.shipout(&mut ctx, &req))
}

fn cmd_bounds(args: BoundsArgs, verbose: u8) -> anyhow::Result<bool> {
    let settings = load_settings(args.settings.as_deref(), verbose)?;
    let scene = pictor::Scene::from_json_file(&args.in_path)?;
    let mut pic = scene.picture()?;

    let mut metrics = pictor::TexPipe::new(&settings);
    let b = pic.bounds(&mut metrics);
    println!("{}", serde_json::to_string(&b).context("serialize bounds")?);
    Ok(true)
}
