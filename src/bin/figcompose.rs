use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "figcompose", version)]
struct Cli {
    /// Log verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a design description into a positioned, styled tree (JSON).
    Render(RenderArgs),
    /// Convert one normalized color into its display string.
    Color(ColorArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Shape of the input JSON.
    #[arg(long, value_enum, default_value_t = InputFormat::Tree)]
    format: InputFormat,

    /// Render settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Text measurement backend.
    #[arg(long, value_enum, default_value_t = MeasureChoice::Parley)]
    measure: MeasureChoice,

    /// Emit the flat paint-ordered draw list instead of the nested tree.
    #[arg(long)]
    ops: bool,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ColorArgs {
    r: f64,
    g: f64,
    b: f64,
    /// Alpha; opaque when omitted.
    a: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// A nested VisualNode tree.
    Tree,
    /// A flat list of node records linked by parent id.
    Records,
    /// A design tool export with absolute bounding boxes.
    Design,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MeasureChoice {
    Parley,
    Fixed,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Color(args) => cmd_color(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn make_measurer(choice: MeasureChoice) -> Box<dyn figcompose::TextMeasurer> {
    match choice {
        MeasureChoice::Parley => Box::new(figcompose::ParleyMeasurer::new()),
        MeasureChoice::Fixed => Box::new(figcompose::FixedAdvanceMeasurer::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let settings = match &args.settings {
        Some(p) => figcompose::RenderSettings::load(p)?,
        None => figcompose::RenderSettings::default(),
    };

    let tree = match args.format {
        InputFormat::Tree => read_json::<figcompose::VisualNode>(&args.in_path, "tree")?,
        InputFormat::Records => {
            let records: Vec<figcompose::NodeRecord> = read_json(&args.in_path, "records")?;
            figcompose::assemble(records)?
        }
        InputFormat::Design => {
            let export: figcompose::DesignExport = read_json(&args.in_path, "design export")?;
            figcompose::load_design(&export, &settings)?
        }
    };

    let mut measurer = make_measurer(args.measure);
    let rendered = figcompose::Composer::new(settings, measurer.as_mut()).render(&tree)?;
    tracing::info!(nodes = rendered.node_count(), "render complete");

    let json = if args.ops {
        serde_json::to_string_pretty(&rendered.draw_ops())?
    } else {
        serde_json::to_string_pretty(&rendered)?
    };

    match &args.out {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            let mut w = BufWriter::new(f);
            w.write_all(json.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_color(args: ColorArgs) -> anyhow::Result<()> {
    let spec = figcompose::ColorSpec::rgba(args.r, args.g, args.b, args.a.unwrap_or(1.0));
    println!("{}", figcompose::to_display_color(spec));
    Ok(())
}
