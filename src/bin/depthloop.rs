use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "depthloop", version, about = "Parallax loops from a photo and its depth map")]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export the loop as MP4 (requires `ffmpeg` on PATH) or as a PNG sequence.
    Render(RenderArgs),
    /// Run the live preview loop for a while and report frame counts.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Elapsed animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Source sampling filter.
    #[arg(long, value_enum)]
    sampling: Option<SamplingChoice>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output MP4 path.
    #[arg(long, required_unless_present = "png_dir")]
    out: Option<PathBuf>,

    /// Write numbered PNG frames into this directory instead of an MP4.
    #[arg(long, conflicts_with = "out")]
    png_dir: Option<PathBuf>,

    /// Clip length in seconds (project value, else one loop interval).
    #[arg(long)]
    duration: Option<f64>,

    /// Frames per second (project value, else 30).
    #[arg(long)]
    fps: Option<u32>,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Wall-clock seconds to run.
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Target preview refresh rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SamplingChoice {
    Bilinear,
    Nearest,
}

impl From<SamplingChoice> for depthloop::Sampling {
    fn from(c: SamplingChoice) -> Self {
        match c {
            SamplingChoice::Bilinear => depthloop::Sampling::Bilinear,
            SamplingChoice::Nearest => depthloop::Sampling::Nearest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<(depthloop::Project, depthloop::DepthImage)> {
    let project = depthloop::Project::from_json_file(path)
        .with_context(|| format!("load project '{}'", path.display()))?;
    let image = project
        .load_depth_image()
        .with_context(|| format!("load images for project '{}'", path.display()))?;
    Ok((project, image))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (project, image) = load(&args.project)?;
    let mut opts = project.render;
    if let Some(s) = args.sampling {
        opts.sampling = s.into();
    }
    let renderer = depthloop::FrameRenderer::with_opts(image, opts);
    let frame = renderer.render_at(args.time, &project.params)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    depthloop::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (project, image) = load(&args.project)?;
    let renderer = depthloop::FrameRenderer::with_opts(image, project.render);

    let opts = depthloop::ExportOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        ..project.export_opts(args.duration, args.fps)?
    };

    let (stats, written) = match (&args.png_dir, &args.out) {
        (Some(dir), _) => {
            let mut sink = depthloop::PngSequenceSink::new(dir);
            let stats = depthloop::export(&renderer, &project.params, &opts, &mut sink)?;
            (stats, dir.clone())
        }
        (None, Some(out)) => {
            let mut sink_opts = depthloop::FfmpegSinkOpts::new(out);
            sink_opts.overwrite = !args.no_overwrite;
            let mut sink = depthloop::FfmpegSink::new(sink_opts);
            let stats = depthloop::export(&renderer, &project.params, &opts, &mut sink)?;
            (stats, out.clone())
        }
        (None, None) => anyhow::bail!("either --out or --png-dir is required"),
    };

    eprintln!(
        "wrote {} ({} frames)",
        written.display(),
        stats.frames_written
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        anyhow::bail!("--seconds must be a non-negative number");
    }
    if args.fps == 0 {
        anyhow::bail!("--fps must be non-zero");
    }
    let (project, image) = load(&args.project)?;

    let opts = depthloop::PreviewOpts {
        frame_interval: Duration::from_secs_f64(1.0 / f64::from(args.fps)),
        render: project.render,
    };
    let preview = depthloop::PreviewThread::spawn(
        |frame: depthloop::RenderedFrame| {
            tracing::debug!(t = frame.time_secs, "preview frame");
        },
        opts,
    )?;
    preview.start(image, project.params)?;
    std::thread::sleep(Duration::from_secs_f64(args.seconds));
    preview.stop()?;
    let stats = preview.shutdown()?;

    println!("delivered {} frames, dropped {}", stats.delivered, stats.dropped);
    Ok(())
}
