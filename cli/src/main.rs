use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use particles::backend::{LoadStatus, Readiness};
use particles::calibrate::Calibration;
use particles::detect::{CircleFinder, DetectionParams};
use particles::engine::EngineCore;
use particles::error::{DecodeError, DetectError, ExportError};
use particles::export;
use particles::image_io;
use particles::overlay::{LabelMode, Primitive};
use particles::vision::HoughCircleFinder;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;


const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const SELECTION_COLOR: Rgb<u8> = Rgb([255, 200, 0]);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to save annotated image: {0}")]
    Annotate(#[from] image::ImageError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Parser, Debug)]
#[command(name = "semscan", about = "Detect and measure circular particles in SEM images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect particles in an image and export their measurements.
    Detect(DetectArgs),
    /// Print the physical-units-per-pixel ratio for a scale bar.
    Calibrate(ScaleArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// PNG, JPEG, BMP or TIFF image. Only the first TIFF page is read.
    #[arg(env = "SEMSCAN_IMAGE")]
    image: PathBuf,

    #[arg(long, env = "SEMSCAN_MIN_RADIUS", default_value_t = 9)]
    min_radius: u32,

    #[arg(long, env = "SEMSCAN_MAX_RADIUS", default_value_t = 38)]
    max_radius: u32,

    /// Detection strictness; higher finds fewer circles.
    #[arg(long, env = "SEMSCAN_THRESHOLD", default_value_t = 27)]
    threshold: u32,

    /// Drop candidates smaller than this many square pixels.
    #[arg(long, env = "SEMSCAN_MIN_AREA", default_value_t = 30)]
    min_area: u32,

    #[command(flatten)]
    scale: ScaleArgs,

    /// Write measurements here instead of stdout.
    #[arg(long, short, env = "SEMSCAN_OUTPUT")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, env = "SEMSCAN_FORMAT", default_value_t = Format::Csv)]
    format: Format,

    /// Also save a copy of the image with the detected particles drawn on it.
    #[arg(long, env = "SEMSCAN_ANNOTATED")]
    annotated: Option<PathBuf>,

    #[arg(long, value_enum, env = "SEMSCAN_LABELS", default_value_t = Labels::Diameter)]
    labels: Labels,

    /// Give up waiting for the vision backend after this long and continue in forced mode.
    #[arg(long, env = "SEMSCAN_BACKEND_TIMEOUT_SECS", default_value_t = 10)]
    backend_timeout_secs: u64,
}

impl DetectArgs {
    fn params(&self) -> DetectionParams {
        DetectionParams {
            min_radius: self.min_radius,
            max_radius: self.max_radius,
            circle_threshold: self.threshold,
            min_area: self.min_area,
        }
        .clamped()
    }
}

#[derive(Args, Debug)]
struct ScaleArgs {
    /// Length of the scale bar in pixels.
    #[arg(long, env = "SEMSCAN_KNOWN_PIXELS", default_value_t = 307.0)]
    known_pixels: f64,

    /// Length of the scale bar in `--unit`.
    #[arg(long, env = "SEMSCAN_KNOWN_LENGTH", conflicts_with = "micrometers")]
    known_length: Option<f64>,

    #[arg(long, env = "SEMSCAN_UNIT", default_value = "nm", conflicts_with = "micrometers")]
    unit: String,

    /// Length of the scale bar in micrometres; measurements are reported in nanometres.
    #[arg(long, env = "SEMSCAN_MICROMETERS")]
    micrometers: Option<f64>,
}

impl ScaleArgs {
    fn calibration(&self) -> Calibration {
        match (self.known_length, self.micrometers) {
            (Some(length), _) => Calibration::new(self.known_pixels, length, self.unit.as_str()),
            (None, Some(um)) => Calibration::from_micrometers(um, self.known_pixels),
            (None, None) => Calibration { known_pixels: self.known_pixels, ..Calibration::default() },
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Labels {
    Diameter,
    Id,
}

impl From<Labels> for LabelMode {
    fn from(labels: Labels) -> Self {
        match labels {
            Labels::Diameter => Self::Diameter,
            Labels::Id => Self::Id,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect(args) => run_detect(args).await,
        Command::Calibrate(scale) => {
            run_calibrate(&scale);
            Ok(())
        }
    }
}

fn run_calibrate(scale: &ScaleArgs) {
    let calibration = scale.calibration();
    if !calibration.is_valid() {
        tracing::warn!(
            known_pixels = calibration.known_pixels,
            known_length = calibration.known_length,
            "calibration inputs must be positive; ratio is 0"
        );
    }
    println!("{:.6} {}/px", calibration.ratio(), calibration.unit);
}

async fn run_detect(args: DetectArgs) -> Result<(), CliError> {
    let readiness = Readiness::new();
    let loader = readiness.clone();
    let loading = tokio::spawn(async move {
        loader.mark_initializing();
        loader.load(warm_finder(), || async { Ok(builtin_finder()) }).await
    });

    let image = read_image(&args.image).await?;
    let status = settle_backend(&readiness, loading, Duration::from_secs(args.backend_timeout_secs)).await;
    tracing::info!(%status, "vision backend status");
    let detector = readiness.detector()?;

    let params = args.params();
    let (image, detected) = tokio::task::spawn_blocking(move || {
        let detected = detector.detect(&image, &params);
        (image, detected)
    })
    .await?;

    let mut engine = EngineCore::new();
    engine.set_image_size(f64::from(image.width()), f64::from(image.height()));
    engine.load_detection(detected?);

    let calibration = args.scale.calibration();
    let particles = engine.store.committed();
    let summary = export::summary(particles, &calibration);
    tracing::info!(
        count = summary.count,
        mean = ?summary.mean_diameter,
        min = ?summary.min_diameter,
        max = ?summary.max_diameter,
        unit = %summary.unit,
        "measurements"
    );

    let rendered = match args.format {
        Format::Csv => export::to_csv(particles, &calibration),
        Format::Json => export::to_json(particles, &calibration)?,
    };
    match &args.output {
        Some(path) => write_output(path, rendered).await?,
        None => print!("{rendered}"),
    }

    if let Some(path) = &args.annotated {
        annotate(&image, &engine.scene(args.labels.into())).save(path)?;
        tracing::info!(path = %path.display(), "annotated image saved");
    }
    Ok(())
}

/// Wait for the backend to settle, or for the loader task to end early.
///
/// A loader that panics marks the backend failed instead of leaving it to the timeout.
async fn settle_backend(readiness: &Readiness, mut loading: JoinHandle<LoadStatus>, timeout: Duration) -> LoadStatus {
    tokio::select! {
        status = readiness.wait(timeout) => {
            if !loading.is_finished() {
                tracing::warn!(%status, "vision backend loader still running");
            }
            status
        }
        joined = &mut loading => match joined {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(%err, "vision backend loader aborted");
                readiness.fail(err.to_string());
                readiness.status()
            }
        },
    }
}

async fn write_output(path: &Path, rendered: String) -> Result<(), CliError> {
    tokio::fs::write(path, rendered).await.map_err(|source| ExportError::Write { path: path.to_path_buf(), source })?;
    tracing::info!(path = %path.display(), "measurements written");
    Ok(())
}

async fn read_image(path: &Path) -> Result<DynamicImage, CliError> {
    let bytes =
        tokio::fs::read(path).await.map_err(|source| DecodeError::Read { path: path.to_path_buf(), source })?;
    let image = tokio::task::spawn_blocking(move || image_io::decode_image(&bytes)).await??;
    tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "image loaded");
    Ok(image)
}

fn builtin_finder() -> Arc<dyn CircleFinder> {
    Arc::new(HoughCircleFinder)
}

/// Build the finder off the async runtime, as a real backend load would.
///
/// Both sources build [`HoughCircleFinder`]; the inline fallback only runs if
/// the blocking build fails. Primary-then-fallback ordering is covered by the
/// `backend` tests with distinct sources.
async fn warm_finder() -> Result<Arc<dyn CircleFinder>, DetectError> {
    tokio::task::spawn_blocking(builtin_finder).await.map_err(|err| DetectError::LoadFailed(err.to_string()))
}

/// Rasterize outlines, center dots and the selection onto a copy of `image`.
///
/// Labels are left out; drawing text needs a font.
#[allow(clippy::cast_possible_truncation)]
fn annotate(image: &DynamicImage, scene: &[Primitive]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let px = |p: f64| p.round() as i32;
    for primitive in scene {
        match primitive {
            Primitive::Outline { center, radius, width } => {
                stroke_circle(&mut canvas, (px(center.x), px(center.y)), px(*radius), px(*width), OVERLAY_COLOR);
            }
            Primitive::Highlight { center, radius, width } => {
                stroke_circle(&mut canvas, (px(center.x), px(center.y)), px(*radius), px(*width), SELECTION_COLOR);
            }
            Primitive::CenterDot { center, radius } => {
                draw_filled_circle_mut(&mut canvas, (px(center.x), px(center.y)), px(*radius), OVERLAY_COLOR);
            }
            Primitive::Handle { center, radius } => {
                draw_filled_circle_mut(&mut canvas, (px(center.x), px(center.y)), px(*radius), SELECTION_COLOR);
            }
            Primitive::Label { .. } => {}
        }
    }
    canvas
}

/// A `width`-pixel ring whose outer edge sits at `radius`.
fn stroke_circle(canvas: &mut RgbImage, center: (i32, i32), radius: i32, width: i32, color: Rgb<u8>) {
    for inset in 0..width.max(1) {
        let r = radius - inset;
        if r > 0 {
            draw_hollow_circle_mut(canvas, center, r, color);
        }
    }
}
