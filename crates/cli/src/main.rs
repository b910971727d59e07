mod console_surface;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};

use facecam_core::capture::domain::camera::CameraRequest;
use facecam_core::capture::infrastructure::ffmpeg_camera::{CameraDevice, FfmpegCamera};
use facecam_core::capture::infrastructure::still_image;
use facecam_core::detection::domain::model_loader::ModelLoader;
use facecam_core::detection::infrastructure::onnx_model_loader::{
    progress_message, ModelConfig, OnnxModelLoader,
};
use facecam_core::render::layout::canvas_size;
use facecam_core::render::overlay_renderer::annotation_labels;
use facecam_core::session::events::{SessionEvent, Subscription};
use facecam_core::session::session::{Session, SessionConfig, Transition};
use facecam_core::shared::constants::DEFAULT_FRAME_RATE;

use console_surface::ConsoleSurface;

/// Live webcam face detection with age and expression overlays.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Mirror serving every ONNX model by file name, used instead of the
    /// published download locations.
    #[arg(long, global = true)]
    model_base_url: Option<String>,

    /// Directory checked for models before downloading.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, global = true, default_value = "0.5")]
    confidence: f64,

    /// Detect faces only, without age and expression estimation.
    #[arg(long, global = true)]
    no_analysis: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a live session and log annotations as they change.
    Watch(WatchArgs),
    /// Annotate a still image and print each face's labels.
    Detect {
        /// Image file to analyze.
        image: PathBuf,
    },
}

#[derive(clap::Args)]
struct WatchArgs {
    /// Capture device URL (e.g. /dev/video0, "0", "video=My Camera").
    #[arg(long)]
    device: Option<String>,

    /// ffmpeg input device format (v4l2, avfoundation, dshow).
    #[arg(long)]
    input_format: Option<String>,

    /// Play a video file instead of opening a camera.
    #[arg(long, conflicts_with_all = ["device", "input_format"])]
    file: Option<PathBuf>,

    /// Requested capture width.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Requested capture height.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Requested capture frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Overlay refresh rate.
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    render_rate: f64,

    /// Virtual viewport width used to size the overlay.
    #[arg(long, default_value = "1280")]
    viewport: f64,

    /// Stop after this many seconds instead of waiting for Enter.
    #[arg(long)]
    duration: Option<f64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let loader = build_loader(&cli);
    match &cli.command {
        Command::Watch(args) => run_watch(args, loader),
        Command::Detect { image } => run_detect(image, loader),
    }
}

fn run_watch(
    args: &WatchArgs,
    loader: OnnxModelLoader,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = camera_device(args);
    let mut request = CameraRequest::user_video();
    if let (Some(w), Some(h)) = (args.width, args.height) {
        request = request.with_size(w, h);
    }
    if let Some(fps) = args.fps {
        request = request.with_fps(fps);
    }

    let size = canvas_size(args.viewport, args.viewport);
    let surface = Arc::new(Mutex::new(ConsoleSurface::new(size.width, size.height)));
    let config = SessionConfig {
        camera_request: request,
        frame_rate: Some(args.render_rate),
        ..SessionConfig::default()
    };

    let mut session = Session::new(
        Box::new(FfmpegCamera::new(device)),
        Box::new(loader),
        surface,
        config,
    );
    let events = session.subscribe();
    session.resize(size);

    match session.toggle()? {
        Transition::Started => {}
        Transition::CameraUnavailable => {
            return Err(camera_message(&events)
                .unwrap_or_else(|| "Error accessing camera".to_string())
                .into());
        }
        Transition::Stopped => return Ok(()),
    }
    eprintln!();

    match args.duration {
        Some(secs) => {
            log::info!("Watching for {secs}s");
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
        None => {
            eprintln!("Watching camera, press Enter to stop");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
        }
    }

    session.toggle()?;
    Ok(())
}

fn run_detect(
    image: &Path,
    mut loader: OnnxModelLoader,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = still_image::load_frame(image)?;
    let mut detector = loader.load()?;
    eprintln!();

    let detections = detector.detect(&frame)?;
    log::info!(
        "Found {} faces in {} ({}x{})",
        detections.len(),
        image.display(),
        frame.width(),
        frame.height()
    );

    for (i, detection) in detections.iter().enumerate() {
        let b = &detection.bbox;
        println!(
            "face {}: x={:.0} y={:.0} w={:.0} h={:.0} score={:.2}",
            i + 1,
            b.x,
            b.y,
            b.width,
            b.height,
            detection.score
        );
        for label in annotation_labels(detection) {
            println!("  {label}");
        }
    }
    Ok(())
}

fn build_loader(cli: &Cli) -> OnnxModelLoader {
    OnnxModelLoader::new(ModelConfig {
        base_url: cli.model_base_url.clone(),
        bundled_dir: cli.models_dir.clone(),
        confidence: cli.confidence,
        analyze_faces: !cli.no_analysis,
    })
    .with_progress(Arc::new(download_progress))
}

fn camera_device(args: &WatchArgs) -> CameraDevice {
    if let Some(file) = &args.file {
        return CameraDevice::file(file);
    }
    let default = CameraDevice::platform_default();
    CameraDevice {
        input_format: args.input_format.clone().or(default.input_format),
        url: args.device.clone().unwrap_or(default.url),
    }
}

fn camera_message(events: &Subscription) -> Option<String> {
    events.drain().into_iter().find_map(|event| match event {
        SessionEvent::CameraUnavailable(message) => Some(message),
        _ => None,
    })
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if let Some(dir) = &cli.models_dir {
        if !dir.is_dir() {
            return Err(format!("Models directory not found: {}", dir.display()).into());
        }
    }

    match &cli.command {
        Command::Detect { image } => {
            if !image.exists() {
                return Err(format!("Input file not found: {}", image.display()).into());
            }
            if !still_image::is_image(image) {
                return Err(format!("Not a supported image file: {}", image.display()).into());
            }
        }
        Command::Watch(args) => {
            if let Some(file) = &args.file {
                if !file.exists() {
                    return Err(format!("Input file not found: {}", file.display()).into());
                }
            }
            if let Some(secs) = args.duration {
                if !(secs.is_finite() && secs > 0.0) {
                    return Err(format!("Duration must be positive, got {secs}").into());
                }
            }
            if !(args.render_rate.is_finite() && args.render_rate > 0.0) {
                return Err(format!(
                    "Render rate must be positive, got {}",
                    args.render_rate
                )
                .into());
            }
            if args.viewport <= 0.0 {
                return Err(format!("Viewport must be positive, got {}", args.viewport).into());
            }
        }
    }
    Ok(())
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    eprint!("\r{}", progress_message(name, downloaded, total));
}
