//! Headless host for the shield visualization
//!
//! Mounts the visualization into a fixed-size container, drives the frame
//! loop, scripts pointer and resize events, and writes PNG captures.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use shield_engine::foundation::logging;
use shield_engine::prelude::*;

mod analysis;
use analysis::analyze_capture;

const DEFAULT_OUTPUT_DIR: &str = "captures";

#[derive(Debug)]
struct CaptureOptions {
    width: u32,
    height: u32,
    frames: u64,
    capture_every: u64,
    output_dir: PathBuf,
    config_path: Option<String>,
    seed: Option<u64>,
    resize_at: Option<(u64, u32, u32)>,
    pointer: bool,
}

fn parse_options() -> Result<CaptureOptions> {
    let matches = Command::new("shield_capture")
        .about("Runs the shield visualization headlessly and captures frames as PNG")
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("Container width")
                .value_parser(value_parser!(u32))
                .default_value("800"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("Container height")
                .value_parser(value_parser!(u32))
                .default_value("600"),
        )
        .arg(
            Arg::new("frames")
                .short('n')
                .long("frames")
                .value_name("COUNT")
                .help("Number of frames to run")
                .value_parser(value_parser!(u64))
                .default_value("300"),
        )
        .arg(
            Arg::new("capture-every")
                .long("capture-every")
                .value_name("FRAMES")
                .help("Write a PNG every N frames (0 writes only the last frame)")
                .value_parser(value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for captures")
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Settings file (.toml or .ron)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Particle seed for reproducible captures")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("resize-at")
                .long("resize-at")
                .value_name("FRAME:WxH")
                .help("Resize the container at a frame, e.g. 120:1024x512"),
        )
        .arg(
            Arg::new("no-pointer")
                .long("no-pointer")
                .help("Do not move the pointer")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let resize_at = matches
        .get_one::<String>("resize-at")
        .map(|arg| parse_resize(arg))
        .transpose()?;

    Ok(CaptureOptions {
        width: *matches.get_one::<u32>("width").context("missing width")?,
        height: *matches.get_one::<u32>("height").context("missing height")?,
        frames: *matches.get_one::<u64>("frames").context("missing frame count")?,
        capture_every: *matches.get_one::<u64>("capture-every").context("missing capture interval")?,
        output_dir: PathBuf::from(matches.get_one::<String>("output").context("missing output dir")?),
        config_path: matches.get_one::<String>("config").cloned(),
        seed: matches.get_one::<u64>("seed").copied(),
        resize_at,
        pointer: !matches.get_flag("no-pointer"),
    })
}

/// Parse `FRAME:WxH`
fn parse_resize(arg: &str) -> Result<(u64, u32, u32)> {
    let (frame, size) = arg.split_once(':').context("expected FRAME:WxH")?;
    let (width, height) = size.split_once('x').context("expected WxH after ':'")?;
    Ok((
        frame.parse().with_context(|| format!("bad frame number '{frame}'"))?,
        width.parse().with_context(|| format!("bad width '{width}'"))?,
        height.parse().with_context(|| format!("bad height '{height}'"))?,
    ))
}

fn load_config(options: &CaptureOptions) -> Result<VisualizationConfig> {
    let mut config = match &options.config_path {
        Some(path) => VisualizationConfig::load_validated(path)
            .with_context(|| format!("failed to load settings from {path}"))?,
        None => VisualizationConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

/// Pointer position tracing a slow ellipse around the container center
fn pointer_path(frame: u64, width: u32, height: u32) -> (f64, f64) {
    let t = frame as f64 * 0.01;
    let (w, h) = (f64::from(width), f64::from(height));
    (w * 0.5 * (1.0 + 0.6 * t.cos()), h * 0.5 * (1.0 + 0.6 * t.sin()))
}

fn capture(visualization: &Visualization, dir: &Path, frame: u64) -> Result<()> {
    let image = visualization
        .with_backend(|backend| {
            backend
                .as_any()
                .downcast_ref::<SoftwareBackend>()
                .map(SoftwareBackend::to_image)
        })?
        .context("captures need the software backend")??;

    let path = dir.join(format!("shield_{frame:05}.png"));
    image
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    log::info!("Captured {} ({})", path.display(), analyze_capture(&image));
    Ok(())
}

fn main() -> Result<()> {
    let options = parse_options()?;
    let config = load_config(&options)?;
    logging::init_with_level(&config.log_level);

    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("failed to create {}", options.output_dir.display()))?;

    let container = Rc::new(FixedContainer::new(options.width, options.height));
    let host: Rc<dyn HostContainer> = container.clone();
    let mut events = EventDispatcher::new();
    let mut frames = FrameQueue::new();

    let mut visualization = Visualization::mount(host, SoftwareBackend::new(), config, &mut events, &mut frames)
        .context("failed to mount visualization")?;

    let mut timer = Timer::new();
    let mut size = (options.width, options.height);

    for frame in 1..=options.frames {
        timer.update();

        if let Some((at, width, height)) = options.resize_at {
            if frame == at {
                container.set_size(width, height);
                events.emit(HostEvent::Resize);
                size = (width, height);
            }
        }
        if options.pointer {
            let (client_x, client_y) = pointer_path(frame, size.0, size.1);
            events.emit(HostEvent::PointerMove { client_x, client_y });
        }
        events.dispatch_queued();

        for request in frames.tick() {
            visualization
                .run_frame(request, &mut frames)
                .with_context(|| format!("frame {frame} failed"))?;
        }

        let interval_hit = options.capture_every > 0 && frame % options.capture_every == 0;
        if interval_hit || (options.capture_every == 0 && frame == options.frames) {
            capture(&visualization, &options.output_dir, frame)?;
        }
    }

    let drawn = visualization.frames_completed();
    visualization.teardown(&mut events, &mut frames);
    log::info!(
        "Drew {} frames in {:.2}s ({:.1} FPS average)",
        drawn,
        timer.total_time(),
        timer.average_fps()
    );
    Ok(())
}
