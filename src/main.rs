use anyhow::{Context, Result};
use backdrop::capture::{FrameSource, StillSource};
use backdrop::frame::{Facing, FrameMetadata, ResizeFilter};
use backdrop::output::{OutputSink, PngSink};
use backdrop::segmentation::{Connectivity, MorphOp, RefineStrategy, DEFAULT_FOREGROUND_LABEL};
use backdrop::{BackgroundCompositor, PipelineConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Refine {
    /// Keep exactly the pixels carrying the foreground label
    Exact,
    /// Drop connected foreground regions smaller than --min-area
    Components,
    /// Morphological opening (removes specks)
    Open,
    /// Morphological closing (fills holes)
    Close,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera frame to composite (any format the image crate reads)
    #[arg(long)]
    frame: PathBuf,

    /// Raw analyzer mask, one signed label byte per pixel, row-major
    /// If not provided, frames pass through unchanged
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Mask width when the analyzer ran below frame resolution
    #[arg(long, requires = "mask_height")]
    mask_width: Option<u32>,

    /// Mask height when the analyzer ran below frame resolution
    #[arg(long, requires = "mask_width")]
    mask_height: Option<u32>,

    /// Background image to put behind the foreground
    #[arg(long)]
    background: Option<PathBuf>,

    /// Label value treated as foreground
    #[arg(long, default_value_t = DEFAULT_FOREGROUND_LABEL, allow_negative_numbers = true)]
    label: i32,

    /// Frame comes from a front-facing (mirrored) camera
    #[arg(long)]
    front: bool,

    /// Output PNG path
    #[arg(short, long, default_value = "composite.png")]
    output: PathBuf,

    /// Number of times to replay the frame through the pipeline
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Pace the replay loop to this many frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Mask refinement strategy
    #[arg(long, value_enum, default_value_t = Refine::Exact)]
    refine: Refine,

    /// Smallest region kept by --refine components
    #[arg(long, default_value_t = 64)]
    min_area: usize,

    /// Treat diagonal neighbours as connected for --refine components
    #[arg(long)]
    eight_connected: bool,

    /// Window radius for --refine open/close
    #[arg(long, default_value_t = 1)]
    radius: u8,

    /// Resize the background with nearest-neighbour instead of bilinear
    #[arg(long)]
    nearest: bool,

    /// Composite rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the refined mask (white = foreground) instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Leave the original background in place
    #[arg(long)]
    keep_background: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn refine_strategy(&self) -> RefineStrategy {
        match self.refine {
            Refine::Exact => RefineStrategy::LabelMatch,
            Refine::Components => RefineStrategy::Components {
                min_area: self.min_area,
                connectivity: if self.eight_connected {
                    Connectivity::Eight
                } else {
                    Connectivity::Four
                },
            },
            Refine::Open => RefineStrategy::Morphology {
                op: MorphOp::Open,
                radius: self.radius,
            },
            Refine::Close => RefineStrategy::Morphology {
                op: MorphOp::Close,
                radius: self.radius,
            },
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::builder()
            .replace_background(!self.keep_background)
            .refine(self.refine_strategy())
            .resize_filter(if self.nearest {
                ResizeFilter::Nearest
            } else {
                ResizeFilter::Bilinear
            })
            .parallel(self.parallel)
            .build()
    }
}

struct RunOptions {
    frames: u64,
    fps: Option<u32>,
    label: i32,
    mask_size: Option<(u32, u32)>,
    show_mask: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Backdrop starting");

    let facing = if args.front { Facing::Front } else { Facing::Back };
    let mut source = StillSource::open(&args.frame, args.mask.as_ref(), facing)
        .context("Failed to initialize frame source")?;
    let (width, height) = source.resolution();
    tracing::info!("Frame: {}x{}, facing {:?}", width, height, facing);

    let mut output = PngSink::new(&args.output).context("Failed to initialize PNG output")?;

    let compositor = BackgroundCompositor::new(args.pipeline_config());
    let config = compositor.config();
    tracing::info!(
        "Pipeline: replace_background={}, refine={:?}, filter={:?}, parallel={}",
        config.replace_background,
        config.refine,
        config.resize_filter,
        config.parallel
    );

    if let Some(path) = &args.background {
        tracing::info!("Loading background from {}", path.display());
        let background = image::open(path)
            .with_context(|| format!("Failed to load background from {}", path.display()))?
            .to_rgba8();
        compositor.set_background(background);
    } else {
        tracing::info!("No background selected");
    }

    let options = RunOptions {
        frames: args.frames,
        fps: args.fps,
        label: args.label,
        mask_size: args.mask_width.zip(args.mask_height),
        show_mask: args.show_mask,
    };

    run_pipeline(&mut source, &mut output, &compositor, &options)?;

    tracing::info!(
        "Wrote {} frame(s) to {}",
        output.frames_written(),
        output.path().display()
    );

    Ok(())
}

fn run_pipeline<C, O>(
    source: &mut C,
    output: &mut O,
    compositor: &BackgroundCompositor,
    options: &RunOptions,
) -> Result<()>
where
    C: FrameSource,
    O: OutputSink,
{
    let frame_duration = options
        .fps
        .filter(|&fps| fps > 0)
        .map(|fps| Duration::from_secs_f32(1.0 / fps as f32));
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_composite_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Replaying {} frame(s), show_mask={}", options.frames, options.show_mask);

    while frame_count < options.frames {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let captured = source.next_frame().context("Failed to capture frame")?;
        total_capture_time += capture_start.elapsed();

        let meta = FrameMetadata::for_frame(&captured.image, captured.facing);
        let (mask_width, mask_height) = options.mask_size.unwrap_or(meta.dimensions());

        // Composite
        let composite_start = Instant::now();
        let output_frame = match (&captured.mask, options.show_mask) {
            (Some(mask), true) => compositor
                .refine_mask(mask, mask_width, mask_height, options.label)
                .context("Failed to refine mask")?
                .to_image(),
            (mask, _) => compositor
                .process_scaled_frame(
                    &captured.image,
                    mask.as_deref(),
                    mask_width,
                    mask_height,
                    options.label,
                    &meta,
                )
                .context("Failed to composite frame")?,
        };
        total_composite_time += composite_start.elapsed();

        // Output frame
        let output_start = Instant::now();
        output
            .write_frame(&output_frame)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 || frame_count == options.frames {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_composite_ms =
                total_composite_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_composite_ms + avg_output_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, composite={:.1}ms, output={:.1}ms, \
                 total={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_composite_ms,
                avg_output_ms,
                total_ms,
                if total_ms > 0.0 { 1000.0 / total_ms } else { 0.0 }
            );
        }

        // Frame rate limiting
        if let Some(frame_duration) = frame_duration {
            let elapsed = loop_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    Ok(())
}
