//! Headless preview: runs the compression pass over a scrolling test
//! pattern and logs each frame's classification.
//!
//! Usage: `codec-preview [preset.toml] [frames] [--preview]`

use std::path::Path;

use codec_artifacts::compression::{
    CadenceState, CompressionPass, Extent, FilterMode, FrameInput,
    FrameOutcome, PlaybackMode,
};
use codec_artifacts::gpu::{
    frame::WgpuFrame, render_context::RenderContext,
    shader_composer::ShaderComposer, texture::GpuImage,
};
use codec_artifacts::options::Options;
use codec_artifacts::postprocess::{
    kernel::WgpuKernel, resample::ResamplePasses,
};
use codec_artifacts::util::frame_timing::FrameTiming;
use codec_artifacts::CodecError;

const RESOLUTION: Extent = Extent::new(640, 360);
const DEFAULT_FRAMES: u32 = 48;

struct Args {
    preset: Option<String>,
    frames: u32,
    playback: PlaybackMode,
}

fn parse_args() -> Args {
    let mut args = Args {
        preset: None,
        frames: DEFAULT_FRAMES,
        playback: PlaybackMode::Live,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--preview" {
            args.playback = PlaybackMode::Preview;
        } else if let Ok(frames) = arg.parse() {
            args.frames = frames;
        } else {
            args.preset = Some(arg);
        }
    }
    args
}

fn input_texture(
    context: &RenderContext,
    label: &str,
    format: wgpu::TextureFormat,
) -> GpuImage {
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: RESOLUTION.width,
            height: RESOLUTION.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    GpuImage::from_texture(&context.device, texture, FilterMode::Bilinear)
}

/// Diagonal bands scrolling right by `offset` pixels.
fn write_pattern(context: &RenderContext, image: &GpuImage, offset: u32) {
    let (w, h) = (RESOLUTION.width, RESOLUTION.height);
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let band = ((x + y + w - offset % w) / 16) % 4;
            let v = (band * 85) as u8;
            pixels.extend_from_slice(&[v, 255 - v, (x % 256) as u8, 255]);
        }
    }
    context.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &image.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(w * 4),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
}

fn run(args: &Args) -> Result<(), CodecError> {
    let options = match &args.preset {
        Some(path) => Options::load(Path::new(path))?,
        None => Options::default(),
    };
    let config = options.compression.to_config();

    let context = pollster::block_on(RenderContext::headless())?;
    let mut composer = ShaderComposer::new()?;
    let resample = ResamplePasses::new(&context, &mut composer)?;
    let kernel = WgpuKernel::reference(&context, &mut composer)?;

    let source = input_texture(
        &context,
        "Preview Source",
        wgpu::TextureFormat::Rgba8Unorm,
    );
    // Motion vectors stay zero: the pattern's motion is not reported.
    let motion = input_texture(
        &context,
        "Preview Motion",
        wgpu::TextureFormat::Rgba16Float,
    );
    let destination =
        GpuImage::destination(&context.device, RESOLUTION, "Preview Output");

    let mut pass = CompressionPass::with_kernel(config, kernel);
    let mut setup_frame = WgpuFrame::new(&context, &resample);
    pass.setup(&mut setup_frame, RESOLUTION)?;
    setup_frame.submit();

    let mut cadence = CadenceState::default();
    let mut timing = FrameTiming::new(30);
    for n in 0..args.frames {
        write_pattern(&context, &source, n * 4);

        let mut frame = WgpuFrame::new(&context, &resample);
        let outcome = pass.process_frame(
            &mut frame,
            &mut cadence,
            &FrameInput {
                source: &source,
                destination: &destination,
                motion_vectors: &motion,
                playback: args.playback,
            },
        )?;
        frame.submit();

        match outcome {
            FrameOutcome::Processed(report) => log::info!(
                "frame {n:>4}: {:?}, next I-frame in {}, history {}",
                report.classification.kind,
                report.classification.frames_until_next_iframe,
                report.history_extent
            ),
            FrameOutcome::Inactive => log::info!("frame {n:>4}: inactive"),
        }

        std::thread::sleep(timing.remaining());
        timing.end_frame();
    }

    log::info!(
        "{} frames, {:.1} fps (smoothed)",
        timing.frames(),
        timing.fps()
    );
    pass.teardown();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = parse_args();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
