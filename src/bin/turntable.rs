use anyhow::Result;
use clap::Parser;
use image::{ImageBuffer, Rgb};
use raymarch::math::{add, mul, V3, O};
use raymarch::presets::{self, Preset};
use raymarch::shade::{shade, InteractionState};
use rayon::prelude::*;
use std::f64::consts::TAU;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Renders one full camera revolution as a frame sequence; the host state
/// (rotation angle, light phase) advances once per frame.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 384)]
    size: u32,

    #[arg(short, long, default_value_t = 1)]
    antialias: u32,

    #[arg(long, default_value = "showcase")]
    scene: String,

    #[arg(short, long, default_value_t = 36)]
    frames: u32,

    #[arg(short, long, default_value = "frames")]
    out_dir: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)?;

    let start = Instant::now();
    for frame in 0..args.frames {
        let turn = frame as f64 / args.frames as f64;
        let state = InteractionState {
            rotation_angle: TAU * turn,
            light_phase: TAU * turn * 2.,
        };
        let preset = presets::build(&args.scene, state)?;
        let img = render_frame(&preset, args.size, args.antialias);
        let path = Path::new(&args.out_dir).join(format!("frame_{frame:03}.png"));
        img.save(&path)?;
        info!(frame, frames = args.frames, "frame saved");
    }
    info!(elapsed_s = start.elapsed().as_secs_f32(), "sequence finished");
    Ok(())
}

fn render_frame(preset: &Preset, size: u32, antialias: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let w = size;
    let h = size;
    let pixels: Vec<V3> = (0..(w * h) as usize)
        .into_par_iter()
        .map(|i| (i as u32 % w, i as u32 / w))
        .map(|(x, y)| render_pixel(preset, x, y, w, h, antialias))
        .collect();
    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(w, h);
    for (x, y, p) in img.enumerate_pixels_mut() {
        let color = pixels[(x + y * w) as usize];
        *p = Rgb([
            (color.x * 255.) as u8,
            (color.y * 255.) as u8,
            (color.z * 255.) as u8,
        ]);
    }
    img
}

fn render_pixel(preset: &Preset, x: u32, y: u32, w: u32, h: u32, antialias: u32) -> V3 {
    let n = antialias.max(1);
    let mut sum = O;
    for sx in 0..n {
        for sy in 0..n {
            let px = x as f64 + (sx as f64 + 0.5) / n as f64;
            let py = y as f64 + (sy as f64 + 0.5) / n as f64;
            let rd = preset.camera.ray_dir(ndc_u(px, w, h), ndc_v(py, h), preset.focal);
            let rdx = preset
                .camera
                .ray_dir(ndc_u(px + 1., w, h), ndc_v(py, h), preset.focal);
            let rdy = preset
                .camera
                .ray_dir(ndc_u(px, w, h), ndc_v(py + 1., h), preset.focal);
            let color = shade(
                &preset.scene,
                &preset.config,
                &preset.light,
                &preset.camera.position,
                &rd,
                &rdx,
                &rdy,
            );
            sum = add(&sum, &color);
        }
    }
    mul(1. / (n * n) as f64, &sum)
}

fn ndc_u(px: f64, w: u32, h: u32) -> f64 {
    (2. * px - w as f64) / h as f64
}

fn ndc_v(py: f64, h: u32) -> f64 {
    (h as f64 - 2. * py) / h as f64
}
