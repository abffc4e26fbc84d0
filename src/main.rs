use anyhow::Result;
use clap::Parser;
use image::{ImageBuffer, Rgb};
use rand::{thread_rng, Rng};
use raymarch::math::{add, mul, V3, O};
use raymarch::presets::{self, Preset};
use raymarch::shade::{shade, InteractionState};
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 512)]
    size: u32,

    #[arg(short, long, default_value_t = 2)]
    antialias: u32,

    #[arg(long, default_value = "showcase")]
    scene: String,

    #[arg(short, long, default_value = "out.png")]
    out: String,

    /// camera rotation about the vertical axis, radians
    #[arg(long, default_value_t = 0.)]
    angle: f64,

    /// scene time driving the light animation
    #[arg(long, default_value_t = 0.)]
    time: f64,

    /// randomize subpixel sample positions instead of a fixed grid
    #[arg(long, default_value_t = false)]
    jitter: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let preset = presets::build(
        &args.scene,
        InteractionState {
            rotation_angle: args.angle,
            light_phase: args.time,
        },
    )?;

    let w = args.size;
    let h = args.size;
    info!(scene = %args.scene, size = w, antialias = args.antialias, "rendering");
    let start = Instant::now();
    let pixels: Vec<V3> = (0..(w * h) as usize)
        .into_par_iter()
        .map(|i| (i as u32 % w, i as u32 / w))
        .map(|(x, y)| render_pixel(&preset, x, y, w, h, args.antialias, args.jitter))
        .collect();
    info!(elapsed_s = start.elapsed().as_secs_f32(), "render finished");

    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(w, h);
    for (x, y, p) in img.enumerate_pixels_mut() {
        let color = pixels[(x + y * w) as usize];
        *p = Rgb([
            (color.x * 255.) as u8,
            (color.y * 255.) as u8,
            (color.z * 255.) as u8,
        ]);
    }
    img.save(&args.out)?;
    info!(out = %args.out, "saved");
    Ok(())
}

fn render_pixel(preset: &Preset, x: u32, y: u32, w: u32, h: u32, antialias: u32, jitter: bool) -> V3 {
    let mut rng = thread_rng();
    let n = antialias.max(1);
    let mut sum = O;
    for sx in 0..n {
        for sy in 0..n {
            let (jx, jy) = if jitter {
                (rng.gen::<f64>(), rng.gen::<f64>())
            } else {
                (0.5, 0.5)
            };
            let px = x as f64 + (sx as f64 + jx) / n as f64;
            let py = y as f64 + (sy as f64 + jy) / n as f64;
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
