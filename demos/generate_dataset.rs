//! Writes a synthetic wavepacket-tunneling dataset in the binary frame format.
//!
//! A Gaussian packet travels along +x toward a thin potential barrier at
//! x = 0, then splits into a transmitted and a reflected packet. Main slices
//! hold the probability density; ghost slices hold the barrier potential.
//!
//! Usage: cargo run --example generate_dataset -- [output] [frames]

use std::path::Path;

use wavescope::{encode_frames, SliceId, SliceKind, GRID_SIZE, SLICES_PER_FRAME};

/// Frames written when no count is given.
pub const DEFAULT_FRAMES: usize = 120;

const PACKET_WIDTH: f32 = 0.18;
const WAVE_NUMBER: f32 = 18.0;
const TRANSMISSION: f32 = 0.35;
const BARRIER_WIDTH: f32 = 0.04;

/// Probability density at `p` (domain `[-1, 1]^3`) at normalized time `t` in `[0, 1]`.
fn density(p: wavescope::Vec3, t: f32) -> f32 {
    let travel = -0.8 + 1.6 * t;
    let transverse = (-(p.y * p.y + p.z * p.z) / (2.0 * PACKET_WIDTH * PACKET_WIDTH)).exp();
    let packet = |center: f32| {
        let dx = p.x - center;
        (-(dx * dx) / (2.0 * PACKET_WIDTH * PACKET_WIDTH)).exp()
    };

    let along = if travel < 0.0 {
        // Incoming packet interfering with its own reflection near the barrier
        let fringes = 1.0 + 0.6 * (-(travel * travel) / 0.05).exp() * (2.0 * WAVE_NUMBER * p.x).cos();
        packet(travel) * fringes
    } else {
        TRANSMISSION * packet(travel) + (1.0 - TRANSMISSION) * packet(-travel)
    };
    (along * transverse).max(0.0)
}

fn potential(p: wavescope::Vec3) -> f32 {
    (-(p.x * p.x) / (2.0 * BARRIER_WIDTH * BARRIER_WIDTH)).exp()
}

/// Samples every frame into one flat buffer in dataset order.
pub fn synthesize(frames: usize, n: usize) -> Vec<f32> {
    let step = 2.0 / (n - 1) as f32;
    let mut values = Vec::with_capacity(frames * SLICES_PER_FRAME * n * n);

    for frame in 0..frames {
        let t = frame as f32 / (frames.max(2) - 1) as f32;
        for id in SliceId::ALL {
            for col in 0..n {
                for row in 0..n {
                    let u = row as f32 * step - 1.0;
                    let v = col as f32 * step - 1.0;
                    let p = id.axis.place(u, v, 0.0);
                    values.push(match id.kind {
                        SliceKind::Main => density(p, t),
                        SliceKind::Ghost => potential(p),
                    });
                }
            }
        }
    }
    values
}

/// Writes `frames` frames to `path`.
pub fn write_dataset(path: &Path, frames: usize) -> std::io::Result<()> {
    let values = synthesize(frames, GRID_SIZE);
    std::fs::write(path, encode_frames(&values))?;
    log::info!(
        "wrote {} frames ({} floats) to {}",
        frames,
        values.len(),
        path.display()
    );
    Ok(())
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "tunneling.bin".to_string());
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    write_dataset(Path::new(&output), frames)?;
    println!("{output}: {frames} frames of {SLICES_PER_FRAME} slices, N = {GRID_SIZE}");
    Ok(())
}
