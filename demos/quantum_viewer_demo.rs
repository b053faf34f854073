//! Opens the viewer on the synthetic tunneling dataset, generating it first if missing.
//!
//! Controls: left drag orbits, right or shift drag pans, the wheel zooms,
//! Space toggles playback and Escape quits.

#[path = "generate_dataset.rs"]
#[allow(dead_code)]
mod generate_dataset;

use std::path::PathBuf;

use wavescope::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| std::env::temp_dir().join("wavescope_tunneling.bin"), PathBuf::from);
    let frames = generate_dataset::DEFAULT_FRAMES;

    if !path.exists() {
        generate_dataset::write_dataset(&path, frames)?;
    }

    let mut config = ViewerConfig::new(path, frames)
        .with_title("wavepacket tunneling")
        .with_display_height(800);
    config.options.transfer = TransferParams {
        mode: HeightMode::Enhanced,
        threshold: 0.02,
        gamma: 0.6,
        ..TransferParams::default()
    };

    show(config)?;
    Ok(())
}
