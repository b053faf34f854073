//! Integration tests for the windowless viewer session.
//!
//! Tests that require a window (show()) are marked #[ignore]
//! and should be run manually with: cargo test -- --ignored

use std::path::PathBuf;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use wavescope::*;

const N: usize = GRID_SIZE;
const FRAME_LEN: usize = SLICES_PER_FRAME * N * N;

fn all_ones(frames: usize) -> FrameBuffer {
    FrameBuffer::from_values(vec![1.0; frames * FRAME_LEN])
}

/// Frame `f` holds the value `f + 1` everywhere.
fn ramp(frames: usize) -> FrameBuffer {
    let values = (0..frames)
        .flat_map(|f| std::iter::repeat((f + 1) as f32).take(FRAME_LEN))
        .collect();
    FrameBuffer::from_values(values)
}

fn viewer_over(buffer: FrameBuffer, expected_frames: usize) -> QuantumViewer {
    let config = ViewerConfig::new("in-memory.bin", expected_frames);
    let dataset = Dataset::new(buffer, N, expected_frames).unwrap();
    QuantumViewer::from_dataset(config, dataset).unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("wavescope_{}_{name}", std::process::id()))
}

/// Polls until the load leaves the loading state.
fn wait_for_load(viewer: &mut QuantumViewer) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while matches!(viewer.load_state(), LoadState::Loading(_)) {
        assert!(Instant::now() < deadline, "dataset load did not finish");
        viewer.poll_load();
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_from_dataset_starts_ready() {
    let viewer = viewer_over(ramp(3), 3);
    assert!(viewer.is_ready());
    assert!(matches!(viewer.load_state(), LoadState::Ready(_)));
    assert_eq!(viewer.slices().frame(), Some(0));
    assert_eq!(viewer.playback().frame_count(), 3);
}

#[test]
fn test_invalid_grid_size_is_rejected() {
    for grid_size in [0, 1] {
        let mut config = ViewerConfig::new(temp_path("never_read.bin"), 2);
        config.options.grid_size = grid_size;
        let err = QuantumViewer::new(config).unwrap_err();
        assert!(matches!(err, WavescopeError::InvalidGridSize(n) if n == grid_size));
    }

    let mut config = ViewerConfig::new("in-memory.bin", 1);
    config.options.grid_size = 1;
    let dataset = Dataset::new(all_ones(1), N, 1).unwrap();
    assert!(matches!(
        QuantumViewer::from_dataset(config, dataset),
        Err(WavescopeError::InvalidGridSize(1))
    ));
}

#[test]
fn test_physical_height_of_all_ones() {
    let viewer = viewer_over(all_ones(2), 2);
    assert_eq!(viewer.frame_count(), 2);
    assert!(viewer.notice().is_none());

    for grid in viewer.slices().mains() {
        for i in 0..N * N {
            assert!((grid.height(i) - 10.0).abs() < 1e-4, "height {}", grid.height(i));
        }
    }
}

#[test]
fn test_enhanced_height_of_all_ones() {
    let mut viewer = viewer_over(all_ones(2), 2);
    let params = TransferParams {
        mode: HeightMode::Enhanced,
        threshold: 0.5,
        ..*viewer.params()
    };
    viewer.set_params(params);
    assert!(viewer.update(Instant::now()).unwrap());

    let expected = 3.0_f32.log10() * (10.0 * 0.08);
    for grid in viewer.slices().mains() {
        for i in [0, N - 1, N * N / 2, N * N - 1] {
            assert!((grid.height(i) - expected).abs() < 1e-4);
        }
    }
}

#[test]
fn test_short_buffer_is_clamped_with_notice() {
    let values = vec![0.5; FRAME_LEN * 3 + 17];
    let viewer = viewer_over(FrameBuffer::from_values(values), 5);

    assert_eq!(viewer.frame_count(), 3);
    assert_eq!(viewer.playback().frame_count(), 3);
    assert!(viewer.notice().is_some_and(|n| n.contains("3 of 5")));
    for (_, grid) in viewer.slices().iter() {
        assert!(grid.positions().iter().all(|p| p.is_finite()));
        assert!(grid.normals().iter().all(|n| n.is_finite()));
        assert!(grid.colors().iter().all(|c| c.is_finite()));
    }
}

#[test]
fn test_playback_wraps_and_rebuilds() {
    let mut viewer = viewer_over(ramp(3), 3);
    let start = Instant::now();
    viewer.toggle_play(start);
    let interval = viewer.playback().interval();

    let mut now = start;
    let mut seen = Vec::new();
    for _ in 0..3 {
        now += interval;
        assert!(viewer.update(now).unwrap());
        seen.push(viewer.frame());
    }
    assert_eq!(seen, vec![1, 2, 0]);

    // Frame 0 holds ones, so the physical height is back at the scale.
    let grid = viewer.slices().grid(SliceId::main(SliceAxis::Y));
    assert!((grid.height(0) - 10.0).abs() < 1e-4);
    assert_eq!(viewer.slices().frame(), Some(0));
}

#[test]
fn test_toggle_then_teardown_freezes_frame() {
    let mut viewer = viewer_over(ramp(4), 4);
    let start = Instant::now();
    viewer.toggle_play(start);
    viewer.teardown();

    let frame = viewer.frame();
    let later = start + Duration::from_secs(5);
    assert!(!viewer.update(later).unwrap());
    viewer.toggle_play(later);
    viewer.scrub(3);
    viewer.reset();
    assert!(!viewer.update(later + Duration::from_secs(1)).unwrap());
    assert_eq!(viewer.frame(), frame);
    assert!(!viewer.playback().is_playing());
}

#[test]
fn test_scrub_and_reset() {
    let mut viewer = viewer_over(ramp(4), 4);
    viewer.scrub(99);
    assert_eq!(viewer.frame(), 3);
    assert!(viewer.update(Instant::now()).unwrap());
    let grid = viewer.slices().grid(SliceId::main(SliceAxis::X));
    assert!((grid.height(5) - 40.0).abs() < 1e-3);

    viewer.toggle_play(Instant::now());
    viewer.reset();
    assert_eq!(viewer.frame(), 0);
    assert!(!viewer.playback().is_playing());
}

#[test]
fn test_params_are_sanitized() {
    let mut viewer = viewer_over(all_ones(1), 1);
    viewer.set_params(TransferParams {
        gamma: 50.0,
        threshold: -3.0,
        height_scale: f32::NAN,
        ..*viewer.params()
    });
    let ranges = ParameterRanges::default();
    assert_eq!(viewer.params().gamma, ranges.gamma.max);
    assert_eq!(viewer.params().threshold, ranges.threshold.min);
    assert_eq!(viewer.params().height_scale, ranges.height_scale.min);
}

#[test]
fn test_ghost_slices_use_accent_color() {
    let viewer = viewer_over(all_ones(1), 1);
    let options = ViewerOptions::default();
    for grid in viewer.slices().ghosts() {
        assert!(grid.is_ghost());
        let c = grid.colors()[0];
        assert_eq!(c.truncate(), options.ghost_color);
        assert!((c.w - viewer.params().ghost_opacity).abs() < 1e-6);
    }
}

#[test]
fn test_load_from_file() {
    let path = temp_path("frames.bin");
    let values: Vec<f32> = (0..2 * FRAME_LEN).map(|i| (i % 7) as f32 * 0.1).collect();
    std::fs::write(&path, encode_frames(&values)).unwrap();

    let mut viewer = QuantumViewer::new(ViewerConfig::new(&path, 2)).unwrap();
    assert!(!viewer.is_ready());
    viewer.toggle_play(Instant::now());
    assert!(!viewer.playback().is_playing(), "play is ignored while loading");

    wait_for_load(&mut viewer);
    assert!(viewer.is_ready());
    assert_eq!(viewer.frame_count(), 2);
    assert_eq!(viewer.slices().frame(), Some(0));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_failure_is_terminal() {
    let path = temp_path("does_not_exist.bin");
    let mut viewer = QuantumViewer::new(ViewerConfig::new(&path, 2)).unwrap();
    wait_for_load(&mut viewer);

    assert!(matches!(viewer.load_state(), LoadState::Failed(_)));
    assert_eq!(viewer.frame_count(), 0);
    assert!(viewer.slices().frame().is_none());
    viewer.toggle_play(Instant::now());
    assert!(!viewer.playback().is_playing());
    assert!(!viewer.poll_load());
}

#[test]
fn test_truncated_file_fails_load() {
    let path = temp_path("too_short.bin");
    std::fs::write(&path, encode_frames(&[1.0; 100])).unwrap();

    let mut viewer = QuantumViewer::new(ViewerConfig::new(&path, 2)).unwrap();
    wait_for_load(&mut viewer);
    assert!(matches!(viewer.load_state(), LoadState::Failed(_)));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_teardown_cancels_pending_load() {
    let path = temp_path("cancelled.bin");
    std::fs::write(&path, encode_frames(&vec![1.0; FRAME_LEN])).unwrap();

    let mut viewer = QuantumViewer::new(ViewerConfig::new(&path, 1)).unwrap();
    viewer.teardown();
    std::thread::sleep(Duration::from_millis(50));
    assert!(!viewer.poll_load());
    assert!(!viewer.is_ready());

    std::fs::remove_file(&path).ok();
}

proptest! {
    #[test]
    fn prop_raising_threshold_never_adds_height(
        seed in proptest::collection::vec(0.0f32..1.0, N * N),
        low in 0.0f32..0.5,
        delta in 0.0f32..0.5,
    ) {
        let count_nonzero = |threshold: f32| {
            let values: Vec<f32> = seed.iter().cycle().take(FRAME_LEN).copied().collect();
            let mut viewer = viewer_over(FrameBuffer::from_values(values), 1);
            viewer.set_params(TransferParams { threshold, ..*viewer.params() });
            viewer.update(Instant::now()).unwrap();
            let grid = viewer.slices().grid(SliceId::main(SliceAxis::Z));
            (0..N * N).filter(|&i| grid.height(i) > 0.0).count()
        };
        prop_assert!(count_nonzero(low + delta) <= count_nonzero(low));
    }
}

#[test]
#[ignore = "requires a window"]
fn test_show_window() {
    let path = temp_path("window.bin");
    std::fs::write(&path, encode_frames(&vec![0.25; 2 * FRAME_LEN])).unwrap();
    show(ViewerConfig::new(&path, 2)).unwrap();
}
