//! Windowless viewer session: dataset loading, playback and slice geometry.

use std::time::Instant;

use wavescope_core::{
    Dataset, FrameLayout, LoadPoll, PendingLoad, Playback, Result, TransferParams, ViewerConfig,
};
use wavescope_structures::SliceSet;
use wavescope_ui::LoadStatus;

/// Where the session is in its one-shot dataset load.
pub enum LoadState {
    /// Background load in flight.
    Loading(PendingLoad),
    /// Dataset installed and playable.
    Ready(Dataset),
    /// Load failed; terminal for this session.
    Failed(String),
}

impl std::fmt::Debug for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Loading(pending) => {
                f.debug_tuple("Loading").field(&pending.path()).finish()
            }
            LoadState::Ready(dataset) => f
                .debug_tuple("Ready")
                .field(&dataset.frame_count())
                .finish(),
            LoadState::Failed(message) => f.debug_tuple("Failed").field(message).finish(),
        }
    }
}

fn log_ready(dataset: &Dataset) {
    log::info!(
        "dataset ready: {} of {} frames",
        dataset.frame_count(),
        dataset.expected_frames()
    );
}

/// One viewer instance.
///
/// Owns the frame cursor, the transfer parameters and the six slice meshes.
/// All mutation happens through `&mut self` on the UI thread; the only other
/// thread is the dataset loader owned by [`LoadState::Loading`].
#[derive(Debug)]
pub struct QuantumViewer {
    config: ViewerConfig,
    load: LoadState,
    playback: Playback,
    params: TransferParams,
    slices: SliceSet,
    needs_rebuild: bool,
}

impl QuantumViewer {
    /// Creates a session and starts loading the configured dataset in the background.
    ///
    /// Fails without spawning the loader if the configured grid size cannot
    /// describe a slice.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        FrameLayout::new(config.options.grid_size, config.frame_count)?;
        log::info!(
            "opening {} ({} frames expected)",
            config.dataset_path.display(),
            config.frame_count
        );
        let pending = PendingLoad::spawn(config.dataset_path.clone());
        Self::with_load_state(config, LoadState::Loading(pending))
    }

    /// Creates a session over an already decoded dataset.
    pub fn from_dataset(config: ViewerConfig, dataset: Dataset) -> Result<Self> {
        Self::with_load_state(config, LoadState::Ready(dataset))
    }

    fn with_load_state(config: ViewerConfig, load: LoadState) -> Result<Self> {
        let options = &config.options;
        let ranges = &options.ranges;
        FrameLayout::new(options.grid_size, config.frame_count)?;
        let mut playback = Playback::new(
            config.frame_count,
            options.fps,
            ranges.fps_min..=ranges.fps_max,
        );
        let params = options.transfer.sanitized(ranges);
        let mut slices = SliceSet::from_options(options);
        if let LoadState::Ready(dataset) = &load {
            playback.set_frame_count(dataset.frame_count());
            slices.update_frame(dataset, playback.frame(), &params)?;
            log_ready(dataset);
        }
        Ok(Self {
            config,
            load,
            playback,
            params,
            slices,
            needs_rebuild: false,
        })
    }

    fn install(&mut self, dataset: Dataset) -> Result<()> {
        self.playback.set_frame_count(dataset.frame_count());
        self.slices
            .update_frame(&dataset, self.playback.frame(), &self.params)?;
        log_ready(&dataset);
        self.load = LoadState::Ready(dataset);
        self.needs_rebuild = false;
        Ok(())
    }

    fn fail(&mut self, message: String) {
        log::error!("failed to load {}: {message}", self.config.dataset_path.display());
        self.playback.pause();
        self.load = LoadState::Failed(message);
    }

    /// Checks the background loader. Returns true if the load state changed.
    pub fn poll_load(&mut self) -> bool {
        if self.playback.is_torn_down() {
            return false;
        }
        let LoadState::Loading(pending) = &mut self.load else {
            return false;
        };
        match pending.poll() {
            LoadPoll::Pending => false,
            LoadPoll::Ready(buffer) => {
                let options = &self.config.options;
                let installed = Dataset::new(buffer, options.grid_size, self.config.frame_count)
                    .and_then(|dataset| self.install(dataset));
                if let Err(err) = installed {
                    self.fail(err.to_string());
                }
                true
            }
            LoadPoll::Failed(err) => {
                self.fail(err.to_string());
                true
            }
            LoadPoll::Cancelled => {
                self.fail("load cancelled".to_string());
                true
            }
        }
    }

    /// Runs one update pass: polls the loader, advances playback if a tick is
    /// due and rebuilds the slice meshes when the frame or parameters changed.
    ///
    /// Returns true if the slice geometry changed.
    pub fn update(&mut self, now: Instant) -> Result<bool> {
        let loaded = self.poll_load();
        let ticked = self.playback.tick(now);
        if ticked {
            self.needs_rebuild = true;
        }
        let rebuilt = self.rebuild()?;
        Ok(rebuilt || (loaded && self.is_ready()))
    }

    fn rebuild(&mut self) -> Result<bool> {
        if !self.needs_rebuild {
            return Ok(false);
        }
        let LoadState::Ready(dataset) = &self.load else {
            return Ok(false);
        };
        self.slices
            .update_frame(dataset, self.playback.frame(), &self.params)?;
        self.needs_rebuild = false;
        Ok(true)
    }

    /// Toggles play/pause. Ignored until the dataset is ready.
    pub fn toggle_play(&mut self, now: Instant) {
        if self.is_ready() {
            self.playback.toggle(now);
        }
    }

    /// Pauses playback.
    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Scrubs to `frame` (clamped) without changing play state.
    pub fn scrub(&mut self, frame: usize) {
        let before = self.playback.frame();
        self.playback.set_frame(frame);
        self.needs_rebuild |= self.playback.frame() != before;
    }

    /// Pauses and returns to frame 0.
    pub fn reset(&mut self) {
        let before = self.playback.frame();
        self.playback.reset();
        self.needs_rebuild |= self.playback.frame() != before;
    }

    /// Replaces the transfer parameters, clamped to the configured ranges.
    pub fn set_params(&mut self, params: TransferParams) {
        let params = params.sanitized(&self.config.options.ranges);
        if params != self.params {
            self.params = params;
            self.needs_rebuild = true;
        }
    }

    /// Changes the playback rate.
    pub fn set_fps(&mut self, fps: u32, now: Instant) {
        self.playback.set_fps(fps, now);
    }

    /// Stops playback for good and cancels any pending load.
    pub fn teardown(&mut self) {
        if self.playback.is_torn_down() {
            return;
        }
        self.playback.teardown();
        if let LoadState::Loading(pending) = &mut self.load {
            pending.cancel();
        }
        log::debug!("viewer torn down at frame {}", self.playback.frame());
    }

    /// Viewer configuration.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Load state.
    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Returns true once the dataset is installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.load, LoadState::Ready(_))
    }

    /// Load status for the control panel.
    #[must_use]
    pub fn status(&self) -> LoadStatus<'_> {
        match &self.load {
            LoadState::Loading(_) => LoadStatus::Loading,
            LoadState::Ready(_) => LoadStatus::Ready,
            LoadState::Failed(message) => LoadStatus::Failed(message),
        }
    }

    /// Truncation notice, if the dataset was shorter than expected.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match &self.load {
            LoadState::Ready(dataset) => dataset.notice(),
            _ => None,
        }
    }

    /// Installed dataset.
    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.load {
            LoadState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Playback scheduler.
    #[must_use]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Current frame index.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.playback.frame()
    }

    /// Number of playable frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.dataset().map_or(0, Dataset::frame_count)
    }

    /// Current transfer parameters.
    #[must_use]
    pub fn params(&self) -> &TransferParams {
        &self.params
    }

    /// Slice meshes. Empty of data until the dataset is ready.
    #[must_use]
    pub fn slices(&self) -> &SliceSet {
        &self.slices
    }

    /// Mutable slice meshes, for draining dirty flags after upload.
    pub fn slices_mut(&mut self) -> &mut SliceSet {
        &mut self.slices
    }

    /// When the next playback tick is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.playback.next_deadline()
    }
}

impl Drop for QuantumViewer {
    fn drop(&mut self) {
        self.teardown();
    }
}
