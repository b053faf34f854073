//! Frame store: loading and validating binary frame datasets.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::error::{Result, WavescopeError};
use crate::layout::{FrameLayout, SliceId};

/// A flat buffer of decoded `f32` samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBuffer {
    values: Vec<f32>,
}

impl FrameBuffer {
    /// Wraps already-decoded samples.
    #[must_use]
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Decodes little-endian `f32` samples.
    ///
    /// Trailing bytes that do not form a whole sample are ignored.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let chunks = bytes.chunks_exact(4);
        let remainder = chunks.remainder().len();
        if remainder != 0 {
            log::warn!("ignoring {remainder} trailing byte(s) in frame dataset");
        }
        let values = chunks
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self { values }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the buffer holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Samples of one slice, bounds-checked against both the layout and the buffer.
    pub fn slice(&self, layout: &FrameLayout, frame: usize, slice: SliceId) -> Result<&[f32]> {
        let range = layout.slice_range(frame, slice)?;
        if range.end > self.values.len() {
            return Err(WavescopeError::DatasetTruncated {
                end: range.end,
                len: self.values.len(),
            });
        }
        Ok(&self.values[range])
    }
}

/// Reads and decodes a dataset file.
pub fn load(path: impl AsRef<Path>) -> Result<FrameBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let buffer = FrameBuffer::from_le_bytes(&bytes);
    if buffer.is_empty() {
        return Err(WavescopeError::EmptyDataset);
    }
    log::info!(
        "loaded frame dataset {} ({} floats)",
        path.display(),
        buffer.len()
    );
    Ok(buffer)
}

/// Encodes samples in the dataset wire format (little-endian `f32`, no header).
#[must_use]
pub fn encode_frames(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// A frame buffer validated against its expected shape.
#[derive(Debug, Clone)]
pub struct Dataset {
    buffer: FrameBuffer,
    layout: FrameLayout,
    expected_frames: usize,
    notice: Option<String>,
}

impl Dataset {
    /// Validates `buffer` against `grid_size` and `expected_frames`.
    ///
    /// A buffer shorter than `expected_frames` complete frames is accepted with
    /// the frame count clamped to what is present and a notice attached.
    pub fn new(buffer: FrameBuffer, grid_size: usize, expected_frames: usize) -> Result<Self> {
        let declared = FrameLayout::new(grid_size, expected_frames)?;
        if buffer.is_empty() {
            return Err(WavescopeError::EmptyDataset);
        }
        if buffer.len() < declared.frame_len() {
            return Err(WavescopeError::DatasetTooShort {
                available: buffer.len(),
                frame_len: declared.frame_len(),
            });
        }

        let playable = declared.playable_frames(buffer.len());
        let notice = if playable < expected_frames {
            let msg = format!(
                "dataset holds {} floats, expected {}: showing {playable} of {expected_frames} frames",
                buffer.len(),
                declared.required_len()
            );
            log::warn!("{msg}");
            Some(msg)
        } else {
            None
        };

        Ok(Self {
            buffer,
            layout: declared.with_frame_count(playable),
            expected_frames,
            notice,
        })
    }

    /// Layout clamped to the playable frames.
    #[must_use]
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Number of playable frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.layout.frame_count()
    }

    /// Frame count the caller asked for.
    #[must_use]
    pub fn expected_frames(&self) -> usize {
        self.expected_frames
    }

    /// Set when the dataset was shorter than expected.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Samples of one slice.
    pub fn slice(&self, frame: usize, slice: SliceId) -> Result<&[f32]> {
        self.buffer.slice(&self.layout, frame, slice)
    }
}

/// Result of polling a [`PendingLoad`].
#[derive(Debug)]
pub enum LoadPoll {
    /// The loader is still running.
    Pending,
    /// The dataset bytes were read and decoded.
    Ready(FrameBuffer),
    /// Loading failed; the load is terminal.
    Failed(WavescopeError),
    /// The load was cancelled before its result was committed.
    Cancelled,
}

/// A one-shot dataset load running on a background thread.
///
/// Cancelling (explicitly or by dropping) guarantees the result is never
/// handed back to the owner, even if the thread finishes afterwards.
pub struct PendingLoad {
    path: PathBuf,
    cancelled: Arc<AtomicBool>,
    receiver: Receiver<Result<FrameBuffer>>,
    finished: bool,
}

impl PendingLoad {
    /// Starts loading `path` in the background.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cancelled = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        let thread_path = path.clone();
        let thread_cancelled = Arc::clone(&cancelled);
        thread::spawn(move || {
            let result = load(&thread_path);
            if thread_cancelled.load(Ordering::Acquire) {
                log::debug!("discarding cancelled load of {}", thread_path.display());
                return;
            }
            // The receiver may already be gone; nothing to report then.
            let _ = sender.send(result);
        });

        Self {
            path,
            cancelled,
            receiver,
            finished: false,
        }
    }

    /// Path being loaded.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks the load cancelled. Subsequent polls return [`LoadPoll::Cancelled`].
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Non-blocking check for the load result.
    pub fn poll(&mut self) -> LoadPoll {
        if self.is_cancelled() {
            return LoadPoll::Cancelled;
        }
        if self.finished {
            return LoadPoll::Pending;
        }
        match self.receiver.try_recv() {
            Ok(Ok(buffer)) => {
                self.finished = true;
                LoadPoll::Ready(buffer)
            }
            Ok(Err(err)) => {
                self.finished = true;
                LoadPoll::Failed(err)
            }
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                LoadPoll::Failed(WavescopeError::LoaderDisconnected(
                    self.path.display().to_string(),
                ))
            }
        }
    }

    /// Blocks until the load completes. Used by tests and batch tools.
    pub fn wait(mut self) -> LoadPoll {
        if self.is_cancelled() {
            return LoadPoll::Cancelled;
        }
        let result = self.receiver.recv();
        self.finished = true;
        match result {
            Ok(Ok(buffer)) => LoadPoll::Ready(buffer),
            Ok(Err(err)) => LoadPoll::Failed(err),
            Err(_) => LoadPoll::Failed(WavescopeError::LoaderDisconnected(
                self.path.display().to_string(),
            )),
        }
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.cancel();
    }
}
