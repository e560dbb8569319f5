use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::Scene;
use crate::render::{Canvas, RenderError, palette};

/// Destination for rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, index: usize, canvas: &Canvas) -> Result<(), RenderError>;
}

impl<F> FrameSink for F
where
    F: FnMut(usize, &Canvas) -> Result<(), RenderError>,
{
    fn write_frame(&mut self, index: usize, canvas: &Canvas) -> Result<(), RenderError> {
        self(index, canvas)
    }
}

/// Writes `<dir>/<prefix>_<index>.png` for every frame.
#[derive(Debug, Clone)]
pub struct PngSequence {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl PngSequence {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{index:04}.png", self.prefix))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequence {
    fn write_frame(&mut self, index: usize, canvas: &Canvas) -> Result<(), RenderError> {
        let path = self.frame_path(index);
        canvas.save_png(&path)?;
        self.written.push(path);
        Ok(())
    }
}

/// Cloneable handle that asks a running [`FrameLoop`] to stop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    pub frames: usize,
    pub steps: usize,
    pub cancelled: bool,
}

/// Drives a [`Scene`]: clear, render, hand the frame to a sink, advance.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    max_frames: usize,
    steps_per_frame: usize,
    frame_interval: Duration,
    stop: StopHandle,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl FrameLoop {
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames: max_frames.max(1),
            steps_per_frame: 1,
            frame_interval: Duration::ZERO,
            stop: StopHandle::default(),
        }
    }

    /// Scene steps between two rendered frames.
    pub fn with_steps_per_frame(mut self, steps: usize) -> Self {
        self.steps_per_frame = steps.max(1);
        self
    }

    /// Pause between frames, for live previews.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Render the initial frame, then keep advancing until the scene is done,
    /// `max_frames` frames were written, or the stop handle fires.
    pub fn run<S, K>(
        &self,
        scene: &mut S,
        canvas: &mut Canvas,
        sink: &mut K,
    ) -> Result<LoopSummary, RenderError>
    where
        S: Scene + ?Sized,
        K: FrameSink + ?Sized,
    {
        let mut summary = LoopSummary::default();
        loop {
            if self.stop.is_stopped() {
                summary.cancelled = true;
                break;
            }
            canvas.fill(palette::BACKGROUND);
            scene.render(canvas);
            sink.write_frame(summary.frames, canvas)?;
            summary.frames += 1;
            if summary.frames >= self.max_frames {
                break;
            }
            let mut advanced = 0;
            while advanced < self.steps_per_frame && scene.advance() {
                advanced += 1;
            }
            summary.steps += advanced;
            if advanced == 0 {
                break;
            }
            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }
        tracing::debug!(
            frames = summary.frames,
            steps = summary.steps,
            cancelled = summary.cancelled,
            "frame loop finished"
        );
        Ok(summary)
    }
}
