//! Parameter controls, animated scenes and the cancellable frame loop.

mod controls;
mod frame_loop;
mod scenes;

use crate::render::Canvas;

pub use controls::{ParamControl, ParamError, ParamSet, RenderFn, VisualizationCanvas};
pub use frame_loop::{FrameLoop, FrameSink, LoopSummary, PngSequence, StopHandle};

/// Something that can be drawn frame by frame.
pub trait Scene {
    /// Move to the next frame; `false` once there is nothing left to show.
    fn advance(&mut self) -> bool;

    /// Draw the current frame onto an already cleared canvas.
    fn render(&mut self, canvas: &mut Canvas);
}
