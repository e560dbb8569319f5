use std::collections::BTreeMap;
use std::fmt;

use super::Scene;
use crate::render::Canvas;

/// A single user-adjustable knob.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamControl {
    Slider {
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    Choice {
        options: Vec<String>,
        selected: usize,
    },
}

impl ParamControl {
    /// Clamp to `[min, max]` and snap to the nearest step from `min`.
    fn snap(min: f64, max: f64, step: f64, value: f64) -> f64 {
        let clamped = value.clamp(min, max);
        if step <= 0.0 || !step.is_finite() {
            return clamped;
        }
        let steps = ((clamped - min) / step).round();
        (min + steps * step).clamp(min, max)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("Unknown parameter: {0}")]
    Unknown(String),
    #[error("Parameter {name} expects a number, got {value:?}")]
    NotANumber { name: String, value: String },
    #[error("Parameter {name} has no option {value:?}")]
    InvalidChoice { name: String, value: String },
}

/// Named controls in declaration-independent (sorted) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    controls: BTreeMap<String, ParamControl>,
}

impl ParamSet {
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.controls.get(name)? {
            ParamControl::Slider { value, .. } => Some(*value),
            ParamControl::Choice { .. } => None,
        }
    }

    /// Slider value rounded to a count; negative values become zero.
    pub fn count(&self, name: &str) -> Option<usize> {
        self.number(name).map(|value| value.round().max(0.0) as usize)
    }

    pub fn choice(&self, name: &str) -> Option<&str> {
        match self.controls.get(name)? {
            ParamControl::Choice { options, selected } => {
                options.get(*selected).map(String::as_str)
            }
            ParamControl::Slider { .. } => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamControl> {
        self.controls.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controls.keys().map(String::as_str)
    }

    fn insert(&mut self, name: &str, control: ParamControl) {
        self.controls.insert(name.to_string(), control);
    }

    /// Parse `raw` according to the control's kind and store it.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), ParamError> {
        let control = self
            .controls
            .get_mut(name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;
        match control {
            ParamControl::Slider {
                min,
                max,
                step,
                value,
            } => {
                let parsed = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ParamError::NotANumber {
                        name: name.to_string(),
                        value: raw.to_string(),
                    })?;
                *value = ParamControl::snap(*min, *max, *step, parsed);
            }
            ParamControl::Choice { options, selected } => {
                let wanted = raw.trim();
                let idx = options
                    .iter()
                    .position(|option| option.eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParamError::InvalidChoice {
                        name: name.to_string(),
                        value: raw.to_string(),
                    })?;
                *selected = idx;
            }
        }
        Ok(())
    }
}

pub type RenderFn = Box<dyn FnMut(&ParamSet, usize, &mut Canvas)>;

/// Parameter controls plus an optional animation over a caller-supplied render callback.
///
/// Changing any parameter restarts the animation at frame zero.
pub struct VisualizationCanvas {
    title: String,
    params: ParamSet,
    render: RenderFn,
    max_frames: Option<usize>,
    frame: usize,
}

impl fmt::Debug for VisualizationCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualizationCanvas")
            .field("title", &self.title)
            .field("params", &self.params)
            .field("max_frames", &self.max_frames)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl VisualizationCanvas {
    pub fn new<F>(title: impl Into<String>, render: F) -> Self
    where
        F: FnMut(&ParamSet, usize, &mut Canvas) + 'static,
    {
        Self {
            title: title.into(),
            params: ParamSet::default(),
            render: Box::new(render),
            max_frames: None,
            frame: 0,
        }
    }

    /// Declare a slider. `min > max` is swapped and the initial value is clamped and snapped.
    pub fn with_slider(mut self, name: &str, min: f64, max: f64, step: f64, value: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let value = ParamControl::snap(min, max, step, value);
        self.params.insert(
            name,
            ParamControl::Slider {
                min,
                max,
                step,
                value,
            },
        );
        self
    }

    /// Declare a choice; an out-of-range `selected` falls back to the first option.
    pub fn with_choice(mut self, name: &str, options: &[&str], selected: usize) -> Self {
        let selected = if selected < options.len() { selected } else { 0 };
        self.params.insert(
            name,
            ParamControl::Choice {
                options: options.iter().map(|option| option.to_string()).collect(),
                selected,
            },
        );
        self
    }

    /// Animate through `max_frames` frames (at least one).
    pub fn with_animation(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames.max(1));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_animated(&self) -> bool {
        self.max_frames.is_some()
    }

    pub fn set_param(&mut self, name: &str, raw: &str) -> Result<(), ParamError> {
        self.params.set(name, raw)?;
        self.frame = 0;
        tracing::debug!(canvas = %self.title, param = name, value = raw, "parameter changed");
        Ok(())
    }
}

impl Scene for VisualizationCanvas {
    fn advance(&mut self) -> bool {
        match self.max_frames {
            Some(max) if self.frame + 1 < max => {
                self.frame += 1;
                true
            }
            _ => false,
        }
    }

    fn render(&mut self, canvas: &mut Canvas) {
        (self.render)(&self.params, self.frame, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample() -> VisualizationCanvas {
        VisualizationCanvas::new("demo", |_, _, _| {})
            .with_slider("k", 1.0, 15.0, 1.0, 3.0)
            .with_choice("init", &["random", "plus_plus"], 1)
    }

    #[test]
    fn slider_values_are_clamped_and_snapped() {
        let mut canvas = sample();
        canvas.set_param("k", "7.4").unwrap();
        assert_eq!(canvas.params().number("k"), Some(7.0));
        canvas.set_param("k", "99").unwrap();
        assert_eq!(canvas.params().count("k"), Some(15));
        canvas.set_param("k", "-3").unwrap();
        assert_eq!(canvas.params().count("k"), Some(1));
    }

    #[test]
    fn choices_match_case_insensitively() {
        let mut canvas = sample();
        assert_eq!(canvas.params().choice("init"), Some("plus_plus"));
        canvas.set_param("init", "RANDOM").unwrap();
        assert_eq!(canvas.params().choice("init"), Some("random"));
    }

    #[test]
    fn bad_input_is_reported() {
        let mut canvas = sample();
        assert_eq!(
            canvas.set_param("nope", "1").unwrap_err(),
            ParamError::Unknown("nope".into())
        );
        assert!(matches!(
            canvas.set_param("k", "abc"),
            Err(ParamError::NotANumber { .. })
        ));
        assert!(matches!(
            canvas.set_param("init", "fancy"),
            Err(ParamError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn animation_stops_at_last_frame_and_restarts_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut scene = VisualizationCanvas::new("anim", move |params, frame, _| {
            log.borrow_mut().push((params.count("k"), frame));
        })
        .with_slider("k", 1.0, 5.0, 1.0, 2.0)
        .with_animation(3);
        let mut target = Canvas::new(4, 4, Bounds::default());
        scene.render(&mut target);
        while scene.advance() {
            scene.render(&mut target);
        }
        assert_eq!(scene.frame(), 2);
        scene.set_param("k", "4").unwrap();
        assert_eq!(scene.frame(), 0);
        scene.render(&mut target);
        assert_eq!(
            *seen.borrow(),
            vec![(Some(2), 0), (Some(2), 1), (Some(2), 2), (Some(4), 0)]
        );
    }

    #[test]
    fn static_canvas_never_advances() {
        let mut canvas = sample();
        assert!(!canvas.advance());
        assert!(!canvas.is_animated());
    }
}
