//! Page runners: each page generates or fetches its data, computes, and writes
//! PNG frames under `<output dir>/<page>/`.
//!
//! Backend calls go through one [`BackendWorker`]. A failed call is logged and the
//! page falls back to its local implementation; the error is kept on the
//! [`PageReport`]. The tree and forest pages have no local fallback.

mod classifiers;
mod clustering;
mod trees;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::animation::{ParamError, PngSequence};
use crate::app_dirs::{self, AppDirError};
use crate::backend::{BackendClient, BackendError, BackendRequest, BackendResponse, BackendWorker};
use crate::clustering::dbscan::DbscanError;
use crate::clustering::kmeans::KMeansError;
use crate::clustering::som::SomError;
use crate::config::{ConfigError, GallerySettings};
use crate::dataset::DatasetError;
use crate::ml::mlp::NetworkError;
use crate::render::{Canvas, RenderError};

const REMOTE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    KMeans,
    Som,
    Dbscan,
    Knn,
    LogReg,
    LinReg,
    Tree,
    Forest,
    Network,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::KMeans,
        Page::Som,
        Page::Dbscan,
        Page::Knn,
        Page::LogReg,
        Page::LinReg,
        Page::Tree,
        Page::Forest,
        Page::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::KMeans => "kmeans",
            Page::Som => "som",
            Page::Dbscan => "dbscan",
            Page::Knn => "knn",
            Page::LogReg => "logreg",
            Page::LinReg => "linreg",
            Page::Tree => "tree",
            Page::Forest => "forest",
            Page::Network => "network",
        }
    }

    /// Settings section that bare `--key` overrides resolve against.
    pub fn settings_section(self) -> &'static str {
        match self {
            Page::KMeans => "kmeans",
            Page::Som => "som",
            Page::Dbscan => "dbscan",
            Page::Knn => "knn",
            Page::LogReg | Page::LinReg => "regression",
            Page::Tree | Page::Forest => "trees",
            Page::Network => "network",
        }
    }

    pub fn needs_backend(self) -> bool {
        matches!(self, Page::Tree | Page::Forest)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = GalleryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let page = match value.trim().to_ascii_lowercase().as_str() {
            "kmeans" | "k-means" => Page::KMeans,
            "som" => Page::Som,
            "dbscan" => Page::Dbscan,
            "knn" => Page::Knn,
            "logreg" | "logistic" => Page::LogReg,
            "linreg" | "linear" => Page::LinReg,
            "tree" | "decision-tree" => Page::Tree,
            "forest" | "random-forest" => Page::Forest,
            "network" | "mlp" => Page::Network,
            _ => return Err(GalleryError::UnknownPage(value.to_string())),
        };
        Ok(page)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Unknown page {0:?}")]
    UnknownPage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    KMeans(#[from] KMeansError),
    #[error(transparent)]
    Som(#[from] SomError),
    #[error(transparent)]
    Dbscan(#[from] DbscanError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("Training failed: {0}")]
    Training(String),
    #[error("Backend answered {endpoint} with an unexpected response")]
    UnexpectedResponse { endpoint: &'static str },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What a page run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub page: Page,
    /// PNG frames in the order they were written.
    pub frames: Vec<PathBuf>,
    /// Other files (JSON dumps of backend results).
    pub artifacts: Vec<PathBuf>,
    /// Set when a backend call failed and a local fallback was used instead.
    pub fallback: Option<BackendError>,
    pub summary: String,
}

impl PageReport {
    fn new(page: Page, frames: Vec<PathBuf>, summary: String) -> Self {
        Self {
            page,
            frames,
            artifacts: Vec::new(),
            fallback: None,
            summary,
        }
    }
}

/// Effective settings, output root and backend access shared by every page.
pub struct Gallery {
    settings: GallerySettings,
    output_dir: PathBuf,
    backend: Option<BackendWorker>,
}

impl fmt::Debug for Gallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallery")
            .field("output_dir", &self.output_dir)
            .field("online", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}

impl Gallery {
    /// Frames go to `settings.output_dir`, or the app frames directory when unset.
    pub fn new(settings: GallerySettings) -> Result<Self, GalleryError> {
        let output_dir = match settings.output_dir.clone() {
            Some(dir) => dir,
            None => app_dirs::frames_dir()?,
        };
        Self::with_output_dir(settings, output_dir)
    }

    pub fn with_output_dir(
        settings: GallerySettings,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, GalleryError> {
        let backend = if settings.offline {
            None
        } else {
            Some(BackendWorker::spawn(BackendClient::new(&settings.api_url)?))
        };
        Ok(Self {
            settings,
            output_dir: output_dir.into(),
            backend,
        })
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn run(&mut self, page: Page) -> Result<PageReport, GalleryError> {
        tracing::info!(%page, dir = %self.page_dir(page).display(), "rendering page");
        let report = match page {
            Page::KMeans => clustering::run_kmeans(self),
            Page::Som => clustering::run_som(self),
            Page::Dbscan => clustering::run_dbscan(self),
            Page::Knn => classifiers::run_knn(self),
            Page::LogReg => classifiers::run_logreg(self),
            Page::LinReg => classifiers::run_linreg(self),
            Page::Tree => trees::run_tree(self),
            Page::Forest => trees::run_forest(self),
            Page::Network => classifiers::run_network(self),
        }?;
        tracing::info!(%page, frames = report.frames.len(), "{}", report.summary);
        Ok(report)
    }

    fn page_dir(&self, page: Page) -> PathBuf {
        self.output_dir.join(page.as_str())
    }

    fn frames(&self, page: Page) -> PngSequence {
        PngSequence::new(self.page_dir(page), page.as_str())
    }

    fn canvas(&self) -> Canvas {
        let canvas = &self.settings.canvas;
        Canvas::new(canvas.width, canvas.height, canvas.world)
    }

    /// Submit one request and wait for its answer.
    fn remote(&mut self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let Some(worker) = self.backend.as_mut() else {
            return Err(BackendError::Offline);
        };
        worker.submit(request)?;
        worker.wait_latest(REMOTE_TIMEOUT)
    }

    fn write_json<T: Serialize>(
        &self,
        page: Page,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, GalleryError> {
        let dir = self.page_dir(page);
        std::fs::create_dir_all(&dir).map_err(|source| GalleryError::Write {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(name);
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| GalleryError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, bytes).map_err(|source| GalleryError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn log_fallback(endpoint: &str, err: &BackendError) {
    if matches!(err, BackendError::Offline) {
        tracing::info!(endpoint, "offline; using local computation");
    } else {
        tracing::warn!(endpoint, "Backend call failed, using local computation: {err}");
    }
}

/// Steps between frames so `total` steps fit after the initial frame.
///
/// With a single frame nothing is spread out; callers finish the run afterwards.
fn steps_per_frame(total: usize, max_frames: usize) -> usize {
    total.div_ceil(max_frames.saturating_sub(1).max(1)).max(1)
}

/// Which history entries become frames when at most `max_frames` are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistoryFrames {
    total: usize,
    frames: usize,
    stride: usize,
}

impl HistoryFrames {
    fn new(total: usize, max_frames: usize) -> Self {
        let total = total.max(1);
        let stride = total.div_ceil(max_frames.max(1));
        Self {
            total,
            frames: total.div_ceil(stride),
            stride,
        }
    }

    /// History index for a frame; the last frame always shows the final entry.
    fn entry(&self, frame: usize) -> usize {
        if frame + 1 >= self.frames {
            self.total - 1
        } else {
            frame * self.stride
        }
    }
}
