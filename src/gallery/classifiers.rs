use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Gallery, GalleryError, HistoryFrames, Page, PageReport, log_fallback};
use crate::animation::{FrameLoop, VisualizationCanvas};
use crate::backend::{BackendError, BackendRequest, BackendResponse};
use crate::config::RegressionSettings;
use crate::dataset::{LabeledPoint, Samples, binary_classes, blob_centers, labeled_blobs, linear_samples};
use crate::geometry::{Bounds, Point};
use crate::ml::knn;
use crate::ml::linreg::{self, LinearFit};
use crate::ml::logreg::{self, LogRegModel, TrainOptions};
use crate::ml::metrics::{ConfusionMatrix, accuracy};
use crate::ml::mlp::{Network, train_step};
use crate::render::palette::{FOREGROUND, cluster_color};
use crate::render::{paint_decision_regions, paint_labeled_points, paint_line, paint_samples};

/// The regression page samples `x` here so plain gradient descent stays stable.
const LINEAR_X_RANGE: (f64, f64) = (-2.0, 2.0);
const XOR_TABLE: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];
const XOR_WORLD: Bounds = Bounds::new(-0.5, 1.5, -0.5, 1.5);

pub(super) fn run_knn(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.knn;
    let world = gallery.settings.canvas.world;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let centers = blob_centers(settings.classes, world, settings.spread * 2.0, &mut rng)?;
    let samples = labeled_blobs(&centers, settings.points_per_class, settings.spread, &mut rng)?;

    let (truth, predicted) = leave_one_out(&samples, settings.k);
    let confusion = ConfusionMatrix::from_pairs(settings.classes, &truth, &predicted);
    let query = settings.query;
    let prediction = knn::classify(&samples, query, settings.k);

    let mut view = VisualizationCanvas::new("k-nearest neighbours", move |params, _, canvas| {
        let k = params.count("k").unwrap_or(1);
        paint_decision_regions(canvas, |point| {
            knn::classify(&samples, point, k).map(|prediction| prediction.label)
        });
        paint_labeled_points(canvas, &samples);
        if let Some(prediction) = knn::classify(&samples, query, k) {
            for idx in &prediction.neighbours {
                canvas.stroke_line(query, samples[*idx].point, FOREGROUND);
            }
            canvas.draw_cross(query, 7.0, cluster_color(prediction.label));
        }
    })
    .with_slider("k", 1.0, 25.0, 1.0, settings.k as f64);

    let mut canvas = gallery.canvas();
    let mut frames = gallery.frames(Page::Knn);
    FrameLoop::new(1).run(&mut view, &mut canvas, &mut frames)?;

    let verdict = match prediction {
        Some(prediction) => format!("class {} (votes {:?})", prediction.label, prediction.votes),
        None => "no prediction".to_string(),
    };
    let summary = format!(
        "k = {}, query ({:.2}, {:.2}) -> {verdict}, leave-one-out accuracy {:.1}%",
        settings.k,
        query.x,
        query.y,
        confusion.accuracy() * 100.0
    );
    Ok(PageReport::new(Page::Knn, frames.written().to_vec(), summary))
}

/// Classify every sample against all the others.
fn leave_one_out(samples: &[LabeledPoint], k: usize) -> (Vec<usize>, Vec<usize>) {
    let mut truth = Vec::with_capacity(samples.len());
    let mut predicted = Vec::with_capacity(samples.len());
    let mut others = Vec::with_capacity(samples.len().saturating_sub(1));
    for (idx, sample) in samples.iter().enumerate() {
        others.clear();
        others.extend(
            samples
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != idx)
                .map(|(_, other)| *other),
        );
        if let Some(prediction) = knn::classify(&others, sample.point, k) {
            truth.push(sample.label);
            predicted.push(prediction.label);
        }
    }
    (truth, predicted)
}

pub(super) fn run_logreg(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.regression;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut fallback = None;

    let samples = if settings.fetch_logistic_data {
        let request = BackendRequest::LogisticData;
        let endpoint = request.endpoint();
        match gallery.remote(request) {
            Ok(BackendResponse::LogisticData(data)) => Samples {
                x: data.x,
                y: data.y,
            },
            Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
            Err(err) => {
                log_fallback(endpoint, &err);
                fallback = Some(err);
                two_classes(&settings, &mut rng)?
            }
        }
    } else {
        two_classes(&settings, &mut rng)?
    };

    let request = BackendRequest::LogisticHistory {
        samples: samples.clone(),
        learning_rate: settings.learning_rate,
        iterations: settings.iterations,
    };
    let endpoint = request.endpoint();
    let history = match gallery.remote(request) {
        Ok(BackendResponse::LogisticHistory(history)) => history,
        Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
        Err(err) => {
            log_fallback(endpoint, &err);
            fallback.get_or_insert(err);
            let options = TrainOptions {
                learning_rate: settings.learning_rate,
                iterations: settings.iterations,
            };
            logreg::train_history(&samples, &options).map_err(GalleryError::Training)?
        }
    };

    let plan = HistoryFrames::new(history.weights_history.len(), gallery.settings.canvas.max_frames);
    let two_features = samples.x.iter().all(|row| row.len() == 2);
    let plotted = samples.clone();
    let weights = history.weights_history.clone();
    let mut view = VisualizationCanvas::new("logistic regression", move |_, frame, canvas| {
        let model = LogRegModel {
            weights: weights.get(plan.entry(frame)).cloned().unwrap_or_default(),
        };
        if two_features {
            paint_decision_regions(canvas, |point| {
                Some(usize::from(model.predict_class(&[point.x, point.y])))
            });
        }
        paint_samples(canvas, &plotted);
        if let Some((slope, intercept)) = model.decision_line() {
            paint_line(canvas, slope, intercept, FOREGROUND);
        }
    })
    .with_animation(plan.frames);

    let mut canvas = gallery.canvas();
    let points: Vec<Point> = samples
        .x
        .iter()
        .filter_map(|row| match row.as_slice() {
            [x, y, ..] => Some(Point::new(*x, *y)),
            _ => None,
        })
        .collect();
    canvas.set_world(fit_world(&points, gallery.settings.canvas.world));
    let mut frames = gallery.frames(Page::LogReg);
    FrameLoop::new(plan.frames).run(&mut view, &mut canvas, &mut frames)?;

    let summary = format!(
        "{} samples, {} iterations, final log loss {:.4}, training accuracy {:.1}%",
        samples.len(),
        history.weights_history.len(),
        history.final_loss,
        accuracy(&samples.y, &history.final_predictions) * 100.0
    );
    let mut report = PageReport::new(Page::LogReg, frames.written().to_vec(), summary);
    report.fallback = fallback;
    Ok(report)
}

fn two_classes(settings: &RegressionSettings, rng: &mut StdRng) -> Result<Samples, GalleryError> {
    let per_class = (settings.samples / 2).max(1);
    Ok(binary_classes(
        per_class,
        Point::new(-3.0, -3.0),
        Point::new(3.0, 3.0),
        2.0,
        rng,
    )?)
}

pub(super) fn run_linreg(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.regression;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let samples = linear_samples(
        settings.samples,
        settings.slope,
        settings.intercept,
        settings.noise,
        LINEAR_X_RANGE,
        &mut rng,
    )?;

    let request = BackendRequest::LinearHistory {
        samples: samples.clone(),
        learning_rate: settings.learning_rate,
        iterations: settings.iterations,
    };
    let endpoint = request.endpoint();
    let mut fallback = None;
    let history = match gallery.remote(request) {
        Ok(BackendResponse::LinearHistory(history)) => history,
        Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
        Err(err) => {
            log_fallback(endpoint, &err);
            fallback = Some(err);
            linreg::train_history(&samples, settings.learning_rate, settings.iterations)
                .map_err(GalleryError::Training)?
        }
    };

    let points: Vec<Point> = samples
        .x
        .iter()
        .zip(&samples.y)
        .filter_map(|(row, y)| row.first().map(|x| Point::new(*x, *y)))
        .collect();
    let plan = HistoryFrames::new(
        history.coefficients_history.len(),
        gallery.settings.canvas.max_frames,
    );
    let coefficients = history.coefficients_history.clone();
    let plotted = points.clone();
    let mut view = VisualizationCanvas::new("linear regression", move |_, frame, canvas| {
        for point in &plotted {
            canvas.fill_disc(*point, 3.0, cluster_color(0));
        }
        if let Some([intercept, slope, ..]) = coefficients.get(plan.entry(frame)).map(Vec::as_slice) {
            paint_line(canvas, *slope, *intercept, FOREGROUND);
        }
    })
    .with_animation(plan.frames);

    let mut canvas = gallery.canvas();
    canvas.set_world(fit_world(&points, gallery.settings.canvas.world));
    let mut frames = gallery.frames(Page::LinReg);
    FrameLoop::new(plan.frames).run(&mut view, &mut canvas, &mut frames)?;

    let fit = history.final_fit().unwrap_or_else(|| LinearFit {
        coefficients: vec![0.0],
        ..LinearFit::default()
    });
    let slope = fit.coefficients.first().copied().unwrap_or_default();
    let summary = format!(
        "y = {slope:.3}x + {:.3} after {} iterations, mse {:.4} (generated from y = {}x + {})",
        fit.intercept,
        history.coefficients_history.len(),
        linreg::mse(&fit, &samples),
        settings.slope,
        settings.intercept
    );
    let mut report = PageReport::new(Page::LinReg, frames.written().to_vec(), summary);
    report.fallback = fallback;
    Ok(report)
}

/// Padded bounds of `points`, or `fallback` when they span nothing.
fn fit_world(points: &[Point], fallback: Bounds) -> Bounds {
    Bounds::enclosing(points)
        .map(|bounds| bounds.padded(0.1 * bounds.width().max(bounds.height()) + 0.5))
        .filter(|bounds| bounds.is_valid() && bounds.width() > 0.0 && bounds.height() > 0.0)
        .unwrap_or(fallback)
}

pub(super) fn run_network(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.network.clone();
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut fallback = None;

    let request = BackendRequest::InitializeNetwork {
        layer_sizes: settings.layer_sizes.clone(),
        activation: settings.activation,
    };
    let endpoint = request.endpoint();
    let mut network = match gallery.remote(request) {
        Ok(BackendResponse::Network(network)) => network,
        Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
        Err(err) => {
            log_fallback(endpoint, &err);
            fallback = Some(err);
            Network::initialize(&settings.layer_sizes, settings.activation, &mut rng)?
        }
    };

    // Entry `n` is the network after `n` epochs, so frame 0 shows the initial weights.
    let plan = HistoryFrames::new(settings.epochs + 1, gallery.settings.canvas.max_frames);
    let snapshot_epochs: BTreeSet<usize> = (0..plan.frames).map(|frame| plan.entry(frame)).collect();
    let mut snapshots = Vec::with_capacity(plan.frames);
    snapshots.push(network.clone());
    let mut loss = 0.0;
    for epoch in 1..=settings.epochs {
        loss = train_epoch(gallery, &mut network, settings.learning_rate, &mut fallback)?;
        if snapshot_epochs.contains(&epoch) {
            snapshots.push(network.clone());
        }
    }
    tracing::debug!(epochs = settings.epochs, loss, "network trained");

    let samples: Vec<LabeledPoint> = XOR_TABLE
        .iter()
        .map(|(input, target)| LabeledPoint {
            point: Point::new(input[0], input[1]),
            label: usize::from(*target >= 0.5),
        })
        .collect();
    let truth: Vec<usize> = samples.iter().map(|sample| sample.label).collect();
    let predicted: Vec<usize> = XOR_TABLE
        .iter()
        .map(|(input, _)| output_class(&network, input))
        .collect();

    let mut view = VisualizationCanvas::new("neural network", move |_, frame, canvas| {
        let Some(network) = snapshots.get(frame).or(snapshots.last()) else {
            return;
        };
        paint_decision_regions(canvas, |point| Some(output_class(network, &[point.x, point.y])));
        paint_labeled_points(canvas, &samples);
    })
    .with_animation(plan.frames);

    let mut canvas = gallery.canvas();
    canvas.set_world(XOR_WORLD);
    let mut frames = gallery.frames(Page::Network);
    FrameLoop::new(plan.frames).run(&mut view, &mut canvas, &mut frames)?;

    let summary = format!(
        "layers {:?}, {} epochs, mean loss {loss:.4}, XOR accuracy {:.0}%",
        network.sizes(),
        settings.epochs,
        accuracy(&truth, &predicted) * 100.0
    );
    let mut report = PageReport::new(Page::Network, frames.written().to_vec(), summary);
    report.fallback = fallback;
    Ok(report)
}

/// One pass over the XOR table; returns the mean loss.
///
/// Steps run on the backend until the first failure, locally after that.
fn train_epoch(
    gallery: &mut Gallery,
    network: &mut Network,
    learning_rate: f64,
    fallback: &mut Option<BackendError>,
) -> Result<f64, GalleryError> {
    let mut total = 0.0;
    for (input, target) in XOR_TABLE {
        let remote = if fallback.is_none() {
            let request = BackendRequest::TrainNetwork {
                network: network.clone(),
                input: input.to_vec(),
                target: vec![target],
                learning_rate,
            };
            let endpoint = request.endpoint();
            match gallery.remote(request) {
                Ok(BackendResponse::NetworkStep {
                    network: updated,
                    step,
                }) => {
                    *network = updated;
                    Some(step)
                }
                Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
                Err(err) => {
                    log_fallback(endpoint, &err);
                    *fallback = Some(err);
                    None
                }
            }
        } else {
            None
        };
        let step = match remote {
            Some(step) => step,
            None => train_step(network, &input, &[target], learning_rate)?,
        };
        total += step.loss;
    }
    Ok(total / XOR_TABLE.len() as f64)
}

fn output_class(network: &Network, input: &[f64]) -> usize {
    let output = network.predict(input);
    usize::from(output.first().is_some_and(|value| *value >= 0.5))
}
