use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Gallery, GalleryError, Page, PageReport, log_fallback, steps_per_frame};
use crate::animation::{FrameLoop, FrameSink};
use crate::backend::{BackendRequest, BackendResponse};
use crate::clustering::dbscan::{cluster_hulls, dbscan, summarize_labels};
use crate::clustering::kmeans::KMeansSimulation;
use crate::clustering::som::SomSimulation;
use crate::dataset::{blob_centers, dbscan_demo, labeled_blobs, uniform};
use crate::geometry::Point;
use crate::render::paint_density_overlay;

pub(super) fn run_kmeans(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.kmeans;
    let world = gallery.settings.canvas.world;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let centers = blob_centers(settings.blobs, world, settings.spread * 3.0, &mut rng)?;
    let points: Vec<Point> = labeled_blobs(&centers, settings.points_per_blob, settings.spread, &mut rng)?
        .into_iter()
        .map(|sample| sample.point)
        .collect();

    let params = settings.params(world);
    let max_frames = gallery.settings.canvas.max_frames;
    let mut simulation = KMeansSimulation::new(points, params)?;
    let mut canvas = gallery.canvas();
    let mut frames = gallery.frames(Page::KMeans);
    let run = FrameLoop::new(max_frames)
        .with_steps_per_frame(steps_per_frame(params.iterations, max_frames))
        .run(&mut simulation, &mut canvas, &mut frames)?;
    if !run.cancelled {
        while simulation.step() {}
    }

    let state = simulation.state();
    let summary = format!(
        "{} points, k = {}, {} iterations, inertia {:.3}",
        simulation.points().len(),
        state.centroids.len(),
        state.iteration,
        state.inertia(simulation.points())
    );
    Ok(PageReport::new(Page::KMeans, frames.written().to_vec(), summary))
}

pub(super) fn run_som(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.som;
    let world = gallery.settings.canvas.world;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let points = uniform(settings.point_count, world, &mut rng);

    let params = settings.params();
    let max_frames = gallery.settings.canvas.max_frames;
    let mut simulation = SomSimulation::new(points, params, world)?;
    let mut canvas = gallery.canvas();
    let mut frames = gallery.frames(Page::Som);
    let run = FrameLoop::new(max_frames)
        .with_steps_per_frame(
            settings
                .steps_per_frame
                .max(steps_per_frame(params.max_iterations, max_frames)),
        )
        .run(&mut simulation, &mut canvas, &mut frames)?;
    if !run.cancelled {
        simulation.advance_to(params.max_iterations);
    }

    let state = simulation.state();
    let summary = format!(
        "{}x{} grid after {} of {} iterations, radius {:.3}, learning rate {:.4}",
        state.grid_width,
        state.grid_height,
        state.iteration,
        state.schedule.max_iterations,
        state.schedule.radius(state.iteration),
        state.schedule.learning_rate(state.iteration)
    );
    Ok(PageReport::new(Page::Som, frames.written().to_vec(), summary))
}

pub(super) fn run_dbscan(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.dbscan;
    let world = gallery.settings.canvas.world;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let points = dbscan_demo(
        settings.clusters,
        settings.points_per_cluster,
        settings.spread,
        settings.noise_ratio,
        world,
        &mut rng,
    )?;
    let params = settings.params();
    params.validate()?;

    let request = BackendRequest::Dbscan {
        points: points.clone(),
        params,
    };
    let endpoint = request.endpoint();
    let (labels, fallback) = match gallery.remote(request) {
        Ok(BackendResponse::Labels(labels)) => (labels, None),
        Ok(_) => return Err(GalleryError::UnexpectedResponse { endpoint }),
        Err(err) => {
            log_fallback(endpoint, &err);
            (dbscan(&points, params)?, Some(err))
        }
    };

    let hulls = cluster_hulls(&points, &labels)?;
    let mut canvas = gallery.canvas();
    paint_density_overlay(&mut canvas, &points, &labels, &hulls);
    let mut frames = gallery.frames(Page::Dbscan);
    frames.write_frame(0, &canvas)?;

    let stats = summarize_labels(&labels);
    let summary = format!(
        "{} points, {} clusters (sizes {}..={}), {} noise ({:.0}%)",
        points.len(),
        stats.cluster_count,
        stats.min_cluster_size,
        stats.max_cluster_size,
        stats.noise_count,
        stats.noise_ratio * 100.0
    );
    let mut report = PageReport::new(Page::Dbscan, frames.written().to_vec(), summary);
    report.fallback = fallback;
    Ok(report)
}
