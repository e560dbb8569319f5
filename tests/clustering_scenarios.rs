mod support;

use mlgallery::animation::{FrameLoop, Scene};
use mlgallery::clustering::NOISE_LABEL;
use mlgallery::clustering::dbscan::{DbscanParams, cluster_hulls, dbscan, summarize_labels};
use mlgallery::clustering::kmeans::{InitPolicy, KMeansParams, KMeansSimulation, simulate};
use mlgallery::clustering::som::{SomParams, SomSimulation};
use mlgallery::geometry::{Bounds, Point};
use mlgallery::render::{Canvas, RenderError};
use support::fixtures::{TRIANGLE_CENTERS, triangle_bounds, triangles};

#[test]
fn kmeans_centroids_settle_inside_their_triangles() {
    let params = KMeansParams {
        k: 3,
        iterations: 10,
        init: InitPolicy::PlusPlus,
        bounds: Bounds::new(-15.0, 15.0, -5.0, 15.0),
        seed: 42,
    };
    let state = simulate(&triangles(), &params).unwrap();
    for center in TRIANGLE_CENTERS {
        let bounds = triangle_bounds(center);
        assert!(
            state.centroids.iter().any(|centroid| bounds.contains(*centroid)),
            "no centroid inside {bounds:?}: {:?}",
            state.centroids
        );
    }
    let mut clusters: Vec<usize> = state.assignments.chunks(3).map(|chunk| chunk[0]).collect();
    for chunk in state.assignments.chunks(3) {
        assert!(chunk.iter().all(|cluster| *cluster == chunk[0]));
    }
    clusters.sort_unstable();
    assert_eq!(clusters, vec![0, 1, 2]);
}

#[test]
fn kmeans_frame_loop_renders_every_iteration() {
    let params = KMeansParams {
        iterations: 4,
        ..KMeansParams::default()
    };
    let mut simulation = KMeansSimulation::new(triangles(), params).unwrap();
    let mut canvas = Canvas::new(32, 32, Bounds::new(-15.0, 15.0, -5.0, 15.0));
    let mut seen = Vec::new();
    let mut sink = |index: usize, canvas: &Canvas| -> Result<(), RenderError> {
        seen.push((index, canvas.width()));
        Ok(())
    };
    let summary = FrameLoop::new(100)
        .run(&mut simulation, &mut canvas, &mut sink)
        .unwrap();
    assert_eq!(summary.frames, 5);
    assert_eq!(summary.steps, 4);
    assert_eq!(seen.first(), Some(&(0, 32)));
    assert_eq!(simulation.state().iteration, 4);
    assert!(!simulation.advance());
}

#[test]
fn noise_never_shapes_a_cluster_hull() {
    let mut points = triangles();
    let outlier = Point::new(0.0, 6.0);
    points.push(outlier);
    let mut labels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
    labels.push(NOISE_LABEL);

    let hulls = cluster_hulls(&points, &labels).unwrap();
    assert_eq!(hulls.len(), 3);
    for hull in &hulls {
        assert_eq!(hull.size, 3);
        assert!(!hull.hull.contains(&outlier));
    }
    let summary = summarize_labels(&labels);
    assert_eq!(summary.cluster_count, 3);
    assert_eq!(summary.noise_count, 1);
}

#[test]
fn local_dbscan_separates_two_blobs_from_noise() {
    let mut points = Vec::new();
    for base in [Point::new(-5.0, -5.0), Point::new(5.0, 5.0)] {
        for row in 0..3 {
            for column in 0..3 {
                points.push(Point::new(
                    base.x + column as f64 * 0.3,
                    base.y + row as f64 * 0.3,
                ));
            }
        }
    }
    points.push(Point::new(12.0, -12.0));
    let labels = dbscan(
        &points,
        DbscanParams {
            epsilon: 0.5,
            min_points: 3,
        },
    )
    .unwrap();
    assert_eq!(labels.len(), 19);
    assert!(labels[..9].iter().all(|label| *label == labels[0]));
    assert!(labels[9..18].iter().all(|label| *label == labels[9]));
    assert_ne!(labels[0], labels[9]);
    assert!(labels[0] >= 0 && labels[9] >= 0);
    assert_eq!(labels[18], NOISE_LABEL);
}

#[test]
fn som_advance_matches_single_steps() {
    let points = triangles();
    let params = SomParams {
        grid_width: 4,
        grid_height: 3,
        max_iterations: 80,
        seed: 9,
        ..SomParams::default()
    };
    let mut jumped = SomSimulation::new(points.clone(), params, Bounds::default()).unwrap();
    let mut stepped = SomSimulation::new(points, params, Bounds::default()).unwrap();
    jumped.advance_to(50);
    for _ in 0..50 {
        assert!(stepped.step());
    }
    assert_eq!(jumped.state(), stepped.state());

    jumped.advance_to(500);
    assert_eq!(jumped.state().iteration, 80);
    assert!(!jumped.step());
}
