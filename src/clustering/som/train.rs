use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{SomError, SomParams, SomState};
use crate::geometry::{Bounds, Point};

/// Index of the node closest to `input`; ties go to the lowest index.
pub fn find_bmu(nodes: &[Point], input: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, node) in nodes.iter().enumerate() {
        let distance = node.distance_squared(input);
        if best.map(|(_, best_distance)| distance < best_distance).unwrap_or(true) {
            best = Some((idx, distance));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Gaussian neighbourhood weight for a lattice distance under radius `sigma`.
pub fn influence(distance: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if distance == 0.0 { 1.0 } else { 0.0 };
    }
    (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}

pub(super) fn relax_toward(state: &mut SomState, input: Point) {
    let Some(bmu) = find_bmu(&state.nodes, input) else {
        return;
    };
    let sigma = state.schedule.radius(state.iteration);
    let rate = state.schedule.learning_rate(state.iteration);
    for idx in 0..state.nodes.len() {
        let weight = rate * influence(state.lattice_distance(idx, bmu), sigma);
        let node = &mut state.nodes[idx];
        node.x += weight * (input.x - node.x);
        node.y += weight * (input.y - node.y);
    }
}

/// SOM run that owns its inputs and RNG so frames advance it incrementally.
#[derive(Debug, Clone)]
pub struct SomSimulation {
    params: SomParams,
    points: Vec<Point>,
    state: SomState,
    rng: StdRng,
}

impl SomSimulation {
    /// Nodes start scattered over the bounds of the inputs (or `fallback` if there are none).
    pub fn new(points: Vec<Point>, params: SomParams, fallback: Bounds) -> Result<Self, SomError> {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let bounds = Bounds::enclosing(&points).unwrap_or(fallback);
        let state = SomState::initialize(&params, bounds, &mut rng)?;
        Ok(Self {
            params,
            points,
            state,
            rng,
        })
    }

    pub fn step(&mut self) -> bool {
        self.state.step(&self.points, &mut self.rng)
    }

    pub fn advance_to(&mut self, iteration: usize) {
        self.state.advance_to(iteration, &self.points, &mut self.rng);
    }

    pub fn params(&self) -> &SomParams {
        &self.params
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn state(&self) -> &SomState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influence_strictly_decreases_with_distance() {
        for sigma in [0.5, 1.0, 3.0, 10.0] {
            let mut previous = influence(0.0, sigma);
            assert_eq!(previous, 1.0);
            for step in 1..40 {
                let current = influence(step as f64 * 0.25, sigma);
                assert!(current < previous, "sigma={sigma} step={step}");
                previous = current;
            }
        }
    }

    #[test]
    fn zero_sigma_only_moves_the_bmu() {
        assert_eq!(influence(0.0, 0.0), 1.0);
        assert_eq!(influence(1.0, 0.0), 0.0);
    }

    #[test]
    fn bmu_ties_go_to_first_node() {
        let nodes = [Point::new(-1.0, 0.0), Point::new(1.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(find_bmu(&nodes, Point::new(0.0, 0.0)), Some(0));
        assert_eq!(find_bmu(&nodes, Point::new(4.0, 4.0)), Some(2));
        assert_eq!(find_bmu(&[], Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn relaxation_pulls_bmu_hardest() {
        let params = SomParams {
            grid_width: 3,
            grid_height: 1,
            initial_learning_rate: 0.5,
            initial_radius: 1.0,
            ..SomParams::default()
        };
        let mut state = SomState::initialize(
            &params,
            Bounds::default(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        state.nodes = vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(4.0, 0.0)];
        relax_toward(&mut state, Point::new(0.0, 2.0));
        // BMU moves half way; neighbours move by rate * influence(distance).
        assert!((state.nodes[0].y - 1.0).abs() < 1e-12);
        assert!((state.nodes[1].y - 2.0 * 0.5 * influence(1.0, 1.0)).abs() < 1e-12);
        assert!(state.nodes[2].y < state.nodes[1].y);
    }

    #[test]
    fn advancing_matches_stepping_one_at_a_time() {
        let points: Vec<Point> = (0..30)
            .map(|idx| Point::new((idx % 6) as f64, (idx / 6) as f64))
            .collect();
        let params = SomParams {
            grid_width: 4,
            grid_height: 4,
            max_iterations: 60,
            ..SomParams::default()
        };
        let mut jumped = SomSimulation::new(points.clone(), params, Bounds::default()).unwrap();
        let mut stepped = SomSimulation::new(points, params, Bounds::default()).unwrap();
        jumped.advance_to(25);
        for _ in 0..25 {
            assert!(stepped.step());
        }
        assert_eq!(jumped.state(), stepped.state());
        jumped.advance_to(10);
        assert_eq!(jumped.state().iteration, 25);
    }
}
