use super::Scene;
use crate::clustering::kmeans::KMeansSimulation;
use crate::clustering::som::SomSimulation;
use crate::render::{Canvas, paint_kmeans, paint_som};

impl Scene for KMeansSimulation {
    fn advance(&mut self) -> bool {
        self.step()
    }

    fn render(&mut self, canvas: &mut Canvas) {
        paint_kmeans(canvas, self.points(), self.state());
    }
}

impl Scene for SomSimulation {
    fn advance(&mut self) -> bool {
        self.step()
    }

    fn render(&mut self, canvas: &mut Canvas) {
        paint_som(canvas, self.points(), self.state());
    }
}
