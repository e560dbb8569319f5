use super::{Gallery, GalleryError, Page, PageReport};
use crate::animation::FrameSink;
use crate::backend::api::{BuildForestRequest, BuildTreeRequest, PredictForestRequest, Vote};
use crate::backend::{BackendRequest, BackendResponse};
use crate::render::paint_tree;
use crate::render::palette::BACKGROUND;

pub(super) fn run_tree(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.trees.clone();
    let request = BackendRequest::BuildTree(BuildTreeRequest {
        dataset: settings.dataset.clone(),
        params: settings.tree_params(),
    });
    let endpoint = request.endpoint();
    let BackendResponse::Tree(response) = gallery.remote(request)? else {
        return Err(GalleryError::UnexpectedResponse { endpoint });
    };

    let mut canvas = gallery.canvas();
    paint_tree(&mut canvas, &response.tree);
    let mut frames = gallery.frames(Page::Tree);
    frames.write_frame(0, &canvas)?;
    let json = gallery.write_json(Page::Tree, "tree.json", &response)?;

    let summary = format!(
        "{} tree ({}, max depth {}): {} nodes, {} leaves, depth {}",
        settings.dataset,
        settings.criterion.as_str(),
        settings.max_depth,
        response.tree.node_count(),
        response.tree.leaf_count(),
        response.tree.depth()
    );
    let mut report = PageReport::new(Page::Tree, frames.written().to_vec(), summary);
    report.artifacts.push(json);
    Ok(report)
}

/// One frame per tree up to the frame cap; the configured record is then sent for a majority vote.
pub(super) fn run_forest(gallery: &mut Gallery) -> Result<PageReport, GalleryError> {
    let settings = gallery.settings.trees.clone();
    let forest = BuildForestRequest {
        dataset: settings.dataset.clone(),
        params: settings.forest_params(),
    };
    let request = BackendRequest::BuildForest(forest.clone());
    let endpoint = request.endpoint();
    let BackendResponse::Forest(response) = gallery.remote(request)? else {
        return Err(GalleryError::UnexpectedResponse { endpoint });
    };

    let mut canvas = gallery.canvas();
    let mut frames = gallery.frames(Page::Forest);
    let max_frames = gallery.settings.canvas.max_frames;
    if response.trees.len() > max_frames {
        tracing::debug!(
            trees = response.trees.len(),
            max_frames,
            "forest has more trees than frames; rendering the first ones"
        );
    }
    for (index, member) in response.trees.iter().take(max_frames).enumerate() {
        canvas.fill(BACKGROUND);
        paint_tree(&mut canvas, &member.tree);
        frames.write_frame(index, &canvas)?;
    }
    let mut report = PageReport::new(Page::Forest, frames.written().to_vec(), String::new());
    report
        .artifacts
        .push(gallery.write_json(Page::Forest, "forest.json", &response)?);

    let mut summary = format!(
        "{} forest: {} trees, {} leaves in total",
        settings.dataset,
        response.trees.len(),
        response.trees.iter().map(|member| member.tree.leaf_count()).sum::<usize>()
    );
    if !settings.record.is_empty() {
        let request = BackendRequest::PredictForest(PredictForestRequest {
            forest,
            record: settings.record.clone(),
        });
        let endpoint = request.endpoint();
        let BackendResponse::ForestPrediction(prediction) = gallery.remote(request)? else {
            return Err(GalleryError::UnexpectedResponse { endpoint });
        };
        let votes: Vec<String> = prediction
            .individual_votes
            .iter()
            .map(ToString::to_string)
            .collect();
        let majority = match &prediction.majority_vote {
            Vote::Index(index) => usize::try_from(*index)
                .ok()
                .and_then(|index| response.target_names.get(index))
                .map(|name| format!("{index} ({name})"))
                .unwrap_or_else(|| index.to_string()),
            vote => vote.to_string(),
        };
        summary.push_str(&format!(
            "; record {:?} -> {majority} (votes: {})",
            settings.record,
            votes.join(", ")
        ));
        report
            .artifacts
            .push(gallery.write_json(Page::Forest, "prediction.json", &prediction)?);
    }
    report.summary = summary;
    Ok(report)
}
