use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use super::api::{
    BuildForestRequest, BuildForestResponse, BuildTreeRequest, BuildTreeResponse,
    PredictForestRequest, PredictForestResponse, RegressionData,
};
use super::sequencer::{RequestSequencer, RequestToken};
use super::{BackendClient, BackendError};
use crate::clustering::Label;
use crate::clustering::dbscan::DbscanParams;
use crate::dataset::Samples;
use crate::geometry::Point;
use crate::ml::activation::Activation;
use crate::ml::linreg::LinearHistory;
use crate::ml::logreg::LogisticHistory;
use crate::ml::mlp::{Network, TrainStep};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    Dbscan {
        points: Vec<Point>,
        params: DbscanParams,
    },
    LogisticData,
    LogisticHistory {
        samples: Samples,
        learning_rate: f64,
        iterations: usize,
    },
    LinearHistory {
        samples: Samples,
        learning_rate: f64,
        iterations: usize,
    },
    BuildTree(BuildTreeRequest),
    BuildForest(BuildForestRequest),
    PredictForest(PredictForestRequest),
    InitializeNetwork {
        layer_sizes: Vec<usize>,
        activation: Activation,
    },
    TrainNetwork {
        network: Network,
        input: Vec<f64>,
        target: Vec<f64>,
        learning_rate: f64,
    },
}

impl BackendRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            BackendRequest::Dbscan { .. } => "dbscan",
            BackendRequest::LogisticData => "logistic-regression/data",
            BackendRequest::LogisticHistory { .. } => "logistic-regression/train-history",
            BackendRequest::LinearHistory { .. } => "linear-regression-history",
            BackendRequest::BuildTree(_) => "build_tree",
            BackendRequest::BuildForest(_) => "build_forest",
            BackendRequest::PredictForest(_) => "predict_forest",
            BackendRequest::InitializeNetwork { .. } => "initialize",
            BackendRequest::TrainNetwork { .. } => "train",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Labels(Vec<Label>),
    LogisticData(RegressionData),
    LogisticHistory(LogisticHistory),
    LinearHistory(LinearHistory),
    Tree(BuildTreeResponse),
    Forest(BuildForestResponse),
    ForestPrediction(PredictForestResponse),
    Network(Network),
    NetworkStep { network: Network, step: TrainStep },
}

pub struct BackendJob {
    pub token: RequestToken,
    pub request: BackendRequest,
}

pub struct BackendResult {
    pub token: RequestToken,
    pub result: Result<BackendResponse, BackendError>,
}

/// Run one request against the client on the calling thread.
pub fn execute(
    client: &BackendClient,
    request: BackendRequest,
) -> Result<BackendResponse, BackendError> {
    match request {
        BackendRequest::Dbscan { points, params } => {
            client.dbscan(&points, params).map(BackendResponse::Labels)
        }
        BackendRequest::LogisticData => client.logistic_data().map(BackendResponse::LogisticData),
        BackendRequest::LogisticHistory {
            samples,
            learning_rate,
            iterations,
        } => client
            .logistic_train_history(&samples, learning_rate, iterations)
            .map(BackendResponse::LogisticHistory),
        BackendRequest::LinearHistory {
            samples,
            learning_rate,
            iterations,
        } => client
            .linear_regression_history(&samples, learning_rate, iterations)
            .map(BackendResponse::LinearHistory),
        BackendRequest::BuildTree(request) => client.build_tree(&request).map(BackendResponse::Tree),
        BackendRequest::BuildForest(request) => {
            client.build_forest(&request).map(BackendResponse::Forest)
        }
        BackendRequest::PredictForest(request) => client
            .predict_forest(&request)
            .map(BackendResponse::ForestPrediction),
        BackendRequest::InitializeNetwork {
            layer_sizes,
            activation,
        } => client
            .initialize_network(&layer_sizes, activation)
            .map(BackendResponse::Network),
        BackendRequest::TrainNetwork {
            mut network,
            input,
            target,
            learning_rate,
        } => {
            let step = client.train_network(&mut network, &input, &target, learning_rate)?;
            Ok(BackendResponse::NetworkStep { network, step })
        }
    }
}

/// Spawn a thread that runs jobs in order and reports each result with its token.
pub(crate) fn spawn_backend_worker<E>(mut executor: E) -> (Sender<BackendJob>, Receiver<BackendResult>)
where
    E: FnMut(BackendRequest) -> Result<BackendResponse, BackendError> + Send + 'static,
{
    let (tx, rx) = std::sync::mpsc::channel::<BackendJob>();
    let (result_tx, result_rx) = std::sync::mpsc::channel::<BackendResult>();
    let spawned = thread::Builder::new()
        .name("backend-worker".to_string())
        .spawn(move || {
            while let Ok(job) = rx.recv() {
                let endpoint = job.request.endpoint();
                let result = executor(job.request);
                if let Err(err) = &result {
                    tracing::warn!(token = %job.token, endpoint, "Backend request failed: {err}");
                }
                let _ = result_tx.send(BackendResult {
                    token: job.token,
                    result,
                });
            }
        });
    if let Err(err) = spawned {
        tracing::error!("Failed to start backend worker: {err}");
    }
    (tx, result_rx)
}

/// Background backend access that applies only the newest response.
pub struct BackendWorker {
    jobs: Sender<BackendJob>,
    results: Receiver<BackendResult>,
    sequencer: RequestSequencer,
}

impl BackendWorker {
    pub fn spawn(client: BackendClient) -> Self {
        Self::with_executor(move |request| execute(&client, request))
    }

    pub fn with_executor<E>(executor: E) -> Self
    where
        E: FnMut(BackendRequest) -> Result<BackendResponse, BackendError> + Send + 'static,
    {
        let (jobs, results) = spawn_backend_worker(executor);
        Self {
            jobs,
            results,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Queue a request; it supersedes anything submitted before.
    pub fn submit(&mut self, request: BackendRequest) -> Result<RequestToken, BackendError> {
        let token = self.sequencer.issue();
        self.jobs
            .send(BackendJob { token, request })
            .map_err(|_| BackendError::WorkerGone)?;
        Ok(token)
    }

    pub fn latest_token(&self) -> Option<RequestToken> {
        self.sequencer.latest()
    }

    /// Drain finished results without blocking, returning the current one if it arrived.
    pub fn poll_latest(&mut self) -> Option<Result<BackendResponse, BackendError>> {
        let mut latest = None;
        loop {
            match self.results.try_recv() {
                Ok(message) => {
                    if let Some(result) = self.accept(message) {
                        latest = Some(result);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if latest.is_none() && self.sequencer.latest().is_some() {
                        latest = Some(Err(BackendError::WorkerGone));
                    }
                    break;
                }
            }
        }
        latest
    }

    /// Block until the current request finishes, dropping stale results on the way.
    pub fn wait_latest(&mut self, timeout: Duration) -> Result<BackendResponse, BackendError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(result) = self.accept(message) {
                        return result;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(BackendError::Transport(format!(
                        "No backend response within {timeout:?}"
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => return Err(BackendError::WorkerGone),
            }
        }
    }

    fn accept(&mut self, message: BackendResult) -> Option<Result<BackendResponse, BackendError>> {
        if !self.sequencer.complete(message.token) {
            tracing::debug!(token = %message.token, "Dropping stale backend response");
            return None;
        }
        Some(message.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn labels_for(points: &[Point]) -> Vec<Label> {
        vec![points.len() as Label; points.len()]
    }

    #[test]
    fn stale_results_are_dropped() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut worker = BackendWorker::with_executor(move |request| {
            let _ = gate_rx.recv();
            match request {
                BackendRequest::Dbscan { points, .. } => {
                    Ok(BackendResponse::Labels(labels_for(&points)))
                }
                _ => Err(BackendError::Validation("unexpected".into())),
            }
        });
        let params = DbscanParams::default();
        worker
            .submit(BackendRequest::Dbscan {
                points: vec![Point::new(0.0, 0.0)],
                params,
            })
            .unwrap();
        let latest = worker
            .submit(BackendRequest::Dbscan {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                params,
            })
            .unwrap();
        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        let response = worker.wait_latest(Duration::from_secs(5)).unwrap();
        assert_eq!(response, BackendResponse::Labels(vec![2, 2]));
        assert_eq!(latest.get(), 2);
        assert!(worker.poll_latest().is_none());
    }

    #[test]
    fn failures_are_delivered_for_current_request() {
        let mut worker = BackendWorker::with_executor(|_| {
            Err(BackendError::Transport("connection refused".into()))
        });
        worker.submit(BackendRequest::LogisticData).unwrap();
        let err = worker.wait_latest(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)), "{err:?}");
    }

    #[test]
    fn endpoint_names_match_routes() {
        assert_eq!(BackendRequest::LogisticData.endpoint(), "logistic-regression/data");
        assert_eq!(
            BackendRequest::InitializeNetwork {
                layer_sizes: vec![2, 1],
                activation: Activation::Sigmoid,
            }
            .endpoint(),
            "initialize"
        );
    }
}
