use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{
    BuildForestRequest, BuildForestResponse, BuildTreeRequest, BuildTreeResponse, DbscanRequest,
    DbscanResponse, InitializeRequest, InitializeResponse, NetworkTrainRequest,
    NetworkTrainResponse, PredictForestRequest, PredictForestResponse, RegressionData,
    TrainRequest,
};
use super::errors::BackendError;
use crate::clustering::Label;
use crate::clustering::dbscan::{DbscanParams, validate_labels};
use crate::dataset::Samples;
use crate::geometry::Point;
use crate::http_client;
use crate::ml::activation::Activation;
use crate::ml::linreg::{LinearFit, LinearHistory};
use crate::ml::logreg::LogisticHistory;
use crate::ml::mlp::{Network, TrainStep};

const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Blocking client for the compute backend rooted at `base_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendClient {
    base_url: Url,
}

impl BackendClient {
    /// Accepts absolute `http`/`https` URLs; a trailing slash is optional.
    pub fn new(api_url: &str) -> Result<Self, BackendError> {
        let base_url = parse_api_url(api_url)?;
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn build_tree(&self, request: &BuildTreeRequest) -> Result<BuildTreeResponse, BackendError> {
        self.post_json("build_tree", request)
    }

    pub fn build_forest(
        &self,
        request: &BuildForestRequest,
    ) -> Result<BuildForestResponse, BackendError> {
        let response: BuildForestResponse = self.post_json("build_forest", request)?;
        if response.trees.is_empty() {
            return Err(BackendError::Validation("forest has no trees".into()));
        }
        Ok(response)
    }

    pub fn predict_forest(
        &self,
        request: &PredictForestRequest,
    ) -> Result<PredictForestResponse, BackendError> {
        self.post_json("predict_forest", request)
    }

    /// Cluster labels for `points`; the reply must carry one label per point.
    pub fn dbscan(&self, points: &[Point], params: DbscanParams) -> Result<Vec<Label>, BackendError> {
        let request = DbscanRequest {
            points: points.iter().map(|point| [point.x, point.y]).collect(),
            epsilon: params.epsilon,
            min_points: params.min_points,
        };
        let response: DbscanResponse = self.post_json("dbscan", &request)?;
        validate_labels(points, &response.labels)
            .map_err(|err| BackendError::Validation(err.to_string()))?;
        Ok(response.labels)
    }

    pub fn logistic_data(&self) -> Result<RegressionData, BackendError> {
        let data: RegressionData = self.get_json("logistic-regression/data")?;
        check_rows(&data.x, &data.y)?;
        Ok(data)
    }

    pub fn logistic_train_history(
        &self,
        samples: &Samples,
        learning_rate: f64,
        iterations: usize,
    ) -> Result<LogisticHistory, BackendError> {
        let request = train_request(samples, learning_rate, iterations)?;
        let history: LogisticHistory =
            self.post_json("logistic-regression/train-history", &request)?;
        history
            .validate(samples.len())
            .map_err(BackendError::Validation)?;
        Ok(history)
    }

    pub fn linear_regression(
        &self,
        samples: &Samples,
        learning_rate: f64,
        iterations: usize,
    ) -> Result<LinearFit, BackendError> {
        let request = train_request(samples, learning_rate, iterations)?;
        self.post_json("linear-regression", &request)
    }

    pub fn linear_regression_history(
        &self,
        samples: &Samples,
        learning_rate: f64,
        iterations: usize,
    ) -> Result<LinearHistory, BackendError> {
        let request = train_request(samples, learning_rate, iterations)?;
        let history: LinearHistory = self.post_json("linear-regression-history", &request)?;
        history.validate().map_err(BackendError::Validation)?;
        Ok(history)
    }

    /// Fresh network weights for `layer_sizes` (input size first).
    pub fn initialize_network(
        &self,
        layer_sizes: &[usize],
        activation: Activation,
    ) -> Result<Network, BackendError> {
        let request = InitializeRequest {
            layer_sizes: layer_sizes.to_vec(),
            activation,
        };
        let response: InitializeResponse = self.post_json("initialize", &request)?;
        let network = Network {
            layers: response.layers,
        };
        let input_len = layer_sizes.first().copied().unwrap_or(0);
        network
            .validate(input_len)
            .map_err(|err| BackendError::Validation(err.to_string()))?;
        if network.sizes() != layer_sizes {
            return Err(BackendError::Validation(format!(
                "requested layer sizes {layer_sizes:?} but got {:?}",
                network.sizes()
            )));
        }
        Ok(network)
    }

    /// One remote training step; `network` is replaced by the updated weights.
    pub fn train_network(
        &self,
        network: &mut Network,
        input: &[f64],
        target: &[f64],
        learning_rate: f64,
    ) -> Result<TrainStep, BackendError> {
        let request = NetworkTrainRequest {
            layers: network.layers.clone(),
            input: input.to_vec(),
            target: target.to_vec(),
            learning_rate,
        };
        let response: NetworkTrainResponse = self.post_json("train", &request)?;
        let updated = Network {
            layers: response.layers,
        };
        updated
            .validate(input.len())
            .map_err(|err| BackendError::Validation(err.to_string()))?;
        *network = updated;
        Ok(TrainStep {
            deltas: response.deltas,
            activations: response.activations,
            loss: response.loss,
        })
    }

    fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "POST");
        let payload =
            serde_json::to_value(body).map_err(|err| BackendError::Json(err.to_string()))?;
        let request = http_client::agent()
            .post(&url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");
        decode_response(request.send_json(payload))
    }

    fn get_json<Resp: DeserializeOwned>(&self, path: &str) -> Result<Resp, BackendError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let request = http_client::agent()
            .get(&url)
            .set("Accept", "application/json");
        decode_response(request.call())
    }
}

pub(crate) fn parse_api_url(api_url: &str) -> Result<Url, BackendError> {
    let trimmed = api_url.trim();
    let url = Url::parse(trimmed).map_err(|err| BackendError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn decode_response<Resp: DeserializeOwned>(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Resp, BackendError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = http_client::read_body_text(response, MAX_ERROR_BODY_BYTES)
                .unwrap_or_else(|err| err);
            return Err(BackendError::Status { code, body });
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(BackendError::Transport(err.to_string()));
        }
    };
    let body = http_client::read_body_text(response, MAX_RESPONSE_BYTES)
        .map_err(BackendError::Transport)?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(BackendError::Json("Empty response body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| BackendError::Json(err.to_string()))
}

fn check_rows(x: &[Vec<f64>], y: &[f64]) -> Result<(), BackendError> {
    if x.len() != y.len() {
        return Err(BackendError::Validation(format!(
            "X has {} rows but y has {}",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

fn train_request(
    samples: &Samples,
    learning_rate: f64,
    iterations: usize,
) -> Result<TrainRequest, BackendError> {
    check_rows(&samples.x, &samples.y)?;
    Ok(TrainRequest {
        x: samples.x.clone(),
        y: samples.y.clone(),
        learning_rate,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = BackendClient::new("http://localhost:5000/api/").unwrap();
        assert_eq!(client.endpoint("/dbscan"), "http://localhost:5000/api/dbscan");
        let client = BackendClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.endpoint("build_tree"), "http://localhost:5000/build_tree");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            BackendClient::new("ftp://example.com"),
            Err(BackendError::InvalidUrl { .. })
        ));
        assert!(matches!(
            BackendClient::new("not a url"),
            Err(BackendError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn mismatched_rows_fail_before_sending() {
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        let samples = Samples {
            x: vec![vec![1.0], vec![2.0]],
            y: vec![0.0],
        };
        assert!(matches!(
            client.linear_regression(&samples, 0.1, 5),
            Err(BackendError::Validation(_))
        ));
    }
}
