mod support;

use std::time::Duration;

use mlgallery::backend::{BackendClient, BackendError, BackendRequest, BackendResponse, BackendWorker};
use mlgallery::clustering::dbscan::DbscanParams;
use mlgallery::dataset::Samples;
use mlgallery::geometry::Point;
use mlgallery::ml::activation::Activation;
use support::http_stub::serve_json_once;

fn three_points() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(0.5, 0.0),
        Point::new(9.0, 9.0),
    ]
}

fn tiny_samples() -> Samples {
    Samples {
        x: vec![vec![-1.0, -1.0], vec![1.0, 1.0]],
        y: vec![0.0, 1.0],
    }
}

#[test]
fn dbscan_posts_points_as_pairs_with_min_points() {
    let stub = serve_json_once(200, r#"{"labels":[0,0,-1]}"#);
    let client = BackendClient::new(&stub.url).unwrap();
    let labels = client
        .dbscan(
            &three_points(),
            DbscanParams {
                epsilon: 1.5,
                min_points: 2,
            },
        )
        .unwrap();
    assert_eq!(labels, vec![0, 0, -1]);

    let request = stub.request();
    assert!(request.request_line.starts_with("POST /dbscan"));
    let body = request.json();
    assert_eq!(body["minPoints"], 2);
    assert_eq!(body["epsilon"], 1.5);
    assert_eq!(body["points"][2], serde_json::json!([9.0, 9.0]));
}

#[test]
fn dbscan_label_count_mismatch_is_a_validation_error() {
    let stub = serve_json_once(200, r#"{"labels":[0,-1]}"#);
    let client = BackendClient::new(&stub.url).unwrap();
    let err = client
        .dbscan(&three_points(), DbscanParams::default())
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)), "{err:?}");
}

#[test]
fn server_errors_keep_status_and_body() {
    let stub = serve_json_once(503, r#"{"error":"warming up"}"#);
    let client = BackendClient::new(&stub.url).unwrap();
    let err = client.logistic_data().unwrap_err();
    match &err {
        BackendError::Status { code, body } => {
            assert_eq!(*code, 503);
            assert!(body.contains("warming up"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(stub.request().request_line.starts_with("GET /logistic-regression/data"));
}

#[test]
fn logistic_history_is_decoded_and_checked() {
    let body = r#"{
        "weights_history": [[0.0, 0.1, 0.1], [0.0, 0.2, 0.2]],
        "loss_history": [0.6, 0.5],
        "final_predictions": [0, 1],
        "final_loss": 0.5
    }"#;
    let stub = serve_json_once(200, body);
    let client = BackendClient::new(&format!("{}/", stub.url)).unwrap();
    let history = client
        .logistic_train_history(&tiny_samples(), 0.1, 2)
        .unwrap();
    assert_eq!(history.weights_history.len(), 2);
    assert_eq!(history.final_predictions, vec![0.0, 1.0]);

    let sent = stub.request().json();
    assert_eq!(sent["X"], serde_json::json!([[-1.0, -1.0], [1.0, 1.0]]));
    assert_eq!(sent["iterations"], 2);
}

#[test]
fn logistic_history_with_ragged_arrays_is_rejected() {
    let body = r#"{
        "weights_history": [[0.0, 0.1, 0.1]],
        "loss_history": [0.6, 0.5],
        "final_predictions": [0, 1],
        "final_loss": 0.5
    }"#;
    let stub = serve_json_once(200, body);
    let client = BackendClient::new(&stub.url).unwrap();
    let err = client
        .logistic_train_history(&tiny_samples(), 0.1, 2)
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)), "{err:?}");
}

#[test]
fn initialized_network_must_match_requested_sizes() {
    let body = r#"{"layers":[
        {"weights":[[0.1,0.2],[0.3,0.4]],"biases":[0.0,0.0],"activation":"sigmoid"},
        {"weights":[[0.5,0.6]],"biases":[0.0],"activation":"sigmoid"}
    ]}"#;
    let stub = serve_json_once(200, body);
    let client = BackendClient::new(&stub.url).unwrap();
    let network = client
        .initialize_network(&[2, 2, 1], Activation::Sigmoid)
        .unwrap();
    assert_eq!(network.sizes(), vec![2, 2, 1]);

    let stub = serve_json_once(200, body);
    let client = BackendClient::new(&stub.url).unwrap();
    let err = client
        .initialize_network(&[2, 3, 1], Activation::Sigmoid)
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)), "{err:?}");
}

#[test]
fn worker_delivers_the_latest_response() {
    let stub = serve_json_once(200, r#"{"labels":[1,1,1]}"#);
    let mut worker = BackendWorker::spawn(BackendClient::new(&stub.url).unwrap());
    let token = worker
        .submit(BackendRequest::Dbscan {
            points: three_points(),
            params: DbscanParams::default(),
        })
        .unwrap();
    assert_eq!(worker.latest_token(), Some(token));
    let response = worker.wait_latest(Duration::from_secs(10)).unwrap();
    assert_eq!(response, BackendResponse::Labels(vec![1, 1, 1]));
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let client = BackendClient::new(&url).unwrap();
    let err = client.logistic_data().unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)), "{err:?}");
}

#[test]
fn non_http_urls_are_rejected() {
    assert!(matches!(
        BackendClient::new("ftp://example.com"),
        Err(BackendError::InvalidUrl { .. })
    ));
    assert!(matches!(
        BackendClient::new("not a url"),
        Err(BackendError::InvalidUrl { .. })
    ));
}
