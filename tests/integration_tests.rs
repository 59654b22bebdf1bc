use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use serial_test::serial;
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use std::time::Duration;

static PORT_COUNTER: AtomicU16 = AtomicU16::new(9110);

const SAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}
";

/// The built binary in `serve` mode, killed on drop.
struct Service {
    process: Child,
    port: u16,
    client: reqwest::Client,
}

impl Service {
    fn spawn() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
        let process = Command::new(env!("CARGO_BIN_EXE_joltage-solver"))
            .args(["serve", "--port", &port.to_string()])
            .env_remove("SENTRY_DSN")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn joltage-solver");

        let service = Service {
            process,
            port,
            client: reqwest::Client::new(),
        };
        let listening = (0..50).any(|_| {
            let up = TcpStream::connect(("127.0.0.1", port)).is_ok();
            if !up {
                thread::sleep(Duration::from_millis(200));
            }
            up
        });
        assert!(listening, "nothing listening on port {}", port);
        service
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    async fn solve(&self, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/solve"))
            .json(&body)
            .send()
            .await
            .expect("POST /solve failed");
        let status = response.status();
        (status, response.json().await.expect("body is not JSON"))
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[tokio::test]
#[serial]
async fn test_health_endpoint() {
    let service = Service::spawn();
    let response = service.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
#[serial]
async fn test_solve_sample_input() {
    let service = Service::spawn();
    let (status, body) = service.solve(json!({ "input": SAMPLE })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 33);
    let lines: Vec<u64> = body["solutions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["line"].as_u64().unwrap())
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[tokio::test]
#[serial]
async fn test_solve_sample_in_lights_mode() {
    let service = Service::spawn();
    let (status, body) = service
        .solve(json!({ "input": SAMPLE, "mode": "lights" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
}

#[tokio::test]
#[serial]
async fn test_solve_infeasible_switchboard() {
    let service = Service::spawn();
    let (status, body) = service
        .solve(json!({
            "switchboards": [
                { "switches": [[0, 1], [1, 2]], "targets": [2, 2, 1] },
                { "switches": [[0], [1], [2]], "targets": [3, 4, 5] }
            ]
        }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "SOLVER_INFEASIBLE");
    assert_eq!(body["line"], 1);
}

#[tokio::test]
#[serial]
async fn test_solve_rejects_malformed_json() {
    let service = Service::spawn();
    let response = service
        .client
        .post(service.url("/solve"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("POST /solve failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[serial]
async fn test_unknown_route_is_not_found() {
    let service = Service::spawn();
    assert_eq!(
        service.get("/nonexistent").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
#[serial]
async fn test_docs_endpoint() {
    let service = Service::spawn();
    let response = service.get("/docs").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("<!DOCTYPE html"));
    assert!(html.contains("Joltage Solver API Documentation"));
}
