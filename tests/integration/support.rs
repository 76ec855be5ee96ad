//! Shared fixtures for the integration tests

use batch_fetch::config::{Config, TimingPolicy};
use batch_fetch::Dispatcher;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A wiremock server usable from synchronous tests
///
/// Dispatch is blocking and builds its own runtimes, so tests run on plain
/// threads and only use this runtime to drive the mock server.
pub struct StubServer {
    server: MockServer,
    runtime: Runtime,
}

impl StubServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("Failed to build test runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// Serves `body` with status 200 at `route`
    pub fn serve(&self, route: &str, body: &[u8]) {
        self.mount(route, ResponseTemplate::new(200).set_body_bytes(body.to_vec()));
    }

    /// Serves `body` at `route` after `delay`
    pub fn serve_delayed(&self, route: &str, body: &[u8], delay: Duration) {
        self.mount(
            route,
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        );
    }

    /// Answers `route` with a bare status code
    pub fn serve_status(&self, route: &str, status: u16) {
        self.mount(route, ResponseTemplate::new(status));
    }

    fn mount(&self, route: &str, response: ResponseTemplate) {
        self.runtime.block_on(
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(response)
                .mount(&self.server),
        );
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.server.uri(), route)
    }

    /// Number of requests the server has seen so far
    pub fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

/// Config writing into `dir`, with the worker binary built alongside the tests
pub fn test_config(dir: &Path, timing: TimingPolicy) -> Config {
    let mut config = Config::default();
    config.fetch.output_dir = dir.to_path_buf();
    config.fetch.timing = timing;
    config.fetch.user_agent = "TestFetcher/1.0".to_string();
    config.pool.workers = Some(4);
    config.pool.worker_program = Some(env!("CARGO_BIN_EXE_batch-fetch-worker").into());
    config
}

pub fn test_dispatcher(dir: &Path) -> Dispatcher {
    Dispatcher::new(test_config(dir, TimingPolicy::Elapsed)).expect("Failed to build dispatcher")
}
