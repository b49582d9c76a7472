//! Common utilities for integration tests

use async_trait::async_trait;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uplink_client::ApiClient;
use uplink_core::{Environment, EnvironmentConfig, Origin, Sleeper};
use url::Url;

/// Install a test subscriber once so check logs show up with
/// `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("uplink=debug")
        .with_test_writer()
        .try_init();
}

/// Sleeper that records requested backoff delays without waiting
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Environment configuration pointed at an arbitrary base URL with
/// test-friendly settings
pub fn test_config(base_url: &str, timeout: Duration, retry_attempts: u32) -> EnvironmentConfig {
    EnvironmentConfig::new(
        Url::parse(base_url).expect("test base URL is valid"),
        false,
        timeout,
        retry_attempts,
        Environment::Development,
    )
    .expect("test configuration is valid")
}

/// Client whose origin matches the server it talks to, so transport
/// failures do not trip the cross-origin heuristic
pub fn same_origin_client(server_url: &str) -> ApiClient {
    ApiClient::builder(Origin::parse(server_url).expect("server URL parses"))
        .with_config(test_config(server_url, Duration::from_secs(5), 1))
        .build()
        .expect("client builds")
}

/// Client for `base_url` whose origin is a different host, marking every
/// request cross-origin
pub fn cross_origin_client(base_url: &str, timeout: Duration, retry_attempts: u32) -> ApiClient {
    ApiClient::builder(Origin::new("http", "localhost", Some(3000)))
        .with_config(test_config(base_url, timeout, retry_attempts))
        .build()
        .expect("client builds")
}

/// A 127.0.0.1 URL whose port was just released, so connections are
/// refused
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// A non-routable URL that swallows SYNs, for timeout tests
pub fn unroutable_base_url() -> String {
    "http://10.255.255.1:81".to_string()
}

/// Client wired with a recording sleeper, returning both handles
pub fn client_with_recording_sleeper(
    base_url: &str,
    timeout: Duration,
    retry_attempts: u32,
) -> (ApiClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = ApiClient::builder(Origin::parse(base_url).expect("base URL parses"))
        .with_config(test_config(base_url, timeout, retry_attempts))
        .with_sleeper(sleeper.clone())
        .build()
        .expect("client builds");
    (client, sleeper)
}
