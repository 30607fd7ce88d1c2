//! reqwest-backed HTTP output.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Request, StatusCode};
use tracing::{debug, error, info, warn};

use httpout_core::{
    Capsule, ConfigurationError, ConfigurationResult, Event, HttpOutputConfig, Outputer,
    PublishError, PublishOptions, PublishResult, Signaler, StatusPolicy, merge_fields,
};

/// Marker header set on every request before the custom headers.
pub const MARKER_HEADER: (&str, &str) = ("x-custom-header", "myvalue");

/// Publishes event batches to one HTTP endpoint.
///
/// Everything but the batch is fixed at construction. The inner client pools
/// connections and is shared by concurrent publish calls.
pub struct HttpOutput {
    client: Client,
    url: String,
    headers: HeaderMap,
    custom_fields: Event,
    capsule: Option<(Capsule, String)>,
    status_policy: StatusPolicy,
}

impl HttpOutput {
    /// Builds an output from its configuration.
    pub fn new(config: HttpOutputConfig) -> ConfigurationResult<Self> {
        config.validate()?;

        let url = config.url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warn!(url = %url, "Destination has no http(s) scheme, requests will fail to build");
        }

        let headers = build_headers(&config.custom_headers)?;
        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;

        let capsule = match config.capsule() {
            Some((capsule, signature)) => {
                if !capsule.contains(signature) {
                    warn!(signature = %signature, "Capsule never mentions its signature");
                }
                Some((capsule.clone(), signature.to_string()))
            }
            None => {
                if config.encapsulation_sign.is_some() {
                    debug!("Signature configured without a capsule, ignoring");
                }
                None
            }
        };

        info!(
            url = %url,
            capsule = capsule.is_some(),
            custom_headers = config.custom_headers.len(),
            custom_fields = config.custom_fields.len(),
            status_policy = ?config.status_policy,
            "HTTP output initialized"
        );

        Ok(Self {
            client,
            url,
            headers,
            custom_fields: config.custom_fields,
            capsule,
            status_policy: config.status_policy,
        })
    }

    /// The destination URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Merges custom fields into `events` and encodes the request body.
    pub fn encode(&self, mut events: Vec<Event>) -> PublishResult<Vec<u8>> {
        merge_fields(&mut events, &self.custom_fields);
        let body = match &self.capsule {
            Some((capsule, signature)) => serde_json::to_vec(&capsule.substitute(signature, &events))?,
            None => serde_json::to_vec(&events)?,
        };
        Ok(body)
    }

    fn build_request(&self, body: Vec<u8>) -> PublishResult<Request> {
        self.client
            .post(&self.url)
            .headers(self.headers.clone())
            .body(body)
            .build()
            .map_err(|e| PublishError::Request(e.to_string()))
    }

    /// Sends the request and reads the response body.
    async fn round_trip(&self, request: Request) -> PublishResult<(StatusCode, String)> {
        let resp = self.client.execute(request).await.map_err(classify)?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }

    /// Runs the round trip under the caller's deadline and cancellation token.
    async fn round_trip_bounded(
        &self,
        request: Request,
        opts: &PublishOptions,
    ) -> PublishResult<(StatusCode, String)> {
        let bounded = async {
            match opts.timeout {
                Some(limit) => match tokio::time::timeout(limit, self.round_trip(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(PublishError::Timeout),
                },
                None => self.round_trip(request).await,
            }
        };

        match &opts.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(PublishError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    async fn publish(&self, opts: &PublishOptions, events: Vec<Event>) -> PublishResult<()> {
        let body = self.encode(events)?;
        let request = self.build_request(body)?;

        let (status, body) = self.round_trip_bounded(request, opts).await?;
        debug!(status = %status, body = %body, "Response received");

        if !self.status_policy.accepts(status.as_u16()) {
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Outputer for HttpOutput {
    async fn publish_events(
        &self,
        signaler: &dyn Signaler,
        opts: &PublishOptions,
        events: Vec<Event>,
    ) -> PublishResult<()> {
        let count = events.len();
        match self.publish(opts, events).await {
            Ok(()) => {
                debug!(url = %self.url, events = count, "Batch delivered");
                signaler.completed();
                Ok(())
            }
            Err(e) => {
                if opts.guaranteed {
                    error!(url = %self.url, events = count, error = %e, "Unable to deliver batch");
                } else {
                    warn!(url = %self.url, events = count, error = %e, "Failed to deliver batch");
                }
                signaler.failed(&e);
                Err(e)
            }
        }
    }
}

/// Builds the fixed header set: defaults first, then custom headers.
fn build_headers(custom: &BTreeMap<String, String>) -> ConfigurationResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(MARKER_HEADER.0),
        HeaderValue::from_static(MARKER_HEADER.1),
    );

    for (name, value) in custom {
        let invalid = |reason: String| ConfigurationError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn classify(err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        PublishError::Timeout
    } else if err.is_builder() {
        PublishError::Request(err.to_string())
    } else {
        PublishError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap as ServerHeaders, StatusCode as ServerStatus};
    use axum::routing::post;
    use httpout_core::{ChannelSignaler, NoopSignaler, SignalOutcome};
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;

    struct Captured {
        headers: ServerHeaders,
        body: Bytes,
    }

    type Shared = Arc<Mutex<Vec<Captured>>>;

    struct TestServer {
        addr: std::net::SocketAddr,
        captured: Shared,
    }

    impl TestServer {
        fn url(&self) -> String {
            format!("http://{}", self.addr)
        }

        fn bodies(&self) -> Vec<Value> {
            self.captured
                .lock()
                .iter()
                .map(|c| serde_json::from_slice(&c.body).unwrap())
                .collect()
        }
    }

    async fn capture(
        State((captured, status, delay)): State<(Shared, ServerStatus, Duration)>,
        headers: ServerHeaders,
        body: Bytes,
    ) -> (ServerStatus, &'static str) {
        tokio::time::sleep(delay).await;
        captured.lock().push(Captured { headers, body });
        (status, "ack")
    }

    async fn spawn_server(status: ServerStatus, delay: Duration) -> TestServer {
        let captured: Shared = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route("/", post(capture))
            .with_state((captured.clone(), status, delay));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestServer { addr, captured }
    }

    fn events(value: Value) -> Vec<Event> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_passthrough_body_and_default_headers() {
        let server = spawn_server(ServerStatus::OK, Duration::ZERO).await;
        let output = HttpOutput::new(HttpOutputConfig::new(server.url())).unwrap();
        let batch = events(json!([{"msg": "a"}, {"msg": "b", "n": 2}]));

        output
            .publish_events(&NoopSignaler, &PublishOptions::new(), batch.clone())
            .await
            .unwrap();

        let captured = server.captured.lock();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].body.as_ref(), serde_json::to_vec(&batch).unwrap());
        assert_eq!(captured[0].headers["content-type"], "application/json");
        assert_eq!(captured[0].headers["x-custom-header"], "myvalue");
    }

    #[tokio::test]
    async fn test_capsule_body() {
        let server = spawn_server(ServerStatus::OK, Duration::ZERO).await;
        let capsule: Capsule =
            serde_json::from_str(r#"{"type": "batch", "payload": "EVENTS"}"#).unwrap();
        let config = HttpOutputConfig::new("http://127.0.0.1")
            .with_port(server.addr.port())
            .with_capsule(capsule, "EVENTS");
        let output = HttpOutput::new(config).unwrap();

        output
            .publish_events(
                &NoopSignaler,
                &PublishOptions::new(),
                events(json!([{"msg": "hi"}])),
            )
            .await
            .unwrap();

        let captured = server.captured.lock();
        assert_eq!(
            captured[0].body.as_ref(),
            br#"{"type":"batch","payload":[{"msg":"hi"}]}"#
        );
    }

    #[tokio::test]
    async fn test_single_event_and_custom_fields() {
        let server = spawn_server(ServerStatus::OK, Duration::ZERO).await;
        let config = HttpOutputConfig::new(server.url()).with_field("env", "prod");
        let output = HttpOutput::new(config).unwrap();
        let event = events(json!([{"msg": "a", "env": "dev"}])).remove(0);

        output
            .publish_event(&NoopSignaler, &PublishOptions::new(), event)
            .await
            .unwrap();

        assert_eq!(server.bodies(), vec![json!([{"msg": "a", "env": "prod"}])]);
    }

    #[tokio::test]
    async fn test_custom_headers_override_defaults() {
        let server = spawn_server(ServerStatus::OK, Duration::ZERO).await;
        let config = HttpOutputConfig::new(server.url())
            .with_header("X-Custom-Header", "overridden")
            .with_header("Authorization", "Bearer token");
        let output = HttpOutput::new(config).unwrap();

        output
            .publish_events(&NoopSignaler, &PublishOptions::new(), Vec::new())
            .await
            .unwrap();

        let captured = server.captured.lock();
        let marker: Vec<_> = captured[0]
            .headers
            .get_all("x-custom-header")
            .iter()
            .collect();
        assert_eq!(marker, vec!["overridden"]);
        assert_eq!(captured[0].headers["authorization"], "Bearer token");
        assert_eq!(captured[0].body.as_ref(), b"[]");
    }

    #[tokio::test]
    async fn test_strict_policy_fails_on_error_status() {
        let server = spawn_server(ServerStatus::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let output = HttpOutput::new(HttpOutputConfig::new(server.url())).unwrap();
        let (signaler, rx) = ChannelSignaler::new();

        let result = output
            .publish_events(&signaler, &PublishOptions::new().guaranteed(), Vec::new())
            .await;

        let expected = PublishError::Status {
            status: 500,
            body: "ack".to_string(),
        };
        assert_eq!(result, Err(expected.clone()));
        assert_eq!(rx.await.unwrap(), SignalOutcome::Failed(expected));
    }

    #[tokio::test]
    async fn test_ignore_policy_accepts_error_status() {
        let server = spawn_server(ServerStatus::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let config = HttpOutputConfig::new(server.url()).with_status_policy(StatusPolicy::Ignore);
        let output = HttpOutput::new(config).unwrap();
        let (signaler, rx) = ChannelSignaler::new();

        let result = output
            .publish_events(&signaler, &PublishOptions::new(), Vec::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(rx.await.unwrap(), SignalOutcome::Completed);
    }

    #[tokio::test]
    async fn test_per_call_timeout() {
        let server = spawn_server(ServerStatus::OK, Duration::from_secs(5)).await;
        let output = HttpOutput::new(HttpOutputConfig::new(server.url())).unwrap();
        let opts = PublishOptions::new().with_timeout(Duration::from_millis(50));

        let result = output.publish_events(&NoopSignaler, &opts, Vec::new()).await;

        assert_eq!(result, Err(PublishError::Timeout));
    }

    #[tokio::test]
    async fn test_cancelled_publish() {
        let server = spawn_server(ServerStatus::OK, Duration::from_secs(5)).await;
        let output = HttpOutput::new(HttpOutputConfig::new(server.url())).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let (signaler, rx) = ChannelSignaler::new();

        let result = output
            .publish_events(&signaler, &PublishOptions::new().with_cancel(token), Vec::new())
            .await;

        assert_eq!(result, Err(PublishError::Cancelled));
        assert_eq!(
            rx.await.unwrap(),
            SignalOutcome::Failed(PublishError::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_host_without_scheme_fails_to_build_request() {
        let output = HttpOutput::new(HttpOutputConfig::new("localhost")).unwrap();

        let result = output
            .publish_events(&NoopSignaler, &PublishOptions::new(), Vec::new())
            .await;

        assert!(matches!(result, Err(PublishError::Request(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let output = HttpOutput::new(HttpOutputConfig::new(format!("http://{addr}"))).unwrap();

        let result = output
            .publish_events(&NoopSignaler, &PublishOptions::new(), Vec::new())
            .await;

        assert!(matches!(result, Err(PublishError::Transport(_))));
    }

    #[tokio::test]
    async fn test_outputs_do_not_share_configuration() {
        let server = spawn_server(ServerStatus::OK, Duration::ZERO).await;
        let first = HttpOutput::new(
            HttpOutputConfig::new(server.url())
                .with_field("sink", "first")
                .with_capsule(Capsule::from(json!({"a": "ONE"})), "ONE"),
        )
        .unwrap();
        let second = HttpOutput::new(
            HttpOutputConfig::new(server.url())
                .with_field("other", true)
                .with_capsule(Capsule::from(json!({"b": "TWO", "c": "ONE"})), "TWO"),
        )
        .unwrap();
        let batch = events(json!([{"msg": "x"}]));

        first
            .publish_events(&NoopSignaler, &PublishOptions::new(), batch.clone())
            .await
            .unwrap();
        second
            .publish_events(&NoopSignaler, &PublishOptions::new(), batch)
            .await
            .unwrap();

        assert_eq!(
            server.bodies(),
            vec![
                json!({"a": [{"msg": "x", "sink": "first"}]}),
                json!({"b": [{"msg": "x", "other": true}], "c": "ONE"}),
            ]
        );
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            HttpOutput::new(HttpOutputConfig::new("")),
            Err(ConfigurationError::MissingHost)
        ));

        let capsule = Capsule::from(json!({"payload": "EVENTS"}));
        assert!(matches!(
            HttpOutput::new(HttpOutputConfig::new("http://sink").with_capsule(capsule, "")),
            Err(ConfigurationError::MissingSignature)
        ));

        assert!(matches!(
            HttpOutput::new(HttpOutputConfig::new("http://sink").with_header("bad header", "v")),
            Err(ConfigurationError::InvalidHeader { .. })
        ));

        assert!(matches!(
            HttpOutput::new(HttpOutputConfig::new("http://sink").with_timeout(Duration::ZERO)),
            Err(ConfigurationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_encode_merges_fields_before_substitution() {
        let config = HttpOutputConfig::new("http://sink")
            .with_field("env", "prod")
            .with_capsule(Capsule::from(json!(["EVENTS", 1])), "EVENTS");
        let output = HttpOutput::new(config).unwrap();

        let body = output.encode(events(json!([{"env": "dev"}]))).unwrap();

        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!([[{"env": "prod"}], 1])
        );
    }
}
