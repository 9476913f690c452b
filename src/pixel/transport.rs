use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::pixel::constants::{
    DEFAULT_ACTION_SOURCE, DEFAULT_GRAPH_API_VERSION, GRAPH_API_BASE_URL,
};
use crate::pixel::error::{
    internal_error, invalid_argument, network_error, sink_error, PixelResult,
};
use crate::pixel::sink::TrackingSink;

/// Configuration used to deliver pixel events server-side through the Meta Conversions API.
#[derive(Clone, Debug)]
pub struct ConversionsApiConfig {
    pixel_id: String,
    access_token: String,
    endpoint: ConversionsApiEndpoint,
    api_version: String,
    action_source: String,
    test_event_code: Option<String>,
    event_source_url: Option<String>,
    user_data: ConversionsUserData,
    timeout: Duration,
}

impl ConversionsApiConfig {
    pub fn new(pixel_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            pixel_id: pixel_id.into(),
            access_token: access_token.into(),
            endpoint: ConversionsApiEndpoint::Graph,
            api_version: DEFAULT_GRAPH_API_VERSION.to_string(),
            action_source: DEFAULT_ACTION_SOURCE.to_string(),
            test_event_code: None,
            event_source_url: None,
            user_data: ConversionsUserData::default(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: ConversionsApiEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_action_source(mut self, action_source: impl Into<String>) -> Self {
        self.action_source = action_source.into();
        self
    }

    /// Routes events to the "Test Events" view of Events Manager instead of production data.
    pub fn with_test_event_code(mut self, code: impl Into<String>) -> Self {
        self.test_event_code = Some(code.into());
        self
    }

    /// Page the events are attributed to. Expected by Meta for `website` events.
    pub fn with_event_source_url(mut self, url: impl Into<String>) -> Self {
        self.event_source_url = Some(url.into());
        self
    }

    /// Customer information matched against Meta accounts. `website` events are rejected
    /// without a `client_user_agent`.
    pub fn with_user_data(mut self, user_data: ConversionsUserData) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn user_data(&self) -> &ConversionsUserData {
        &self.user_data
    }

    pub fn pixel_id(&self) -> &str {
        &self.pixel_id
    }

    pub(crate) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The `user_data` block attached to every server event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionsUserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    /// Browser id from the `_fbp` cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    /// Click id from the `_fbc` cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
}

/// Supported endpoints for the Conversions API.
#[derive(Clone, Debug)]
pub enum ConversionsApiEndpoint {
    /// Production Graph API host: <https://graph.facebook.com>
    Graph,
    /// Custom base URL (primarily for testing).
    Custom(String),
}

impl ConversionsApiEndpoint {
    fn as_str(&self) -> &str {
        match self {
            ConversionsApiEndpoint::Graph => GRAPH_API_BASE_URL,
            ConversionsApiEndpoint::Custom(url) => url,
        }
    }
}

/// Sink that posts each event to `{endpoint}/{version}/{pixel_id}/events`.
///
/// Requests run on a dedicated worker thread that owns the blocking HTTP client, so `track`
/// returns as soon as the event is handed over and is safe to call from async handlers. Each
/// event is sent once; delivery failures are logged at `debug` level and never retried. The
/// worker exits when the last clone of the sink is dropped.
#[derive(Clone, Debug)]
pub struct ConversionsApiSink {
    jobs: Sender<Job>,
    config: ConversionsApiConfig,
}

impl ConversionsApiSink {
    pub fn new(config: ConversionsApiConfig) -> PixelResult<Self> {
        if config.pixel_id().trim().is_empty() {
            return Err(invalid_argument(
                "conversions API pixel_id must not be empty",
            ));
        }
        if config.access_token().trim().is_empty() {
            return Err(invalid_argument(
                "conversions API access_token must not be empty",
            ));
        }
        if config.action_source == DEFAULT_ACTION_SOURCE
            && config.user_data.client_user_agent.is_none()
        {
            log::warn!(
                "conversions API events with action_source `website` need a client_user_agent; \
                 Meta will reject them until one is configured"
            );
        }
        let delivery_config = config.clone();
        let events_url = events_url(&delivery_config)?;

        let (jobs, queue) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        thread::Builder::new()
            .name("pixel-conversions-api".to_string())
            .spawn(move || {
                let delivery = Client::builder()
                    .timeout(delivery_config.timeout())
                    .build()
                    .map(|client| Delivery {
                        client,
                        events_url,
                        config: delivery_config,
                    })
                    .map_err(|err| internal_error(format!("failed to build HTTP client: {err}")));
                match delivery {
                    Ok(delivery) => {
                        let _ = ready_tx.send(Ok(()));
                        run_worker(delivery, queue);
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                    }
                }
            })
            .map_err(|err| internal_error(format!("failed to spawn conversions API worker: {err}")))?;

        ready_rx
            .recv()
            .map_err(|_| internal_error("conversions API worker exited during startup"))??;

        Ok(Self { jobs, config })
    }

    pub fn config(&self) -> &ConversionsApiConfig {
        &self.config
    }

    /// Blocks until every event handed to this sink so far has been sent or dropped.
    pub fn flush(&self) -> PixelResult<()> {
        let (done_tx, done_rx) = mpsc::channel();
        self.jobs
            .send(Job::Flush(done_tx))
            .map_err(|_| sink_error("conversions API worker is not running"))?;
        done_rx
            .recv()
            .map_err(|_| sink_error("conversions API worker stopped before flushing"))
    }
}

impl TrackingSink for ConversionsApiSink {
    fn track(&self, event_name: &str, payload: &Map<String, Value>) -> PixelResult<()> {
        let event = QueuedEvent {
            event_name: event_name.to_string(),
            event_time: chrono::Utc::now().timestamp(),
            custom_data: payload.clone(),
        };
        self.jobs
            .send(Job::Send(event))
            .map_err(|_| sink_error("conversions API worker is not running"))
    }

    fn name(&self) -> &'static str {
        "conversions-api"
    }
}

#[derive(Debug)]
enum Job {
    Send(QueuedEvent),
    Flush(Sender<()>),
}

#[derive(Debug)]
struct QueuedEvent {
    event_name: String,
    event_time: i64,
    custom_data: Map<String, Value>,
}

fn run_worker(delivery: Delivery, queue: Receiver<Job>) {
    for job in queue {
        match job {
            Job::Send(event) => {
                if let Err(err) = delivery.send(&event) {
                    log::debug!(
                        "conversions API dropped {} event: {err}",
                        event.event_name
                    );
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Owns the blocking client; only ever used on the worker thread.
struct Delivery {
    client: Client,
    events_url: Url,
    config: ConversionsApiConfig,
}

impl Delivery {
    fn send(&self, event: &QueuedEvent) -> PixelResult<()> {
        let payload = ConversionsPayload {
            data: vec![ServerEvent {
                event_name: &event.event_name,
                event_time: event.event_time,
                action_source: &self.config.action_source,
                event_source_url: self.config.event_source_url.as_deref(),
                user_data: &self.config.user_data,
                custom_data: &event.custom_data,
            }],
            test_event_code: self.config.test_event_code.as_deref(),
        };

        let response = self
            .client
            .post(self.events_url.clone())
            .query(&[("access_token", self.config.access_token())])
            .json(&payload)
            .send()
            .map_err(|err| network_error(format!("failed to send pixel event: {err}")))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response
            .text()
            .unwrap_or_else(|_| "<unavailable response body>".to_string());

        let message = match status {
            StatusCode::BAD_REQUEST => {
                format!("conversions API rejected the event (400). Response: {body}")
            }
            _ => format!("conversions API request failed with status {status}. Response: {body}"),
        };

        Err(network_error(message))
    }
}

fn events_url(config: &ConversionsApiConfig) -> PixelResult<Url> {
    let base = config.endpoint.as_str();
    let mut url = Url::parse(base)
        .map_err(|err| invalid_argument(format!("invalid conversions API endpoint `{base}`: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid_argument(format!("conversions API endpoint `{base}` cannot be a base URL")))?
        .pop_if_empty()
        .extend([config.api_version.as_str(), config.pixel_id(), "events"]);
    Ok(url)
}

#[derive(Serialize)]
struct ConversionsPayload<'a> {
    data: Vec<ServerEvent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_event_code: Option<&'a str>,
}

#[derive(Serialize)]
struct ServerEvent<'a> {
    event_name: &'a str,
    event_time: i64,
    action_source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_source_url: Option<&'a str>,
    user_data: &'a ConversionsUserData,
    custom_data: &'a Map<String, Value>,
}
