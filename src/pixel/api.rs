use std::fmt;
use std::sync::Arc;

use crate::pixel::config::PixelOptions;
use crate::pixel::error::PixelResult;
use crate::pixel::event::TrackingEvent;
use crate::pixel::sink::{NoopSink, TrackingSink};

/// Formats business events and hands them to a [`TrackingSink`].
///
/// Tracking is fire-and-forget: none of the `track_*` methods return an error or a value, and a
/// missing or failing sink only means the event is dropped. Inputs are forwarded untouched, so a
/// zero or negative price and an empty name are all accepted.
#[derive(Clone)]
pub struct PixelTracker {
    sink: Arc<dyn TrackingSink>,
}

impl fmt::Debug for PixelTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelTracker")
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl Default for PixelTracker {
    fn default() -> Self {
        Self::disabled()
    }
}

impl PixelTracker {
    pub fn new(sink: impl TrackingSink + 'static) -> Self {
        Self::from_arc(Arc::new(sink))
    }

    pub fn from_arc(sink: Arc<dyn TrackingSink>) -> Self {
        Self { sink }
    }

    /// A tracker that drops every event.
    pub fn disabled() -> Self {
        Self::new(NoopSink)
    }

    /// Picks a sink from the supplied options.
    ///
    /// In the browser (`wasm-web`) this is always the `fbq` sink. On native targets the
    /// Conversions API is used when both a pixel id and an access token are present; otherwise
    /// events are dropped.
    pub fn from_options(options: &PixelOptions) -> PixelResult<Self> {
        let tracker = if options.enabled {
            Self::from_arc(platform_sink(options)?)
        } else {
            Self::disabled()
        };
        log::debug!("pixel tracker using `{}` sink", tracker.sink_name());
        Ok(tracker)
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    pub fn track_add_to_cart(&self, plan_name: &str, price: f64) {
        self.track_event(&TrackingEvent::add_to_cart(plan_name, price));
    }

    pub fn track_initiate_checkout(&self, plan_name: &str, price: f64) {
        self.track_event(&TrackingEvent::initiate_checkout(plan_name, price));
    }

    /// Tracks a content view. `content_type` defaults to `"page"`.
    pub fn track_view_content(&self, content_name: &str, content_type: Option<&str>) {
        self.track_event(&TrackingEvent::view_content(content_name, content_type));
    }

    /// Forwards an already built event. The sink is called at most once.
    pub fn track_event(&self, event: &TrackingEvent) {
        if let Err(err) = self.sink.track(event.name(), &event.payload()) {
            log::debug!(
                "pixel sink `{}` dropped {} event: {err}",
                self.sink.name(),
                event.name()
            );
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn platform_sink(_options: &PixelOptions) -> PixelResult<Arc<dyn TrackingSink>> {
    Ok(Arc::new(crate::pixel::fbq::FbqSink::new()))
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_sink(options: &PixelOptions) -> PixelResult<Arc<dyn TrackingSink>> {
    match options.conversions_api_config() {
        Some(config) => Ok(Arc::new(crate::pixel::transport::ConversionsApiSink::new(
            config,
        )?)),
        None => Ok(Arc::new(NoopSink)),
    }
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm-web")))]
fn platform_sink(_options: &PixelOptions) -> PixelResult<Arc<dyn TrackingSink>> {
    Ok(Arc::new(NoopSink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::error::sink_error;
    use crate::pixel::sink::callback_sink;
    use crate::test_support::recording_tracker;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn add_to_cart_dispatches_once() {
        let (tracker, sink) = recording_tracker();
        tracker.track_add_to_cart("Pro Plan", 29.99);

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].event_name, "AddToCart");
        assert_eq!(
            Value::Object(calls[0].payload.clone()),
            json!({
                "content_name": "Pro Plan",
                "content_type": "product",
                "value": 29.99,
                "currency": "USD"
            })
        );
    }

    #[test]
    fn initiate_checkout_dispatches_once() {
        let (tracker, sink) = recording_tracker();
        tracker.track_initiate_checkout("Pro Plan", 29.99);

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].event_name, "InitiateCheckout");
        assert_eq!(calls[0].payload.get("value"), Some(&json!(29.99)));
        assert_eq!(calls[0].payload.get("currency"), Some(&json!("USD")));
        assert_eq!(calls[0].payload.get("content_type"), Some(&json!("product")));
    }

    #[test]
    fn view_content_defaults_to_page() {
        let (tracker, sink) = recording_tracker();
        tracker.track_view_content("Pricing Page", None);

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].event_name, "ViewContent");
        assert_eq!(
            Value::Object(calls[0].payload.clone()),
            json!({"content_name": "Pricing Page", "content_type": "page"})
        );
    }

    #[test]
    fn view_content_accepts_custom_type() {
        let (tracker, sink) = recording_tracker();
        tracker.track_view_content("Docs", Some("article"));
        assert_eq!(
            sink.calls()[0].payload.get("content_type"),
            Some(&json!("article"))
        );
    }

    #[test]
    fn disabled_tracker_returns_normally() {
        let tracker = PixelTracker::disabled();
        tracker.track_initiate_checkout("Pro Plan", 29.99);
        tracker.track_add_to_cart("Pro Plan", 29.99);
        tracker.track_view_content("Pricing Page", None);
        assert_eq!(tracker.sink_name(), "noop");
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let tracker = PixelTracker::new(callback_sink(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Err(sink_error("fbq threw"))
        }));

        tracker.track_add_to_cart("Pro Plan", 29.99);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn calls_are_forwarded_in_order() {
        let (tracker, sink) = recording_tracker();
        tracker.track_view_content("Pricing Page", None);
        tracker.track_add_to_cart("Pro Plan", 29.99);
        tracker.track_initiate_checkout("Pro Plan", 29.99);

        let names: Vec<_> = sink.calls().into_iter().map(|c| c.event_name).collect();
        assert_eq!(names, ["ViewContent", "AddToCart", "InitiateCheckout"]);
    }

    #[test]
    fn permissive_inputs_are_forwarded() {
        let (tracker, sink) = recording_tracker();
        tracker.track_add_to_cart("", -10.0);
        tracker.track_initiate_checkout("Free", 0.0);

        let calls = sink.calls();
        assert_eq!(calls[0].payload.get("content_name"), Some(&json!("")));
        assert_eq!(calls[0].payload.get("value"), Some(&json!(-10.0)));
        assert_eq!(calls[1].payload.get("value"), Some(&json!(0.0)));
    }

    #[test]
    fn clones_share_the_sink() {
        let (tracker, sink) = recording_tracker();
        let clone = tracker.clone();
        tracker.track_add_to_cart("A", 1.0);
        clone.track_add_to_cart("B", 2.0);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn from_options_disabled_uses_noop() {
        let options = PixelOptions {
            pixel_id: Some("123".into()),
            access_token: Some("token".into()),
            enabled: false,
            ..Default::default()
        };
        let tracker = PixelTracker::from_options(&options).unwrap();
        assert_eq!(tracker.sink_name(), "noop");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn from_options_selects_conversions_api_with_credentials() {
        let options = PixelOptions {
            pixel_id: Some("123".into()),
            access_token: Some("token".into()),
            ..Default::default()
        };
        let tracker = PixelTracker::from_options(&options).unwrap();
        assert_eq!(tracker.sink_name(), "conversions-api");

        let tracker = PixelTracker::from_options(&PixelOptions::default()).unwrap();
        assert_eq!(tracker.sink_name(), "noop");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test(flavor = "current_thread")]
    async fn conversions_api_tracker_runs_inside_async_runtime() {
        let options = PixelOptions {
            pixel_id: Some("1".into()),
            access_token: Some("t".into()),
            ..Default::default()
        };
        let tracker = PixelTracker::from_options(&options).unwrap();
        assert_eq!(tracker.sink_name(), "conversions-api");

        tracker.track_add_to_cart("Pro", 1.0);
        tracker.track_view_content("Pricing Page", None);
        drop(tracker);
    }
}
