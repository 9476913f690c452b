use std::fmt;

use serde_json::{Map, Value};

use crate::pixel::constants::{DEFAULT_CURRENCY, PAGE_CONTENT_TYPE, PRODUCT_CONTENT_TYPE};

/// Standard pixel events emitted by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    AddToCart,
    InitiateCheckout,
    ViewContent,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AddToCart => "AddToCart",
            EventKind::InitiateCheckout => "InitiateCheckout",
            EventKind::ViewContent => "ViewContent",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single analytics occurrence, built right before it is handed to a sink.
///
/// `currency` is set exactly when `value` is set. The constructors are the only way to build an
/// event, so that pairing always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingEvent {
    kind: EventKind,
    content_name: String,
    content_type: String,
    value: Option<f64>,
    currency: Option<String>,
}

impl TrackingEvent {
    pub fn add_to_cart(plan_name: impl Into<String>, price: f64) -> Self {
        Self::priced(EventKind::AddToCart, plan_name.into(), price)
    }

    pub fn initiate_checkout(plan_name: impl Into<String>, price: f64) -> Self {
        Self::priced(EventKind::InitiateCheckout, plan_name.into(), price)
    }

    /// Builds a `ViewContent` event. `content_type` falls back to `"page"`.
    pub fn view_content(content_name: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            kind: EventKind::ViewContent,
            content_name: content_name.into(),
            content_type: content_type.unwrap_or(PAGE_CONTENT_TYPE).to_string(),
            value: None,
            currency: None,
        }
    }

    fn priced(kind: EventKind, content_name: String, price: f64) -> Self {
        Self {
            kind,
            content_name,
            content_type: PRODUCT_CONTENT_TYPE.to_string(),
            value: Some(price),
            currency: Some(DEFAULT_CURRENCY.to_string()),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn content_name(&self) -> &str {
        &self.content_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Key/value payload forwarded to the sink. Absent fields are omitted rather than `null`.
    /// A non-finite price has no JSON number form and is sent as `null`.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "content_name".to_string(),
            Value::String(self.content_name.clone()),
        );
        payload.insert(
            "content_type".to_string(),
            Value::String(self.content_type.clone()),
        );
        if let Some(value) = self.value {
            payload.insert("value".to_string(), Value::from(value));
        }
        if let Some(currency) = &self.currency {
            payload.insert("currency".to_string(), Value::String(currency.clone()));
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_to_cart_payload_has_price_and_currency() {
        let event = TrackingEvent::add_to_cart("Pro Plan", 29.99);
        assert_eq!(event.name(), "AddToCart");
        assert_eq!(
            Value::Object(event.payload()),
            json!({
                "content_name": "Pro Plan",
                "content_type": "product",
                "value": 29.99,
                "currency": "USD"
            })
        );
    }

    #[test]
    fn initiate_checkout_uses_product_content_type() {
        let event = TrackingEvent::initiate_checkout("Team", 99.0);
        assert_eq!(event.kind(), EventKind::InitiateCheckout);
        assert_eq!(event.content_type(), "product");
        assert_eq!(event.currency(), Some("USD"));
    }

    #[test]
    fn view_content_defaults_to_page_without_value() {
        let event = TrackingEvent::view_content("Pricing Page", None);
        let payload = event.payload();
        assert_eq!(payload.get("content_type"), Some(&json!("page")));
        assert!(!payload.contains_key("value"));
        assert!(!payload.contains_key("currency"));
    }

    #[test]
    fn view_content_keeps_explicit_content_type() {
        let event = TrackingEvent::view_content("Docs", Some("article"));
        assert_eq!(event.content_type(), "article");
    }

    #[test]
    fn currency_present_only_with_value() {
        let events = [
            TrackingEvent::add_to_cart("a", 1.0),
            TrackingEvent::initiate_checkout("b", -5.0),
            TrackingEvent::view_content("c", Some("")),
        ];
        for event in events {
            assert_eq!(event.value().is_some(), event.currency().is_some());
        }
    }

    #[test]
    fn malformed_inputs_are_kept_verbatim() {
        let event = TrackingEvent::add_to_cart("", -1.5);
        assert_eq!(event.content_name(), "");
        assert_eq!(event.value(), Some(-1.5));
    }

    #[test]
    fn non_finite_price_is_sent_as_null() {
        let event = TrackingEvent::add_to_cart("X", f64::NAN);
        let payload = event.payload();
        assert_eq!(payload.get("value"), Some(&Value::Null));
        assert_eq!(payload.get("currency"), Some(&json!("USD")));
        assert!(event.value().is_some_and(f64::is_nan));
    }
}
