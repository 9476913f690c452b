//! Sends a server-side `ViewContent` event through the Meta Conversions API.
//! Replace the placeholders with a real pixel id and access token, and keep the test event code
//! while experimenting so the event lands in the Events Manager "Test Events" tab.

use pixel_tracker::pixel::{
    ConversionsApiConfig, ConversionsApiSink, ConversionsUserData, PixelTracker,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConversionsApiConfig::new("your-pixel-id", "your-access-token")
        .with_test_event_code("TEST12345")
        .with_event_source_url("https://example.com/pricing")
        .with_user_data(ConversionsUserData {
            client_user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".into()),
            ..Default::default()
        });
    let sink = ConversionsApiSink::new(config)?;
    let tracker = PixelTracker::new(sink.clone());

    // Delivery failures are dropped by the sink; run with a logger at debug level to see them.
    tracker.track_view_content("Pricing Page", None);
    sink.flush()?;

    Ok(())
}
