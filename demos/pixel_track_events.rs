//! Tracks the three pricing-page events against an in-memory sink and prints what a real pixel
//! would have received. Swap `RecordingSink` for `FbqSink` in a WASM build to talk to `fbq`.

use pixel_tracker::pixel::{PixelTracker, RecordingSink};

fn main() {
    let sink = RecordingSink::new();
    let tracker = PixelTracker::new(sink.clone());

    tracker.track_view_content("Pricing Page", None);
    tracker.track_add_to_cart("Pro Plan", 29.99);
    tracker.track_initiate_checkout("Pro Plan", 29.99);

    for call in sink.calls() {
        println!(
            "fbq(\"track\", \"{}\", {})",
            call.event_name,
            serde_json::Value::Object(call.payload)
        );
    }
}
