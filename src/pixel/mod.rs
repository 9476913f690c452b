mod api;
mod config;
pub mod constants;
pub mod error;
mod event;
mod fbq;
mod sink;
#[cfg(not(target_arch = "wasm32"))]
mod transport;

pub use api::PixelTracker;
pub use config::PixelOptions;
pub use event::{EventKind, TrackingEvent};
pub use fbq::FbqSink;
pub use sink::{callback_sink, CallbackSink, NoopSink, RecordedCall, RecordingSink, TrackingSink};
#[cfg(not(target_arch = "wasm32"))]
pub use transport::{
    ConversionsApiConfig, ConversionsApiEndpoint, ConversionsApiSink, ConversionsUserData,
};
