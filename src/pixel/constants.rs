/// Action passed as the first argument to the pixel function.
pub const TRACK_ACTION: &str = "track";

/// Name of the global function injected by the Meta Pixel loader script.
pub const FBQ_GLOBAL: &str = "fbq";

pub const DEFAULT_CURRENCY: &str = "USD";

pub const PRODUCT_CONTENT_TYPE: &str = "product";
pub const PAGE_CONTENT_TYPE: &str = "page";

pub(crate) const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";
pub(crate) const DEFAULT_GRAPH_API_VERSION: &str = "v18.0";
pub(crate) const DEFAULT_ACTION_SOURCE: &str = "website";
