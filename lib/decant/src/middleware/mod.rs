//! Tower middleware for [`HyperClient`](crate::HyperClient).
//!
//! Layers wrap a service from `http::Request<Bytes>` to
//! [`StreamingResponse`](decant_core::StreamingResponse), so they see the
//! response head before any spec reads the body. Any Tower layer whose
//! service is `Clone + Send + Sync` fits, for example
//! [`MapRequestLayer`](tower::util::MapRequestLayer).
//!
//! ```ignore
//! use decant::HyperClient;
//! use decant::middleware::LoggingLayer;
//! use decant::tower::util::MapRequestLayer;
//!
//! let client = HyperClient::new()
//!     .layer(MapRequestLayer::new(add_auth_header))
//!     .layer(LoggingLayer::new());
//! ```

mod logging;

pub use logging::{Logging, LoggingLayer};

pub use tower::Layer;
