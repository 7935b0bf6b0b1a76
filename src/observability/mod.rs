//! Observability for the document codec
//!
//! - Structured JSON-lines logging ([`Logger`])
//! - Begin/complete operation scopes ([`ObservationScope`])
//! - Counters ([`CodecMetrics`])
//!
//! Observability never changes codec behaviour and never fails an
//! operation: log writes that cannot reach stderr are dropped.
//!
//! ```ignore
//! use docgraph::observability::{Logger, ObservationScope};
//!
//! Logger::info("STORE_OPENED", &[("data_dir", "/var/lib/docgraph")]);
//!
//! let scope = ObservationScope::new("DOCUMENT_SAVE", &[("key", "plan_abc")]);
//! // ... encode ...
//! scope.complete_with(&[("nodes", "4")]);
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{CodecMetrics, MetricsSnapshot};
pub use scope::ObservationScope;
