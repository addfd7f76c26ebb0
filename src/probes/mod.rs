//! Concrete [`DependencyProbe`](crate::health::DependencyProbe) implementations.
//!
//! - [`FnProbe`]: any async closure
//! - [`HttpProbe`]: `GET` reachability of an HTTP endpoint, used for the datastore

mod fn_probe;
mod http;

pub use fn_probe::FnProbe;
pub use http::{HttpProbe, DATASTORE_PROBE_NAME};
