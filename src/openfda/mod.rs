//! openFDA drug label access.
//!
//! Three layers, mirroring how requests flow:
//! - [`query`]: turns caller filters into openFDA search expressions,
//!   including NDC normalization.
//! - [`client`]: performs the HTTP fetch against the drug label endpoint,
//!   with bounded timeouts and retries.
//! - [`service`]: caching and request coalescing on top of the client; this
//!   is what route handlers talk to.
//!
//! [`records`] holds the wire types for openFDA responses and the view types
//! returned by the API.

pub mod client;
pub mod query;
pub mod records;
pub mod service;

pub use client::{FetchError, OpenFdaClient};
pub use query::{normalize_ndc, LabelQuery};
pub use records::{DrugInfoView, LabelRecord, LabelResponse, LabelSection, OpenFdaFields};
pub use service::OpenFdaService;
