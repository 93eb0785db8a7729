//! Apothecary: a web API for openFDA drug label data.
//!
//! Apothecary fronts the openFDA `drug/label` dataset with a small JSON API.
//! Incoming queries are translated into openFDA search expressions, fetched
//! with retries, cached, and served back as per-product views or raw label
//! sections. The crate is split into the upstream client and service layer
//! (`openfda`), the HTTP surface (`routes`, `http`, `middleware`), and the
//! supporting configuration, error, and state modules.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod openfda;
pub mod routes;
pub mod state;
