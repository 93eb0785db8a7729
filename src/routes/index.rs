//! Service descriptor for humans poking the API root.

use axum::Json;
use serde_json::{json, Value};

/// Root handler listing the service's endpoints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/drug/indications",
            "/drug/dosage",
            "/drug/populations",
            "/drug/storage",
            "/drug/warnings",
            "/drug/pharmacology",
            "/drug/description",
        ],
    }))
}
