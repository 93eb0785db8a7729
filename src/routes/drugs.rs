//! Handlers for the drug label query endpoints.
//!
//! All endpoints share the same filter parameters; they differ only in which
//! label section they return. `/drug/indications` is the exception, returning
//! a structured per-product view instead of raw section text.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::config::{DEFAULT_RESULT_LIMIT, MAX_RESULT_LIMIT};
use crate::error::AppError;
use crate::openfda::{DrugInfoView, LabelQuery, LabelSection};
use crate::state::AppState;

/// Query parameters shared by all drug label endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DrugParams {
    pub drug: Option<String>,
    pub manufacturer: Option<String>,
    pub dosage_form: Option<String>,
    pub route: Option<String>,
    pub ndc: Option<String>,
    pub limit: Option<usize>,
    pub exact: Option<bool>,
}

impl DrugParams {
    /// Validate the parameters into a `LabelQuery`.
    ///
    /// Empty or whitespace-only filter values count as absent. Terms may not
    /// contain double quotes, which would escape the quoted openFDA search
    /// expression.
    fn into_query(self) -> Result<LabelQuery, AppError> {
        Ok(LabelQuery {
            drug: clean_term("drug", self.drug)?,
            manufacturer: clean_term("manufacturer", self.manufacturer)?,
            dosage_form: clean_term("dosage_form", self.dosage_form)?,
            route: clean_term("route", self.route)?,
            ndc: clean_term("ndc", self.ndc)?,
            limit: self
                .limit
                .unwrap_or(DEFAULT_RESULT_LIMIT)
                .clamp(1, MAX_RESULT_LIMIT),
            exact: self.exact.unwrap_or(false),
        })
    }
}

fn clean_term(name: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.contains('"') {
        return Err(AppError::InvalidQuery(format!(
            "{} may not contain double quotes",
            name
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Structured per-product view: names, manufacturer, indications, NDC codes.
#[instrument(name = "drugs::indications", skip(state, params))]
pub async fn indications(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<DrugInfoView>>, AppError> {
    let query = params.into_query()?;
    let info = state.openfda.drug_info(&query).await?;
    Ok(Json(info))
}

async fn section_response(
    state: AppState,
    params: DrugParams,
    section: LabelSection,
) -> Result<Json<Vec<String>>, AppError> {
    let query = params.into_query()?;
    let blocks = state.openfda.section(&query, section).await?;
    Ok(Json(blocks))
}

#[instrument(name = "drugs::dosage", skip(state, params))]
pub async fn dosage(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::Dosage).await
}

#[instrument(name = "drugs::populations", skip(state, params))]
pub async fn populations(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::SpecificPopulations).await
}

#[instrument(name = "drugs::storage", skip(state, params))]
pub async fn storage(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::StorageHandling).await
}

#[instrument(name = "drugs::warnings", skip(state, params))]
pub async fn warnings(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::WarningsPrecautions).await
}

#[instrument(name = "drugs::pharmacology", skip(state, params))]
pub async fn pharmacology(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::ClinicalPharmacology).await
}

#[instrument(name = "drugs::description", skip(state, params))]
pub async fn description(
    State(state): State<AppState>,
    Query(params): Query<DrugParams>,
) -> Result<Json<Vec<String>>, AppError> {
    section_response(state, params, LabelSection::Description).await
}
