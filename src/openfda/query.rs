//! openFDA search expression building.
//!
//! openFDA exposes a Lucene-like query syntax. A caller's filters become one
//! expression string: quoted terms per field, OR across the drug-name fields,
//! AND between independent filters. NDC filters dominate when present since
//! an NDC identifies a product more precisely than any name search.

use std::collections::HashSet;

use crate::config::{DEFAULT_RESULT_LIMIT, MATCH_ALL_EXPRESSION, MAX_NDC_FORMS};

/// Label fields searched when filtering by drug name
const DRUG_NAME_FIELDS: [&str; 3] = [
    "openfda.brand_name",
    "openfda.generic_name",
    "openfda.substance_name",
];

/// A validated drug label query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelQuery {
    pub drug: Option<String>,
    pub manufacturer: Option<String>,
    pub dosage_form: Option<String>,
    pub route: Option<String>,
    pub ndc: Option<String>,
    /// Result limit, already clamped by the caller
    pub limit: usize,
    /// Use exact-match variants of the drug name fields
    pub exact: bool,
}

impl Default for LabelQuery {
    fn default() -> Self {
        Self {
            drug: None,
            manufacturer: None,
            dosage_form: None,
            route: None,
            ndc: None,
            limit: DEFAULT_RESULT_LIMIT,
            exact: false,
        }
    }
}

impl LabelQuery {
    /// Build the openFDA search expression for this query.
    pub fn search_expression(&self) -> String {
        let ndc_clause = self.ndc_clause();
        let drug_clause = self.drug_clause();
        let filters = self.field_filters();

        if let Some(ndc) = ndc_clause {
            // An NDC alone is the whole expression; anything else narrows it
            if drug_clause.is_none() && filters.is_empty() {
                return ndc;
            }
            let mut parts = vec![ndc];
            parts.extend(drug_clause);
            parts.extend(filters);
            return parts.join(" AND ");
        }

        let mut parts: Vec<String> = drug_clause.into_iter().collect();
        parts.extend(filters);
        if parts.is_empty() {
            MATCH_ALL_EXPRESSION.to_string()
        } else {
            parts.join(" AND ")
        }
    }

    /// Cache key for this query: the expression plus the limit, since a
    /// larger limit is a different upstream result set.
    pub fn cache_key(&self) -> String {
        format!("{}#{}", self.search_expression(), self.limit)
    }

    fn ndc_clause(&self) -> Option<String> {
        let forms = normalize_ndc(self.ndc.as_deref()?);
        if forms.is_empty() {
            return None;
        }
        let joined = forms
            .iter()
            .map(|form| format!("openfda.product_ndc:\"{}\"", form))
            .collect::<Vec<_>>()
            .join(" OR ");
        Some(format!("({})", joined))
    }

    fn drug_clause(&self) -> Option<String> {
        let drug = self.drug.as_deref()?;
        let joined = DRUG_NAME_FIELDS
            .iter()
            .map(|field| {
                if self.exact {
                    format!("{}.exact:\"{}\"", field, drug)
                } else {
                    format!("{}:\"{}\"", field, drug)
                }
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        Some(format!("({})", joined))
    }

    fn field_filters(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(manufacturer) = &self.manufacturer {
            filters.push(format!("openfda.manufacturer_name:\"{}\"", manufacturer));
        }
        if let Some(dosage_form) = &self.dosage_form {
            filters.push(format!("openfda.dosage_form:\"{}\"", dosage_form));
        }
        if let Some(route) = &self.route {
            filters.push(format!("openfda.route:\"{}\"", route));
        }
        filters
    }
}

/// Normalize an NDC code into the candidate forms worth searching.
///
/// openFDA stores NDCs hyphenated (labeler-product-package), but callers
/// paste them in every shape. The original input is always tried first;
/// a hyphenated input also offers its digits-only form, and a bare 10- or
/// 11-digit input also offers the 5-4-rest hyphenation. Duplicates are
/// removed preserving order, capped at `MAX_NDC_FORMS`.
pub fn normalize_ndc(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut forms = vec![trimmed.to_string()];
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if trimmed.contains('-') {
        if digits.len() >= 9 {
            forms.push(digits);
        }
    } else if digits.len() == 10 || digits.len() == 11 {
        forms.push(format!("{}-{}-{}", &digits[..5], &digits[5..9], &digits[9..]));
    }

    let mut seen = HashSet::new();
    forms.retain(|form| seen.insert(form.clone()));
    forms.truncate(MAX_NDC_FORMS);
    forms
}
