//! Wire and view types for openFDA drug label data.
//!
//! `LabelRecord` mirrors the subset of an openFDA label document this service
//! reads. All fields default to empty because the dataset is sparse: most
//! labels carry only some sections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level openFDA response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelResponse {
    #[serde(default)]
    pub results: Vec<LabelRecord>,
}

/// One drug label document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelRecord {
    #[serde(default)]
    pub openfda: OpenFdaFields,
    #[serde(default)]
    pub indications_and_usage: Vec<String>,
    #[serde(default)]
    pub dosage_and_administration: Vec<String>,
    #[serde(default)]
    pub use_in_specific_populations: Vec<String>,
    #[serde(default)]
    pub how_supplied_storage_and_handling: Vec<String>,
    #[serde(default)]
    pub warnings_and_precautions: Vec<String>,
    #[serde(default)]
    pub clinical_pharmacology: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    /// Label effective time, formatted YYYYMMDD by openFDA
    #[serde(default)]
    pub effective_time: Option<String>,
}

impl LabelRecord {
    /// Parse the label's effective time into a date, if present and well-formed.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.effective_time
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y%m%d").ok())
    }
}

/// The harmonized `openfda` sub-document of a label.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaFields {
    #[serde(default)]
    pub brand_name: Vec<String>,
    #[serde(default)]
    pub generic_name: Vec<String>,
    #[serde(default)]
    pub substance_name: Vec<String>,
    #[serde(default)]
    pub manufacturer_name: Vec<String>,
    #[serde(default)]
    pub product_ndc: Vec<String>,
}

/// Per-product view returned by `/drug/indications`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugInfoView {
    pub brand_names: Vec<String>,
    pub generic_names: Vec<String>,
    pub manufacturer: Vec<String>,
    pub indications: Vec<String>,
    pub ndc_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
}

impl From<&LabelRecord> for DrugInfoView {
    fn from(record: &LabelRecord) -> Self {
        Self {
            brand_names: record.openfda.brand_name.clone(),
            generic_names: record.openfda.generic_name.clone(),
            manufacturer: record.openfda.manufacturer_name.clone(),
            indications: record.indications_and_usage.clone(),
            ndc_codes: record.openfda.product_ndc.clone(),
            effective_date: record.effective_date(),
        }
    }
}

/// Label sections served by the single-section endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSection {
    Dosage,
    SpecificPopulations,
    StorageHandling,
    WarningsPrecautions,
    ClinicalPharmacology,
    Description,
}

impl LabelSection {
    /// The openFDA document field this section reads.
    pub fn field_name(&self) -> &'static str {
        match self {
            LabelSection::Dosage => "dosage_and_administration",
            LabelSection::SpecificPopulations => "use_in_specific_populations",
            LabelSection::StorageHandling => "how_supplied_storage_and_handling",
            LabelSection::WarningsPrecautions => "warnings_and_precautions",
            LabelSection::ClinicalPharmacology => "clinical_pharmacology",
            LabelSection::Description => "description",
        }
    }

    /// Extract this section's text blocks from a label record.
    pub fn extract<'a>(&self, record: &'a LabelRecord) -> &'a [String] {
        match self {
            LabelSection::Dosage => &record.dosage_and_administration,
            LabelSection::SpecificPopulations => &record.use_in_specific_populations,
            LabelSection::StorageHandling => &record.how_supplied_storage_and_handling,
            LabelSection::WarningsPrecautions => &record.warnings_and_precautions,
            LabelSection::ClinicalPharmacology => &record.clinical_pharmacology,
            LabelSection::Description => &record.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LabelRecord {
        serde_json::from_value(serde_json::json!({
            "openfda": {
                "brand_name": ["ADVIL"],
                "generic_name": ["IBUPROFEN"],
                "manufacturer_name": ["Pfizer"],
                "substance_name": ["IBUPROFEN"],
                "product_ndc": ["0573-0164"],
                "route": ["ORAL"]
            },
            "indications_and_usage": ["For temporary relief of minor aches."],
            "dosage_and_administration": ["Take 1 tablet every 4 to 6 hours."],
            "effective_time": "20230115",
            "spl_id": ["ignored-unknown-field"]
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_sparse_label() {
        let record = sample_record();
        assert_eq!(record.openfda.brand_name, vec!["ADVIL"]);
        assert_eq!(record.openfda.product_ndc, vec!["0573-0164"]);
        assert!(record.warnings_and_precautions.is_empty());
    }

    #[test]
    fn effective_date_parses_yyyymmdd() {
        let record = sample_record();
        assert_eq!(
            record.effective_date(),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
    }

    #[test]
    fn effective_date_tolerates_junk() {
        let record = LabelRecord {
            effective_time: Some("january".to_string()),
            ..LabelRecord::default()
        };
        assert_eq!(record.effective_date(), None);
    }

    #[test]
    fn drug_info_view_uses_camel_case() {
        let view = DrugInfoView::from(&sample_record());
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["brandNames"][0], "ADVIL");
        assert_eq!(value["genericNames"][0], "IBUPROFEN");
        assert_eq!(value["manufacturer"][0], "Pfizer");
        assert_eq!(value["ndcCodes"][0], "0573-0164");
        assert_eq!(value["effectiveDate"], "2023-01-15");
    }

    #[test]
    fn section_extraction_reads_the_right_field() {
        let record = sample_record();
        assert_eq!(
            LabelSection::Dosage.extract(&record),
            ["Take 1 tablet every 4 to 6 hours."]
        );
        assert!(LabelSection::Description.extract(&record).is_empty());
        assert_eq!(
            LabelSection::StorageHandling.field_name(),
            "how_supplied_storage_and_handling"
        );
    }
}
