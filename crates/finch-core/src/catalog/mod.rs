//! Content catalogs
//!
//! Education items and partner offers are file-backed configuration,
//! compiled into the binary and loaded once at startup into id-indexed,
//! read-only maps. Request processing never mutates them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::personas::PersonaId;

pub mod selection;

pub use selection::{select_education, select_offers, SelectionBounds};

/// Embedded default catalogs (compiled into binary)
const EDUCATION_JSON: &str = include_str!("../../../../config/education.json");
const OFFERS_JSON: &str = include_str!("../../../../config/offers.json");

/// An educational content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub persona_fit: Vec<PersonaId>,
    pub recommendation_types: Vec<String>,
}

/// Eligibility requirements a partner attaches to an offer.
///
/// `None` on a field means that check is not required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferEligibility {
    pub min_annual_income: Option<f64>,
    pub min_credit_score: Option<u16>,
    pub max_utilization: Option<f64>,
    #[serde(default)]
    pub excluded_account_types: Vec<String>,
}

/// A partner offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerOffer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub partner_name: String,
    pub offer_category: String,
    pub persona_fit: Vec<PersonaId>,
    pub recommendation_types: Vec<String>,
    pub eligibility: Option<OfferEligibility>,
}

/// Both catalogs, loaded once and shared read-only
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    /// Catalog order is meaningful: it breaks score ties and drives backfill
    education: Vec<EducationItem>,
    offers: Vec<PartnerOffer>,
    education_by_id: HashMap<String, usize>,
    offers_by_id: HashMap<String, usize>,
}

impl ContentCatalog {
    /// Load the embedded catalogs
    pub fn builtin() -> Result<Self> {
        Self::from_json(EDUCATION_JSON, OFFERS_JSON)
    }

    /// Load catalogs from JSON strings (override files, tests)
    pub fn from_json(education_json: &str, offers_json: &str) -> Result<Self> {
        let education: Vec<EducationItem> = serde_json::from_str(education_json)
            .map_err(|e| Error::Catalog(format!("education catalog: {}", e)))?;
        let offers: Vec<PartnerOffer> = serde_json::from_str(offers_json)
            .map_err(|e| Error::Catalog(format!("offers catalog: {}", e)))?;

        let education_by_id = education
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect::<HashMap<_, _>>();
        if education_by_id.len() != education.len() {
            return Err(Error::Catalog("duplicate education item ids".to_string()));
        }

        let offers_by_id = offers
            .iter()
            .enumerate()
            .map(|(i, offer)| (offer.id.clone(), i))
            .collect::<HashMap<_, _>>();
        if offers_by_id.len() != offers.len() {
            return Err(Error::Catalog("duplicate offer ids".to_string()));
        }

        Ok(Self {
            education,
            offers,
            education_by_id,
            offers_by_id,
        })
    }

    pub fn education(&self) -> &[EducationItem] {
        &self.education
    }

    pub fn offers(&self) -> &[PartnerOffer] {
        &self.offers
    }

    pub fn education_by_id(&self, id: &str) -> Option<&EducationItem> {
        self.education_by_id.get(id).map(|i| &self.education[*i])
    }

    pub fn offer_by_id(&self, id: &str) -> Option<&PartnerOffer> {
        self.offers_by_id.get(id).map(|i| &self.offers[*i])
    }
}
