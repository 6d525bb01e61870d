//! Persona-driven catalog selection
//!
//! Items are scored against the assigned persona: +10 for a direct
//! persona fit, +5 per overlapping recommendation type. Positive scorers
//! are kept in descending score order (catalog order breaks ties) up to
//! the maximum; the persona-fit subset backfills up to the minimum.
//! Partner offers must pass eligibility before they count toward bounds.

use tracing::debug;

use crate::personas::{PersonaDefinition, PersonaId};

use super::{EducationItem, PartnerOffer};

/// Requested result-size bounds
#[derive(Debug, Clone, Copy)]
pub struct SelectionBounds {
    pub min_items: usize,
    pub max_items: usize,
}

impl SelectionBounds {
    pub fn education_default() -> Self {
        Self {
            min_items: 3,
            max_items: 5,
        }
    }

    pub fn offers_default() -> Self {
        Self {
            min_items: 0,
            max_items: 3,
        }
    }
}

/// Score one item against a persona
fn score(
    persona: &PersonaDefinition,
    persona_fit: &[PersonaId],
    recommendation_types: &[String],
) -> i32 {
    let mut score = 0;
    if persona_fit.contains(&persona.id) {
        score += 10;
    }
    let overlap = recommendation_types
        .iter()
        .filter(|t| persona.recommendation_types.contains(&t.as_str()))
        .count();
    score += 5 * overlap as i32;
    score
}

/// Shared scored-selection core: rank positive scorers, truncate to max,
/// backfill from the persona-fit subset (catalog order) up to min.
fn select_ranked<'a, T, FitF, TypesF>(
    items: &'a [T],
    persona: &PersonaDefinition,
    bounds: SelectionBounds,
    fit: FitF,
    types: TypesF,
    mut admit: impl FnMut(&'a T) -> bool,
) -> Vec<&'a T>
where
    FitF: Fn(&T) -> &[PersonaId],
    TypesF: Fn(&T) -> &[String],
{
    // (catalog index, score) for every positive scorer
    let mut scored: Vec<(usize, i32)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (i, score(persona, fit(item), types(item))))
        .filter(|(_, s)| *s > 0)
        .collect();

    // Descending score; catalog order breaks ties (sort is stable)
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut selected: Vec<usize> = Vec::new();
    for (index, _) in &scored {
        if selected.len() >= bounds.max_items {
            break;
        }
        if admit(&items[*index]) {
            selected.push(*index);
        }
    }

    // Backfill from the persona-fit subset in catalog order
    if selected.len() < bounds.min_items {
        for (index, item) in items.iter().enumerate() {
            if selected.len() >= bounds.min_items {
                break;
            }
            if selected.contains(&index) || !fit(item).contains(&persona.id) {
                continue;
            }
            if admit(item) {
                selected.push(index);
            }
        }
    }

    selected.into_iter().map(|i| &items[i]).collect()
}

/// Select education items for a persona
pub fn select_education<'a>(
    items: &'a [EducationItem],
    persona: &PersonaDefinition,
    bounds: SelectionBounds,
) -> Vec<&'a EducationItem> {
    let selected = select_ranked(
        items,
        persona,
        bounds,
        |item| item.persona_fit.as_slice(),
        |item| item.recommendation_types.as_slice(),
        |_| true,
    );
    debug!(
        persona = %persona.id,
        count = selected.len(),
        "Education selection complete"
    );
    selected
}

/// Select partner offers for a persona.
///
/// `is_eligible` gates every candidate before it counts toward the bounds;
/// ineligible high scorers are skipped rather than padding the result.
pub fn select_offers<'a>(
    offers: &'a [PartnerOffer],
    persona: &PersonaDefinition,
    bounds: SelectionBounds,
    mut is_eligible: impl FnMut(&PartnerOffer) -> bool,
) -> Vec<&'a PartnerOffer> {
    let selected = select_ranked(
        offers,
        persona,
        bounds,
        |offer| offer.persona_fit.as_slice(),
        |offer| offer.recommendation_types.as_slice(),
        |offer| is_eligible(offer),
    );
    debug!(
        persona = %persona.id,
        count = selected.len(),
        "Offer selection complete"
    );
    selected
}
