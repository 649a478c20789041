// 🏷️ Record Classifiers - which card template a record may render as

use crate::catalog::CardCatalog;
use crate::records::{FamilyCRecord, RawRecord};
use serde::{Deserialize, Serialize};

/// CardBrand - Visual card template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    /// Primary insurer card
    Primary,
    /// Secondary-network partner card
    SecondaryNetwork,
    /// Reciprocity partner card
    Reciprocity,
}

impl CardBrand {
    pub fn name(&self) -> &str {
        match self {
            CardBrand::Primary => "Primary",
            CardBrand::SecondaryNetwork => "Secondary Network",
            CardBrand::Reciprocity => "Reciprocity",
        }
    }
}

/// Tier code for a plan name using the built-in catalog
pub fn derive_network_code(plan_name: Option<&str>) -> String {
    CardCatalog::builtin().network_code(plan_name)
}

/// Reciprocity eligibility using the built-in catalog
pub fn is_eligible_for_reciprocity_brand(record: &FamilyCRecord) -> bool {
    is_eligible_for_reciprocity_brand_with(CardCatalog::builtin(), record)
}

/// Both gates must pass: provider is the partner AND the mapped plan is
/// allow-listed. Exact comparisons, no substring matching.
pub fn is_eligible_for_reciprocity_brand_with(catalog: &CardCatalog, record: &FamilyCRecord) -> bool {
    catalog.is_reciprocity_partner(record.provider_name.as_deref())
        && catalog.is_reciprocity_plan(record.mapped_plan.as_deref())
}

/// Brand a record renders as; None for a reciprocity record that fails the
/// eligibility gate
pub fn brand_for(catalog: &CardCatalog, record: &RawRecord) -> Option<CardBrand> {
    match record {
        RawRecord::Membership(_) => Some(CardBrand::Primary),
        RawRecord::SecondaryNetwork(_) => Some(CardBrand::SecondaryNetwork),
        RawRecord::Reciprocity(c) => {
            is_eligible_for_reciprocity_brand_with(catalog, c).then_some(CardBrand::Reciprocity)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
