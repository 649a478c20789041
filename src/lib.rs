// Member Cards - Core Library
// Legacy membership records → display-ready card models, for CLI, API server and tests

pub mod error;
pub mod format;     // Formatters: national ID, dates, card numbers, currency
pub mod records;    // Raw legacy families + member enrichment
pub mod catalog;    // Tier table, reciprocity partner + allow-list
pub mod classify;   // Record classifiers / brand eligibility
pub mod resolve;    // Per-brand field resolvers → CardDisplayModel
pub mod aggregate;  // Carousel ordering across the three families

// Re-export commonly used types
pub use error::{CardError, Result};
pub use format::{
    format_card_number, format_currency, format_date, format_national_id,
    CurrencyInput, PLACEHOLDER,
};
pub use records::{
    CardFamilies, CardFamily, FamilyARecord, FamilyBRecord, FamilyCRecord,
    LegacyFlag, LegacyRecord, LegacyValue, MemberEnrichment, RawRecord,
    decode_records,
};
pub use catalog::{CardCatalog, NetworkTier, CATALOG_ENV, UNKNOWN_NETWORK_CODE};
pub use classify::{
    CardBrand, brand_for, derive_network_code,
    is_eligible_for_reciprocity_brand, is_eligible_for_reciprocity_brand_with,
};
pub use resolve::{
    CardDisplayModel, resolve_record,
    extract_primary_card_data, extract_primary_card_data_with,
    extract_secondary_network_card_data, extract_secondary_network_card_data_with,
    extract_reciprocity_card_data, extract_reciprocity_card_data_with,
};
pub use aggregate::{
    TaggedRecord, combine_card_families, combine_card_families_with,
    render_cards, render_cards_with, resolve_tagged,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
