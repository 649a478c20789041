// 📚 Card Catalog - fixed business tables (rules as data)
//
// Network tiers, the reciprocity partner literal and its plan allow-list.
// Built-in values ship with the crate; a JSON file can override any of them
// (missing keys keep the built-in value).

use crate::error::{CardError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Environment variable naming a catalog override file
pub const CATALOG_ENV: &str = "MEMBER_CARDS_CATALOG";

/// Returned by the tier lookup when no entry matches
pub const UNKNOWN_NETWORK_CODE: &str = "N/A";

/// Built-in tier table: (plan-name fragment, tier code), in match order
pub const DEFAULT_NETWORK_TIERS: [(&str, &str); 4] = [
    ("BASICO", "R1"),
    ("ESPECIAL", "R2"),
    ("MASTER", "R3"),
    ("EXECUTIVO", "R4"),
];

/// Provider name identifying the reciprocity partner brand
pub const DEFAULT_RECIPROCITY_PARTNER: &str = "PLANSERV";

/// Mapped-plan names eligible for the reciprocity partner card
pub const DEFAULT_RECIPROCITY_PLANS: [&str; 3] = [
    "BASICO ENFERMARIA",
    "ESPECIAL APARTAMENTO",
    "MASTER APARTAMENTO",
];

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTier {
    /// Plan-name fragment (substring, case-insensitive)
    pub pattern: String,

    /// Tier code shown on the card
    pub code: String,
}

impl NetworkTier {
    pub fn new(pattern: impl Into<String>, code: impl Into<String>) -> Self {
        NetworkTier {
            pattern: pattern.into(),
            code: code.into(),
        }
    }

    /// `plan_upper` must already be upper-cased
    fn matches(&self, plan_upper: &str) -> bool {
        plan_upper.contains(&self.pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardCatalog {
    /// Tier table; order is the tie-break
    pub network_tiers: Vec<NetworkTier>,

    /// Exact provider-name literal for the reciprocity brand
    pub reciprocity_partner: String,

    /// Exact mapped-plan names eligible for the reciprocity brand
    pub reciprocity_plans: Vec<String>,
}

impl Default for CardCatalog {
    fn default() -> Self {
        CardCatalog {
            network_tiers: DEFAULT_NETWORK_TIERS
                .iter()
                .map(|(pattern, code)| NetworkTier::new(*pattern, *code))
                .collect(),
            reciprocity_partner: DEFAULT_RECIPROCITY_PARTNER.to_string(),
            reciprocity_plans: DEFAULT_RECIPROCITY_PLANS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl CardCatalog {
    /// Shared built-in catalog
    pub fn builtin() -> &'static CardCatalog {
        static BUILTIN: OnceLock<CardCatalog> = OnceLock::new();
        BUILTIN.get_or_init(CardCatalog::default)
    }

    /// Load a catalog override from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&content)?;

        log::info!(
            "Loaded card catalog from {:?} ({} network tiers, {} reciprocity plans)",
            path.as_ref(),
            catalog.network_tiers.len(),
            catalog.reciprocity_plans.len()
        );

        Ok(catalog)
    }

    /// Catalog named by `MEMBER_CARDS_CATALOG`, or the built-in one when unset
    pub fn from_env() -> Result<Self> {
        Self::from_optional_path(std::env::var(CATALOG_ENV).ok().as_deref())
    }

    fn from_optional_path(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin().clone()),
        }
    }

    /// Parse and validate a catalog JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: CardCatalog = serde_json::from_str(json)
            .map_err(|e| CardError::Catalog(format!("failed to parse catalog JSON: {}", e)))?;

        catalog.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        if self.reciprocity_partner.trim().is_empty() {
            return Err(CardError::Catalog(
                "reciprocity_partner must not be empty".to_string(),
            ));
        }

        for tier in &mut self.network_tiers {
            if tier.pattern.trim().is_empty() || tier.code.trim().is_empty() {
                return Err(CardError::Catalog(format!(
                    "network tier {:?} needs both a pattern and a code",
                    tier
                )));
            }
            tier.pattern = tier.pattern.to_uppercase();
        }

        Ok(self)
    }

    /// Tier code for a plan name; first matching tier in table order wins
    pub fn network_code(&self, plan_name: Option<&str>) -> String {
        let Some(plan) = plan_name.map(str::trim).filter(|p| !p.is_empty()) else {
            return UNKNOWN_NETWORK_CODE.to_string();
        };

        let plan_upper = plan.to_uppercase();

        self.network_tiers
            .iter()
            .find(|tier| tier.matches(&plan_upper))
            .map(|tier| tier.code.clone())
            .unwrap_or_else(|| UNKNOWN_NETWORK_CODE.to_string())
    }

    /// Exact match against the partner literal
    pub fn is_reciprocity_partner(&self, provider_name: Option<&str>) -> bool {
        provider_name == Some(self.reciprocity_partner.as_str())
    }

    /// Exact match against the allow-list
    pub fn is_reciprocity_plan(&self, mapped_plan: Option<&str>) -> bool {
        match mapped_plan {
            Some(plan) => self.reciprocity_plans.iter().any(|p| p == plan),
            None => false,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_tiers() {
        let catalog = CardCatalog::builtin();
        assert_eq!(catalog.network_tiers.len(), 4);
        assert_eq!(catalog.network_code(Some("BASICO")), "R1");
        assert_eq!(catalog.network_code(Some("Plano Master Nacional")), "R3");
        assert_eq!(catalog.network_code(Some("OURO")), "N/A");
        assert_eq!(catalog.network_code(None), "N/A");
        assert_eq!(catalog.network_code(Some("  ")), "N/A");
    }

    #[test]
    fn test_table_order_breaks_ties() {
        let catalog = CardCatalog {
            network_tiers: vec![NetworkTier::new("MASTER", "FIRST"), NetworkTier::new("BASICO", "SECOND")],
            ..CardCatalog::default()
        };

        assert_eq!(catalog.network_code(Some("BASICO MASTER")), "FIRST");
    }

    #[test]
    fn test_from_json_partial_override() {
        let catalog = CardCatalog::from_json(
            r#"{"reciprocity_partner": "OUTRA", "network_tiers": [{"pattern": "ouro", "code": "G"}]}"#,
        )
        .unwrap();

        assert_eq!(catalog.reciprocity_partner, "OUTRA");
        assert_eq!(catalog.network_tiers[0].pattern, "OURO");
        assert_eq!(catalog.network_code(Some("plano ouro")), "G");
        // Allow-list not given: built-in kept
        assert_eq!(catalog.reciprocity_plans.len(), DEFAULT_RECIPROCITY_PLANS.len());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            CardCatalog::from_json(r#"{"reciprocity_partner": " "}"#),
            Err(CardError::Catalog(_))
        ));
        assert!(matches!(
            CardCatalog::from_json(r#"{"network_tiers": [{"pattern": "", "code": "X"}]}"#),
            Err(CardError::Catalog(_))
        ));
        assert!(matches!(CardCatalog::from_json("[1, 2]"), Err(CardError::Catalog(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reciprocity_plans": ["PLANO X"]}}"#).unwrap();

        let catalog = CardCatalog::from_file(file.path()).unwrap();
        assert!(catalog.is_reciprocity_plan(Some("PLANO X")));
        assert!(!catalog.is_reciprocity_plan(Some("ESPECIAL APARTAMENTO")));
    }

    #[test]
    fn test_from_optional_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reciprocity_partner": "OUTRA"}}"#).unwrap();

        let loaded = CardCatalog::from_optional_path(file.path().to_str()).unwrap();
        assert_eq!(loaded.reciprocity_partner, "OUTRA");

        let fallback = CardCatalog::from_optional_path(None).unwrap();
        assert_eq!(&fallback, CardCatalog::builtin());

        assert!(matches!(
            CardCatalog::from_optional_path(Some("/definitely/not/here.json")),
            Err(CardError::Io(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            CardCatalog::from_file("/definitely/not/here.json"),
            Err(CardError::Io(_))
        ));
    }

    #[test]
    fn test_exact_matches() {
        let catalog = CardCatalog::builtin();
        assert!(catalog.is_reciprocity_partner(Some("PLANSERV")));
        assert!(!catalog.is_reciprocity_partner(Some("planserv")));
        assert!(!catalog.is_reciprocity_partner(Some("PLANSERV SAUDE")));
        assert!(!catalog.is_reciprocity_partner(None));
        assert!(catalog.is_reciprocity_plan(Some("ESPECIAL APARTAMENTO")));
        assert!(!catalog.is_reciprocity_plan(Some("PLANSERV")));
        assert!(!catalog.is_reciprocity_plan(None));
    }
}
