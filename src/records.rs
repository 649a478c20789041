// 🗂️ Raw Legacy Records - three families, one tagged union
//
// Field names below are the legacy wire keys, kept verbatim through serde
// renames. Family membership comes from the collection a record was fetched
// from; nothing in here inspects fields to guess a family.

use crate::error::{CardError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// FAMILY TAG
// ============================================================================

/// CardFamily - Which upstream collection a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardFamily {
    /// Family A: primary membership records
    Membership,
    /// Family B: secondary-network membership records
    SecondaryNetwork,
    /// Family C: reciprocity / cross-provider records
    Reciprocity,
}

impl CardFamily {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            CardFamily::Membership => "membership",
            CardFamily::SecondaryNetwork => "secondary network",
            CardFamily::Reciprocity => "reciprocity",
        }
    }
}

impl fmt::Display for CardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// LOOSE SCALARS
// ============================================================================

/// LegacyValue - Identifier-like field that upstream sends as text or number
///
/// Registration numbers and CPFs show up as `"00123"` in some payloads and as
/// `123` in others. Both are accepted; numbers lose their leading zeros, which
/// the formatters put back where the format is fixed-width. Any other JSON
/// type lands in `Other` and reads as blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl LegacyValue {
    /// Textual form of the value, trimmed
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            LegacyValue::Text(s) => Cow::Borrowed(s.trim()),
            LegacyValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Cow::Owned(u.to_string())
                } else if let Some(i) = n.as_i64() {
                    Cow::Owned(i.to_string())
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() && f.fract() == 0.0 => {
                            Cow::Owned(format!("{:.0}", f))
                        }
                        _ => Cow::Owned(n.to_string()),
                    }
                }
            }
            LegacyValue::Other(_) => Cow::Borrowed(""),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_empty()
    }
}

impl From<&str> for LegacyValue {
    fn from(value: &str) -> Self {
        LegacyValue::Text(value.to_string())
    }
}

impl From<u64> for LegacyValue {
    fn from(value: u64) -> Self {
        LegacyValue::Number(value.into())
    }
}

/// LegacyFlag - Active flag as sent upstream (bool, 0/1 or S/N-style text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyFlag {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl LegacyFlag {
    /// Interpret the flag; None when the value is not recognizable
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LegacyFlag::Bool(b) => Some(*b),
            LegacyFlag::Number(n) => match n.as_f64() {
                Some(v) if v == 1.0 => Some(true),
                Some(v) if v == 0.0 => Some(false),
                _ => None,
            },
            LegacyFlag::Text(s) => match s.trim().to_uppercase().as_str() {
                "S" | "SIM" | "Y" | "YES" | "TRUE" | "1" | "A" | "ATIVO" => Some(true),
                "N" | "NAO" | "NÃO" | "NO" | "FALSE" | "0" | "I" | "INATIVO" => Some(false),
                _ => None,
            },
            LegacyFlag::Other(_) => None,
        }
    }
}

/// Text field that reads a JSON value of the wrong type as absent.
///
/// One bad field must not fail its whole family; only a record that is not
/// an object does.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Null => Ok(None),
        other => {
            log::debug!("ignoring non-text legacy field value: {}", other);
            Ok(None)
        }
    }
}

// ============================================================================
// FAMILY RECORDS
// ============================================================================

/// Family A - primary membership record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyARecord {
    /// Social / preferred name
    #[serde(
        rename = "NOME_SOCIAL",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub social_name: Option<String>,

    /// Legal name
    #[serde(
        rename = "NOME",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    #[serde(rename = "MATRICULA", default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<LegacyValue>,

    /// Secondary internal registration number
    #[serde(rename = "MATRICULA_INTERNA", default, skip_serializing_if = "Option::is_none")]
    pub internal_registration: Option<LegacyValue>,

    #[serde(
        rename = "PLANO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub plan: Option<String>,

    #[serde(
        rename = "SEGMENTACAO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub segmentation: Option<String>,

    /// National health registry number (CNS)
    #[serde(rename = "CNS", default, skip_serializing_if = "Option::is_none")]
    pub health_registry: Option<LegacyValue>,

    #[serde(rename = "CPF", default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<LegacyValue>,

    #[serde(
        rename = "DATA_NASCIMENTO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<String>,

    #[serde(rename = "ATIVO", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<LegacyFlag>,

    #[serde(
        rename = "INICIO_VIGENCIA",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_from: Option<String>,

    #[serde(
        rename = "FIM_VIGENCIA",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_until: Option<String>,
}

/// Family B - secondary-network membership record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyBRecord {
    #[serde(rename = "MATRICULA_UNIMED", default, skip_serializing_if = "Option::is_none")]
    pub network_registration: Option<LegacyValue>,

    #[serde(
        rename = "PLANO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub plan: Option<String>,

    #[serde(
        rename = "ABRANGENCIA",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub coverage_scope: Option<String>,

    #[serde(
        rename = "ACOMODACAO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub accommodation: Option<String>,

    #[serde(
        rename = "Validade",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_on: Option<String>,

    #[serde(
        rename = "NOME",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    #[serde(rename = "CPF", default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<LegacyValue>,

    // Same flag, two casings in the wild. Kept as two fields so a payload
    // carrying both keys still decodes.
    #[serde(rename = "ATIVO", default, skip_serializing_if = "Option::is_none")]
    pub active_upper: Option<LegacyFlag>,

    #[serde(rename = "ativo", default, skip_serializing_if = "Option::is_none")]
    pub active_lower: Option<LegacyFlag>,
}

impl FamilyBRecord {
    /// Active flag read from either key casing; `ATIVO` wins on conflict
    pub fn active(&self) -> Option<bool> {
        let upper = self.active_upper.as_ref().and_then(LegacyFlag::as_bool);
        let lower = self.active_lower.as_ref().and_then(LegacyFlag::as_bool);

        if let (Some(u), Some(l)) = (upper, lower) {
            if u != l {
                log::warn!(
                    "secondary-network record {:?} has conflicting ATIVO={} / ativo={}; using ATIVO",
                    self.network_registration.as_ref().map(|r| r.as_text().into_owned()),
                    u,
                    l
                );
            }
        }

        upper.or(lower)
    }
}

/// Family C - reciprocity / cross-provider record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyCRecord {
    #[serde(rename = "MATRICULA_RECIPROCIDADE", default, skip_serializing_if = "Option::is_none")]
    pub reciprocity_registration: Option<LegacyValue>,

    #[serde(
        rename = "PRESTADOR",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_name: Option<String>,

    #[serde(
        rename = "VALIDADE",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_on: Option<String>,

    /// Primary-plan name this reciprocity plan maps to
    #[serde(
        rename = "PLANO_MAPEADO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mapped_plan: Option<String>,

    #[serde(
        rename = "NOME_BENEFICIARIO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub beneficiary_name: Option<String>,

    #[serde(rename = "CPF", default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<LegacyValue>,

    #[serde(
        rename = "DATA_NASCIMENTO",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<String>,

    #[serde(rename = "ATIVO", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<LegacyFlag>,
}

// ============================================================================
// TAGGED UNION
// ============================================================================

/// RawRecord - One legacy record, tagged with its family
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Membership(FamilyARecord),
    SecondaryNetwork(FamilyBRecord),
    Reciprocity(FamilyCRecord),
}

impl RawRecord {
    pub fn family(&self) -> CardFamily {
        match self {
            RawRecord::Membership(_) => CardFamily::Membership,
            RawRecord::SecondaryNetwork(_) => CardFamily::SecondaryNetwork,
            RawRecord::Reciprocity(_) => CardFamily::Reciprocity,
        }
    }
}

/// LegacyRecord - Ties a record type to the family it is fetched as
pub trait LegacyRecord: DeserializeOwned {
    const FAMILY: CardFamily;

    fn into_raw(self) -> RawRecord;
}

impl LegacyRecord for FamilyARecord {
    const FAMILY: CardFamily = CardFamily::Membership;

    fn into_raw(self) -> RawRecord {
        RawRecord::Membership(self)
    }
}

impl LegacyRecord for FamilyBRecord {
    const FAMILY: CardFamily = CardFamily::SecondaryNetwork;

    fn into_raw(self) -> RawRecord {
        RawRecord::SecondaryNetwork(self)
    }
}

impl LegacyRecord for FamilyCRecord {
    const FAMILY: CardFamily = CardFamily::Reciprocity;

    fn into_raw(self) -> RawRecord {
        RawRecord::Reciprocity(self)
    }
}

/// Decode one family's JSON array.
///
/// A `null` (or any non-object) where a record belongs is a contract breach
/// by the caller and fails the whole batch instead of being defaulted.
pub fn decode_records<T: LegacyRecord>(json: &str) -> Result<Vec<T>> {
    serde_json::from_str(json).map_err(|e| CardError::decode(T::FAMILY, e))
}

// ============================================================================
// FETCHED FAMILIES
// ============================================================================

/// CardFamilies - The three collections as fetched for one screen-open
///
/// A family whose fetch failed is represented by an empty Vec; there is no
/// "missing" state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFamilies {
    pub membership: Vec<FamilyARecord>,
    pub secondary_network: Vec<FamilyBRecord>,
    pub reciprocity: Vec<FamilyCRecord>,
}

impl CardFamilies {
    pub fn new(
        membership: Vec<FamilyARecord>,
        secondary_network: Vec<FamilyBRecord>,
        reciprocity: Vec<FamilyCRecord>,
    ) -> Self {
        CardFamilies {
            membership,
            secondary_network,
            reciprocity,
        }
    }

    /// Decode the three wire arrays
    pub fn from_json(membership: &str, secondary_network: &str, reciprocity: &str) -> Result<Self> {
        Ok(CardFamilies {
            membership: decode_records(membership)?,
            secondary_network: decode_records(secondary_network)?,
            reciprocity: decode_records(reciprocity)?,
        })
    }

    pub fn total(&self) -> usize {
        self.membership.len() + self.secondary_network.len() + self.reciprocity.len()
    }
}

// ============================================================================
// MEMBER ENRICHMENT
// ============================================================================

/// MemberEnrichment - Logged-in member data used only to fill gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberEnrichment {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub plan_effective_date: Option<String>,
}

impl MemberEnrichment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add full name
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Builder pattern: add employer / company name
    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    /// Builder pattern: add birth date
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Builder pattern: add plan-effective date
    pub fn with_plan_effective_date(mut self, date: impl Into<String>) -> Self {
        self.plan_effective_date = Some(date.into());
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
