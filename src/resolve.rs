// 🧩 Field Resolvers - raw record + member enrichment → CardDisplayModel
//
// One resolver per brand. Every display field with more than one possible
// source walks a fixed fallback chain: the first non-blank candidate wins, and
// an empty string counts as missing. Nothing here fails; gaps render "-".

use crate::catalog::CardCatalog;
use crate::classify::CardBrand;
use crate::format::{format_card_number, format_date, format_national_id, PLACEHOLDER};
use crate::records::{
    FamilyARecord, FamilyBRecord, FamilyCRecord, LegacyFlag, LegacyValue, MemberEnrichment,
    RawRecord,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// BUSINESS CONSTANTS
// ============================================================================

pub const PRIMARY_TITLE: &str = "CARTEIRINHA DIGITAL";
pub const SECONDARY_NETWORK_TITLE: &str = "CARTÃO REDE UNIMED";
pub const RECIPROCITY_TITLE: &str = "CARTÃO RECIPROCIDADE PLANSERV";

/// Segmentation printed on every secondary-network card
pub const SECONDARY_NETWORK_SEGMENTATION: &str = "AMBULATORIAL + HOSPITALAR COM OBSTETRÍCIA";

pub const PRIMARY_FOOTER: &str =
    "Documento pessoal e intransferível. Apresente junto com documento de identidade com foto.";
pub const SECONDARY_NETWORK_FOOTER: &str =
    "Atendimento na rede credenciada Unimed conforme a abrangência do plano contratado.";
pub const RECIPROCITY_FOOTER: &str =
    "Atendimento em regime de reciprocidade. Consulte a rede credenciada do prestador.";

// ============================================================================
// DISPLAY MODEL
// ============================================================================

/// CardDisplayModel - Canonical, fully formatted card for the UI
///
/// Brand-specific fields are `Some` only for brands where they apply; the UI
/// renders what it gets and never re-formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDisplayModel {
    pub brand: CardBrand,
    pub title: String,

    /// Always upper-case
    pub beneficiary_name: String,
    pub card_number: String,
    pub plan: String,
    pub network_code: String,
    pub national_id: String,
    pub birth_date: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_registry_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    pub footer: String,
}

// ============================================================================
// FALLBACK CHAINS
// ============================================================================

/// First candidate that is present and not blank, trimmed
fn first_filled<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn first_filled_value<'a, const N: usize>(
    candidates: [Option<&'a LegacyValue>; N],
) -> Option<&'a LegacyValue> {
    candidates.into_iter().flatten().find(|v| !v.is_blank())
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

fn beneficiary<const N: usize>(candidates: [Option<&str>; N]) -> String {
    first_filled(candidates)
        .map(str::to_uppercase)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn card_number(value: Option<&LegacyValue>) -> String {
    match value {
        Some(v) => format_card_number(Some(&v.as_text())),
        None => PLACEHOLDER.to_string(),
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    first_filled([value]).map(String::from)
}

fn optional_date<const N: usize>(candidates: [Option<&str>; N]) -> Option<String> {
    first_filled(candidates).map(|d| format_date(Some(d)))
}

fn flag(value: Option<&LegacyFlag>) -> Option<bool> {
    value.and_then(LegacyFlag::as_bool)
}

// ============================================================================
// RESOLVERS
// ============================================================================

/// Primary insurer card from a Family A record
pub fn extract_primary_card_data(
    record: &FamilyARecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    extract_primary_card_data_with(CardCatalog::builtin(), record, enrichment)
}

pub fn extract_primary_card_data_with(
    catalog: &CardCatalog,
    record: &FamilyARecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    let plan = first_filled([record.plan.as_deref()]);

    CardDisplayModel {
        brand: CardBrand::Primary,
        title: PRIMARY_TITLE.to_string(),
        beneficiary_name: beneficiary([
            record.social_name.as_deref(),
            record.name.as_deref(),
            enrichment.full_name.as_deref(),
        ]),
        card_number: card_number(first_filled_value([
            record.registration.as_ref(),
            record.internal_registration.as_ref(),
        ])),
        plan: text_or_placeholder(plan),
        network_code: catalog.network_code(plan),
        national_id: format_national_id(record.national_id.as_ref()),
        birth_date: format_date(first_filled([
            record.birth_date.as_deref(),
            enrichment.birth_date.as_deref(),
        ])),
        health_registry_number: first_filled_value([record.health_registry.as_ref()])
            .map(|v| v.as_text().into_owned()),
        coverage_scope: None,
        accommodation: None,
        segmentation: Some(text_or_placeholder(first_filled([record.segmentation.as_deref()]))),
        provider_name: None,
        validity: Some(format_date(first_filled([record.valid_until.as_deref()]))),
        effective_date: optional_date([
            record.valid_from.as_deref(),
            enrichment.plan_effective_date.as_deref(),
        ]),
        company: optional_text(enrichment.company_name.as_deref()),
        active: flag(record.active.as_ref()),
        footer: PRIMARY_FOOTER.to_string(),
    }
}

/// Secondary-network card from a Family B record
pub fn extract_secondary_network_card_data(
    record: &FamilyBRecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    extract_secondary_network_card_data_with(CardCatalog::builtin(), record, enrichment)
}

pub fn extract_secondary_network_card_data_with(
    catalog: &CardCatalog,
    record: &FamilyBRecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    let plan = first_filled([record.plan.as_deref()]);

    CardDisplayModel {
        brand: CardBrand::SecondaryNetwork,
        title: SECONDARY_NETWORK_TITLE.to_string(),
        beneficiary_name: beneficiary([record.name.as_deref(), enrichment.full_name.as_deref()]),
        card_number: card_number(first_filled_value([record.network_registration.as_ref()])),
        plan: text_or_placeholder(plan),
        network_code: catalog.network_code(plan),
        national_id: format_national_id(record.national_id.as_ref()),
        birth_date: format_date(first_filled([enrichment.birth_date.as_deref()])),
        health_registry_number: None,
        coverage_scope: Some(text_or_placeholder(first_filled([record.coverage_scope.as_deref()]))),
        accommodation: Some(text_or_placeholder(first_filled([record.accommodation.as_deref()]))),
        segmentation: Some(SECONDARY_NETWORK_SEGMENTATION.to_string()),
        provider_name: None,
        validity: Some(format_date(first_filled([record.expires_on.as_deref()]))),
        effective_date: optional_date([enrichment.plan_effective_date.as_deref()]),
        company: optional_text(enrichment.company_name.as_deref()),
        active: record.active(),
        footer: SECONDARY_NETWORK_FOOTER.to_string(),
    }
}

/// Reciprocity partner card from a Family C record.
///
/// Does not check eligibility; callers gate on
/// [`is_eligible_for_reciprocity_brand`](crate::classify::is_eligible_for_reciprocity_brand).
pub fn extract_reciprocity_card_data(
    record: &FamilyCRecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    extract_reciprocity_card_data_with(CardCatalog::builtin(), record, enrichment)
}

pub fn extract_reciprocity_card_data_with(
    catalog: &CardCatalog,
    record: &FamilyCRecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    let plan = first_filled([record.mapped_plan.as_deref()]);

    CardDisplayModel {
        brand: CardBrand::Reciprocity,
        title: RECIPROCITY_TITLE.to_string(),
        beneficiary_name: beneficiary([
            record.beneficiary_name.as_deref(),
            enrichment.full_name.as_deref(),
        ]),
        card_number: card_number(first_filled_value([record.reciprocity_registration.as_ref()])),
        plan: text_or_placeholder(plan),
        network_code: catalog.network_code(plan),
        national_id: format_national_id(record.national_id.as_ref()),
        birth_date: format_date(first_filled([
            record.birth_date.as_deref(),
            enrichment.birth_date.as_deref(),
        ])),
        health_registry_number: None,
        coverage_scope: None,
        accommodation: None,
        segmentation: None,
        provider_name: Some(text_or_placeholder(first_filled([record.provider_name.as_deref()]))),
        validity: Some(format_date(first_filled([record.expires_on.as_deref()]))),
        effective_date: optional_date([enrichment.plan_effective_date.as_deref()]),
        company: optional_text(enrichment.company_name.as_deref()),
        active: flag(record.active.as_ref()),
        footer: RECIPROCITY_FOOTER.to_string(),
    }
}

/// Pick the resolver by family tag
pub fn resolve_record(
    catalog: &CardCatalog,
    record: &RawRecord,
    enrichment: &MemberEnrichment,
) -> CardDisplayModel {
    match record {
        RawRecord::Membership(a) => extract_primary_card_data_with(catalog, a, enrichment),
        RawRecord::SecondaryNetwork(b) => {
            extract_secondary_network_card_data_with(catalog, b, enrichment)
        }
        RawRecord::Reciprocity(c) => extract_reciprocity_card_data_with(catalog, c, enrichment),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn family_b(value: serde_json::Value) -> FamilyBRecord {
        serde_json::from_value(value).unwrap()
    }

    fn family_a(value: serde_json::Value) -> FamilyARecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_secondary_network_end_to_end() {
        let record = family_b(json!({
            "MATRICULA_UNIMED": "0025076959600008",
            "PLANO": "BASICO",
            "Validade": "2026-01-15"
        }));
        let member = MemberEnrichment::new().with_full_name("Maria Silva");

        let card = extract_secondary_network_card_data(&record, &member);

        assert_eq!(card.brand, CardBrand::SecondaryNetwork);
        assert_eq!(card.card_number, "0 025 07695960000 8");
        assert_eq!(card.network_code, "R1");
        assert_eq!(card.validity.as_deref(), Some("15/01/2026"));
        assert_eq!(card.beneficiary_name, "MARIA SILVA");
        assert_eq!(card.national_id, "-");
        assert_eq!(card.birth_date, "-");
        assert_eq!(card.segmentation.as_deref(), Some(SECONDARY_NETWORK_SEGMENTATION));
        assert_eq!(card.coverage_scope.as_deref(), Some("-"));
        assert_eq!(card.provider_name, None);
    }

    #[test]
    fn test_primary_beneficiary_chain_order() {
        let member = MemberEnrichment::new().with_full_name("Enriched Name");

        let social = family_a(json!({"NOME_SOCIAL": "Alex", "NOME": "Alexandre Lima"}));
        assert_eq!(extract_primary_card_data(&social, &member).beneficiary_name, "ALEX");

        let legal = family_a(json!({"NOME": "Alexandre Lima"}));
        assert_eq!(
            extract_primary_card_data(&legal, &member).beneficiary_name,
            "ALEXANDRE LIMA"
        );

        let enriched = family_a(json!({}));
        assert_eq!(
            extract_primary_card_data(&enriched, &member).beneficiary_name,
            "ENRICHED NAME"
        );

        let nothing = family_a(json!({}));
        assert_eq!(
            extract_primary_card_data(&nothing, &MemberEnrichment::new()).beneficiary_name,
            "-"
        );
    }

    #[test]
    fn test_empty_social_name_falls_through() {
        let record = family_a(json!({"NOME_SOCIAL": "", "NOME": "joana prado"}));
        let member = MemberEnrichment::new().with_full_name("Outra Pessoa");

        let card = extract_primary_card_data(&record, &member);
        assert_eq!(card.beneficiary_name, "JOANA PRADO");

        let blank = family_a(json!({"NOME_SOCIAL": "   ", "NOME": "joana prado"}));
        assert_eq!(extract_primary_card_data(&blank, &member).beneficiary_name, "JOANA PRADO");
    }

    #[test]
    fn test_primary_full_record() {
        let record = family_a(json!({
            "NOME": "Carlos Dias",
            "MATRICULA": "",
            "MATRICULA_INTERNA": 12345678,
            "PLANO": "Executivo Apartamento",
            "SEGMENTACAO": "HOSPITALAR",
            "CNS": "898001160660831",
            "CPF": 9876543210u64,
            "DATA_NASCIMENTO": "1985-07-04T00:00:00",
            "ATIVO": true,
            "INICIO_VIGENCIA": "2020-02-01",
            "FIM_VIGENCIA": "31/12/2027"
        }));
        let member = MemberEnrichment::new()
            .with_company_name("ACME LTDA")
            .with_birth_date("1900-01-01")
            .with_plan_effective_date("2019-01-01");

        let card = extract_primary_card_data(&record, &member);

        assert_eq!(card.title, PRIMARY_TITLE);
        assert_eq!(card.card_number, "1234 5678");
        assert_eq!(card.plan, "Executivo Apartamento");
        assert_eq!(card.network_code, "R4");
        assert_eq!(card.national_id, "098.765.432-10");
        assert_eq!(card.birth_date, "04/07/1985");
        assert_eq!(card.health_registry_number.as_deref(), Some("898001160660831"));
        assert_eq!(card.segmentation.as_deref(), Some("HOSPITALAR"));
        assert_eq!(card.validity.as_deref(), Some("31/12/2027"));
        assert_eq!(card.effective_date.as_deref(), Some("01/02/2020"));
        assert_eq!(card.company.as_deref(), Some("ACME LTDA"));
        assert_eq!(card.active, Some(true));
        assert_eq!(card.coverage_scope, None);
        assert_eq!(card.footer, PRIMARY_FOOTER);
    }

    #[test]
    fn test_primary_enrichment_fills_dates() {
        let member = MemberEnrichment::new()
            .with_birth_date("1990-05-02")
            .with_plan_effective_date("2018-03-10T12:00:00");

        let card = extract_primary_card_data(&family_a(json!({"DATA_NASCIMENTO": ""})), &member);

        assert_eq!(card.birth_date, "02/05/1990");
        assert_eq!(card.effective_date.as_deref(), Some("10/03/2018"));
        assert_eq!(card.validity.as_deref(), Some("-"));
        assert_eq!(card.health_registry_number, None);
    }

    #[test]
    fn test_malformed_fields_degrade_to_placeholder() {
        let record = family_a(json!({
            "DATA_NASCIMENTO": "ontem",
            "CPF": "sem cpf",
            "PLANO": ""
        }));
        let member = MemberEnrichment::new().with_birth_date("1990-05-02");

        let card = extract_primary_card_data(&record, &member);

        // First non-blank candidate wins even when it does not parse
        assert_eq!(card.birth_date, "-");
        assert_eq!(card.national_id, "-");
        assert_eq!(card.plan, "-");
        assert_eq!(card.network_code, "N/A");
        assert_eq!(card.card_number, "-");
    }

    #[test]
    fn test_reciprocity_card() {
        let record: FamilyCRecord = serde_json::from_value(json!({
            "MATRICULA_RECIPROCIDADE": "98765432",
            "PRESTADOR": "PLANSERV",
            "VALIDADE": "2025-06-30T03:00:00.000Z",
            "PLANO_MAPEADO": "ESPECIAL APARTAMENTO",
            "ATIVO": "N"
        }))
        .unwrap();
        let member = MemberEnrichment::new()
            .with_full_name("Beatriz Nunes")
            .with_birth_date("2001-09-09");

        let card = extract_reciprocity_card_data(&record, &member);

        assert_eq!(card.brand, CardBrand::Reciprocity);
        assert_eq!(card.beneficiary_name, "BEATRIZ NUNES");
        assert_eq!(card.card_number, "9876 5432");
        assert_eq!(card.provider_name.as_deref(), Some("PLANSERV"));
        assert_eq!(card.plan, "ESPECIAL APARTAMENTO");
        assert_eq!(card.network_code, "R2");
        assert_eq!(card.validity.as_deref(), Some("30/06/2025"));
        assert_eq!(card.birth_date, "09/09/2001");
        assert_eq!(card.active, Some(false));
        assert_eq!(card.segmentation, None);
    }

    #[test]
    fn test_resolve_record_dispatches_by_family() {
        let member = MemberEnrichment::new();
        let catalog = CardCatalog::builtin();

        let a = resolve_record(catalog, &RawRecord::Membership(FamilyARecord::default()), &member);
        let b = resolve_record(
            catalog,
            &RawRecord::SecondaryNetwork(FamilyBRecord::default()),
            &member,
        );
        let c = resolve_record(catalog, &RawRecord::Reciprocity(FamilyCRecord::default()), &member);

        assert_eq!(a.title, PRIMARY_TITLE);
        assert_eq!(b.title, SECONDARY_NETWORK_TITLE);
        assert_eq!(c.title, RECIPROCITY_TITLE);
    }

    #[test]
    fn test_model_serializes_camel_case() {
        let record = family_b(json!({"MATRICULA_UNIMED": "1234"}));
        let card = extract_secondary_network_card_data(&record, &MemberEnrichment::new());
        let value = serde_json::to_value(&card).unwrap();

        assert_eq!(value["brand"], "secondary_network");
        assert_eq!(value["cardNumber"], "1234");
        assert_eq!(value["beneficiaryName"], "-");
        assert!(value.get("providerName").is_none());
    }
}
