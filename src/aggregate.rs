// 🎠 Card Aggregator - three families → one ordered, tagged carousel
//
// Order is fixed: every Family A record, then Family B, then Family C, each in
// the order received. No sorting, no dedup, no filtering at this stage.

use crate::catalog::CardCatalog;
use crate::classify::{brand_for, CardBrand};
use crate::records::{
    CardFamilies, CardFamily, FamilyARecord, FamilyBRecord, FamilyCRecord, LegacyRecord,
    MemberEnrichment, RawRecord,
};
use crate::resolve::{resolve_record, CardDisplayModel};

/// TaggedRecord - One carousel slot before field resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRecord {
    pub family: CardFamily,

    /// Index within its own family's input
    pub position: usize,

    /// Template the record renders as; None when it is not eligible for any
    pub brand: Option<CardBrand>,

    pub record: RawRecord,
}

impl TaggedRecord {
    pub fn is_renderable(&self) -> bool {
        self.brand.is_some()
    }
}

/// Concatenate the three families (A, B, C) using the built-in catalog
pub fn combine_card_families(
    family_a: &[FamilyARecord],
    family_b: &[FamilyBRecord],
    family_c: &[FamilyCRecord],
) -> Vec<TaggedRecord> {
    combine_card_families_with(CardCatalog::builtin(), family_a, family_b, family_c)
}

pub fn combine_card_families_with(
    catalog: &CardCatalog,
    family_a: &[FamilyARecord],
    family_b: &[FamilyBRecord],
    family_c: &[FamilyCRecord],
) -> Vec<TaggedRecord> {
    let mut tagged = Vec::with_capacity(family_a.len() + family_b.len() + family_c.len());

    append_family(catalog, &mut tagged, family_a);
    append_family(catalog, &mut tagged, family_b);
    append_family(catalog, &mut tagged, family_c);

    tagged
}

fn append_family<T: LegacyRecord + Clone>(
    catalog: &CardCatalog,
    out: &mut Vec<TaggedRecord>,
    records: &[T],
) {
    for (position, record) in records.iter().enumerate() {
        let record = record.clone().into_raw();
        out.push(TaggedRecord {
            family: T::FAMILY,
            position,
            brand: brand_for(catalog, &record),
            record,
        });
    }
}

/// Resolve one slot; None for a record with no brand
pub fn resolve_tagged(
    catalog: &CardCatalog,
    tagged: &TaggedRecord,
    enrichment: &MemberEnrichment,
) -> Option<CardDisplayModel> {
    tagged
        .brand
        .map(|_| resolve_record(catalog, &tagged.record, enrichment))
}

/// Full pipeline with the built-in catalog
pub fn render_cards(families: &CardFamilies, enrichment: &MemberEnrichment) -> Vec<CardDisplayModel> {
    render_cards_with(CardCatalog::builtin(), families, enrichment)
}

/// Aggregate, then resolve every branded slot in carousel order
pub fn render_cards_with(
    catalog: &CardCatalog,
    families: &CardFamilies,
    enrichment: &MemberEnrichment,
) -> Vec<CardDisplayModel> {
    let tagged = combine_card_families_with(
        catalog,
        &families.membership,
        &families.secondary_network,
        &families.reciprocity,
    );

    tagged
        .iter()
        .filter_map(|slot| {
            if !slot.is_renderable() {
                log::debug!(
                    "skipping {} record #{}: not eligible for any card brand",
                    slot.family,
                    slot.position
                );
                return None;
            }
            resolve_tagged(catalog, slot, enrichment)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn a(name: &str) -> FamilyARecord {
        FamilyARecord {
            name: Some(name.to_string()),
            ..FamilyARecord::default()
        }
    }

    fn b(name: &str) -> FamilyBRecord {
        FamilyBRecord {
            name: Some(name.to_string()),
            ..FamilyBRecord::default()
        }
    }

    fn c(name: &str, eligible: bool) -> FamilyCRecord {
        FamilyCRecord {
            beneficiary_name: Some(name.to_string()),
            provider_name: Some("PLANSERV".to_string()),
            mapped_plan: Some((if eligible { "MASTER APARTAMENTO" } else { "OUTRO" }).to_string()),
            ..FamilyCRecord::default()
        }
    }

    #[test]
    fn test_family_precedence_and_order() {
        let fa = [a("a1"), a("a2")];
        let fb = [b("b1")];
        let fc = [c("c1", true), c("c2", false)];

        let tagged = combine_card_families(&fa, &fb, &fc);

        let order: Vec<(CardFamily, usize)> = tagged.iter().map(|t| (t.family, t.position)).collect();
        assert_eq!(
            order,
            vec![
                (CardFamily::Membership, 0),
                (CardFamily::Membership, 1),
                (CardFamily::SecondaryNetwork, 0),
                (CardFamily::Reciprocity, 0),
                (CardFamily::Reciprocity, 1),
            ]
        );

        assert_eq!(tagged[0].record, RawRecord::Membership(fa[0].clone()));
        assert_eq!(tagged[1].record, RawRecord::Membership(fa[1].clone()));
        assert_eq!(tagged[2].record, RawRecord::SecondaryNetwork(fb[0].clone()));
        assert_eq!(tagged[3].record, RawRecord::Reciprocity(fc[0].clone()));
        assert_eq!(tagged[4].record, RawRecord::Reciprocity(fc[1].clone()));
    }

    #[test]
    fn test_no_dedup_no_filter() {
        let fa = [a("same"), a("same")];
        let fc = [c("x", false)];

        let tagged = combine_card_families(&fa, &[], &fc);

        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged[2].brand, None);
        assert!(!tagged[2].is_renderable());
    }

    #[test]
    fn test_stable_across_calls() {
        let fa = [a("a1")];
        let fb = [b("b1"), b("b2")];
        let fc = [c("c1", true)];

        let first = combine_card_families(&fa, &fb, &fc);
        let second = combine_card_families(&fa, &fb, &fc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_families() {
        assert!(combine_card_families(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_brand_tags() {
        let tagged = combine_card_families(&[a("a")], &[b("b")], &[c("c", true)]);
        let brands: Vec<Option<CardBrand>> = tagged.iter().map(|t| t.brand).collect();
        assert_eq!(
            brands,
            vec![
                Some(CardBrand::Primary),
                Some(CardBrand::SecondaryNetwork),
                Some(CardBrand::Reciprocity)
            ]
        );
    }

    #[test]
    fn test_render_cards_skips_ineligible_reciprocity() {
        let families = CardFamilies::new(
            vec![a("ana")],
            vec![b("bruno")],
            vec![c("carla", false), c("caio", true)],
        );

        let cards = render_cards(&families, &MemberEnrichment::new());

        let names: Vec<&str> = cards.iter().map(|card| card.beneficiary_name.as_str()).collect();
        assert_eq!(names, vec!["ANA", "BRUNO", "CAIO"]);
    }

    #[test]
    fn test_render_cards_with_custom_catalog() {
        let catalog = CardCatalog {
            reciprocity_plans: vec!["OUTRO".to_string()],
            ..CardCatalog::default()
        };
        let families = CardFamilies::new(vec![], vec![], vec![c("carla", false), c("caio", true)]);

        let cards = render_cards_with(&catalog, &families, &MemberEnrichment::new());

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].beneficiary_name, "CARLA");
    }

    #[test]
    fn test_reciprocity_card_carries_tier() {
        let families = CardFamilies::new(vec![], vec![], vec![c("caio", true)]);

        let cards = render_cards(&families, &MemberEnrichment::new());

        assert_eq!(cards[0].plan, "MASTER APARTAMENTO");
        assert_eq!(cards[0].network_code, "R3");
    }
}
