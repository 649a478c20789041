use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

use member_cards::{
    decode_records, is_eligible_for_reciprocity_brand_with, render_cards_with, CardCatalog,
    CardDisplayModel, CardFamilies, FamilyCRecord, LegacyRecord, MemberEnrichment, PLACEHOLDER,
};

const USAGE: &str = "\
Usage:
  member-cards render   <family_a.json> <family_b.json> <family_c.json> [member.json]
  member-cards export   <family_a.json> <family_b.json> <family_c.json> [member.json]
  member-cards classify <family_c.json>

Use '-' for a family that could not be fetched (treated as empty).
Set MEMBER_CARDS_CATALOG to a JSON file to override the built-in card catalog.";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let catalog = CardCatalog::from_env().context("Failed to load card catalog")?;

    match args.get(1).map(String::as_str) {
        Some("render") => run_render(&catalog, &args[2..]),
        Some("export") => run_export(&catalog, &args[2..]),
        Some("classify") => run_classify(&catalog, &args[2..]),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn run_render(catalog: &CardCatalog, args: &[String]) -> Result<()> {
    let cards = build_cards(catalog, args)?;
    println!("{}", serde_json::to_string_pretty(&cards)?);
    Ok(())
}

fn run_export(catalog: &CardCatalog, args: &[String]) -> Result<()> {
    let cards = build_cards(catalog, args)?;

    let mut writer = csv::Writer::from_writer(io::stdout());
    for card in &cards {
        writer
            .serialize(CardRow::from(card))
            .context("Failed to write CSV row")?;
    }
    writer.flush()?;

    log::info!("Exported {} cards", cards.len());
    Ok(())
}

fn run_classify(catalog: &CardCatalog, args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!("classify needs a family C file\n\n{}", USAGE);
    };

    let records: Vec<FamilyCRecord> = read_family(path)?;
    let mut eligible = 0;

    for (position, record) in records.iter().enumerate() {
        let ok = is_eligible_for_reciprocity_brand_with(catalog, record);
        if ok {
            eligible += 1;
        }
        println!(
            "#{:<3} {} | {} | {}",
            position,
            record.provider_name.as_deref().unwrap_or(PLACEHOLDER),
            record.mapped_plan.as_deref().unwrap_or(PLACEHOLDER),
            if ok { "ELIGIBLE" } else { "not eligible" }
        );
    }

    println!("\n✓ {} of {} reciprocity records eligible", eligible, records.len());
    Ok(())
}

fn build_cards(catalog: &CardCatalog, args: &[String]) -> Result<Vec<CardDisplayModel>> {
    if args.len() < 3 {
        bail!("expected three family files\n\n{}", USAGE);
    }

    let families = CardFamilies::new(
        read_family(&args[0])?,
        read_family(&args[1])?,
        read_family(&args[2])?,
    );

    let member = match args.get(3) {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read member file: {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse member JSON from {}", path))?
        }
        None => MemberEnrichment::default(),
    };

    let cards = render_cards_with(catalog, &families, &member);
    log::info!(
        "Rendered {} cards from {} records ({} A / {} B / {} C)",
        cards.len(),
        families.total(),
        families.membership.len(),
        families.secondary_network.len(),
        families.reciprocity.len()
    );

    Ok(cards)
}

/// "-" stands for a family whose fetch failed
fn read_family<T: LegacyRecord>(path: &str) -> Result<Vec<T>> {
    if path == "-" {
        log::warn!("{} family not provided; using an empty list", T::FAMILY);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to open file: {}", path))?;

    decode_records(&content).with_context(|| format!("Failed to decode {}", path))
}

/// Flat CSV row; brand-specific fields that do not apply are left empty
#[derive(Serialize)]
struct CardRow<'a> {
    brand: &'a str,
    title: &'a str,
    beneficiary_name: &'a str,
    card_number: &'a str,
    plan: &'a str,
    network_code: &'a str,
    national_id: &'a str,
    birth_date: &'a str,
    health_registry_number: &'a str,
    coverage_scope: &'a str,
    accommodation: &'a str,
    segmentation: &'a str,
    provider_name: &'a str,
    validity: &'a str,
    effective_date: &'a str,
    company: &'a str,
    active: &'a str,
}

impl<'a> From<&'a CardDisplayModel> for CardRow<'a> {
    fn from(card: &'a CardDisplayModel) -> Self {
        CardRow {
            brand: card.brand.name(),
            title: &card.title,
            beneficiary_name: &card.beneficiary_name,
            card_number: &card.card_number,
            plan: &card.plan,
            network_code: &card.network_code,
            national_id: &card.national_id,
            birth_date: &card.birth_date,
            health_registry_number: card.health_registry_number.as_deref().unwrap_or(""),
            coverage_scope: card.coverage_scope.as_deref().unwrap_or(""),
            accommodation: card.accommodation.as_deref().unwrap_or(""),
            segmentation: card.segmentation.as_deref().unwrap_or(""),
            provider_name: card.provider_name.as_deref().unwrap_or(""),
            validity: card.validity.as_deref().unwrap_or(""),
            effective_date: card.effective_date.as_deref().unwrap_or(""),
            company: card.company.as_deref().unwrap_or(""),
            active: match card.active {
                Some(true) => "yes",
                Some(false) => "no",
                None => "",
            },
        }
    }
}
