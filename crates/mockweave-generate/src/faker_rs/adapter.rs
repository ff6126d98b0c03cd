use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, CityName, CountryName, StreetName, ZipCode};
use fake::faker::company::raw::{CatchPhrase, CompanyName, Industry, Profession};
use fake::faker::internet::raw::DomainSuffix;
use fake::faker::name::raw::{FirstName, LastName};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{Data, EN, PT_BR};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use mockweave_core::Archetype;

use crate::errors::GenerationError;
use crate::faker_rs::locales::LocaleKey;
use crate::generators::GeneratedValue;

/// Field values produced for one archetype record, keyed by field name.
pub type LeafRecord = BTreeMap<String, GeneratedValue>;

/// Inputs for one leaf record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafOptions {
    pub seed: u64,
    pub locale: LocaleKey,
    /// Reference date for birth dates and founding years.
    pub base_date: NaiveDate,
}

/// Realistic values for the built-in archetypes.
///
/// Implementations must be deterministic in `options`: the same seed, locale
/// and base date always produce the same record. CUSTOM yields an empty record.
pub trait LeafGenerator {
    fn generate(
        &self,
        archetype: Archetype,
        options: &LeafOptions,
    ) -> Result<LeafRecord, GenerationError>;
}

/// Leaf generator backed by the `fake` data tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeLeafGenerator;

impl LeafGenerator for FakeLeafGenerator {
    fn generate(
        &self,
        archetype: Archetype,
        options: &LeafOptions,
    ) -> Result<LeafRecord, GenerationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let record = match (archetype, options.locale) {
            (Archetype::Person, LocaleKey::EnUs) => person(EN, options.base_date, &mut rng),
            (Archetype::Person, LocaleKey::PtBr) => person(PT_BR, options.base_date, &mut rng),
            (Archetype::Company, LocaleKey::EnUs) => company(EN, options.base_date, &mut rng),
            (Archetype::Company, LocaleKey::PtBr) => company(PT_BR, options.base_date, &mut rng),
            (Archetype::Custom, _) => LeafRecord::new(),
        };
        Ok(record)
    }
}

fn person<L: Data + Copy + fake::faker::impls::address::CityNameGenFn>(locale: L, base_date: NaiveDate, rng: &mut dyn RngCore) -> LeafRecord {
    let first: String = FirstName(locale).fake_with_rng(rng);
    let last: String = LastName(locale).fake_with_rng(rng);
    let suffix: String = DomainSuffix(locale).fake_with_rng(rng);
    let phone: String = PhoneNumber(locale).fake_with_rng(rng);
    let street = street_address(locale, rng);
    let city: String = CityName(locale).fake_with_rng(rng);
    let country: String = CountryName(locale).fake_with_rng(rng);
    let zip: String = ZipCode(locale).fake_with_rng(rng);
    let job: String = Profession(locale).fake_with_rng(rng);
    let age_days = rng.random_range(18 * 365..=80 * 365);
    let birth = base_date
        .checked_sub_days(Days::new(age_days))
        .unwrap_or(base_date);

    let email = format!(
        "{}.{}{}@example.{suffix}",
        slugify(&first),
        slugify(&last),
        rng.random_range(1..=999)
    );

    let mut record = LeafRecord::new();
    record.insert("full_name".to_string(), text(format!("{first} {last}")));
    record.insert("first_name".to_string(), text(first));
    record.insert("last_name".to_string(), text(last));
    record.insert("email".to_string(), text(email));
    record.insert("phone".to_string(), text(phone));
    record.insert("street_address".to_string(), text(street));
    record.insert("city".to_string(), text(city));
    record.insert("country".to_string(), text(country));
    record.insert("zip_code".to_string(), text(zip));
    record.insert("job_title".to_string(), text(job));
    record.insert("date_of_birth".to_string(), GeneratedValue::Date(birth));
    record
}

fn company<L: Data + Copy + fake::faker::impls::address::CityNameGenFn>(locale: L, base_date: NaiveDate, rng: &mut dyn RngCore) -> LeafRecord {
    let name: String = CompanyName(locale).fake_with_rng(rng);
    let industry: String = Industry(locale).fake_with_rng(rng);
    let catch_phrase: String = CatchPhrase(locale).fake_with_rng(rng);
    let suffix: String = DomainSuffix(locale).fake_with_rng(rng);
    let phone: String = PhoneNumber(locale).fake_with_rng(rng);
    let street = street_address(locale, rng);
    let city: String = CityName(locale).fake_with_rng(rng);
    let country: String = CountryName(locale).fake_with_rng(rng);
    let founded = base_date.year() - rng.random_range(1..=100);
    let employees = rng.random_range(1..=5000_i64);

    let domain = format!("{}.{suffix}", slugify(&name));

    let mut record = LeafRecord::new();
    record.insert("name".to_string(), text(name));
    record.insert("industry".to_string(), text(industry));
    record.insert("catch_phrase".to_string(), text(catch_phrase));
    record.insert("email".to_string(), text(format!("contact@{domain}")));
    record.insert("phone".to_string(), text(phone));
    record.insert("website".to_string(), text(format!("https://www.{domain}")));
    record.insert("street_address".to_string(), text(street));
    record.insert("city".to_string(), text(city));
    record.insert("country".to_string(), text(country));
    record.insert("founded_year".to_string(), GeneratedValue::Int(founded.into()));
    record.insert("employee_count".to_string(), GeneratedValue::Int(employees));
    record
}

fn street_address<L: Data + Copy>(locale: L, rng: &mut dyn RngCore) -> String {
    let number: String = BuildingNumber(locale).fake_with_rng(rng);
    let street: String = StreetName(locale).fake_with_rng(rng);
    format!("{number} {street}")
}

fn text(value: String) -> GeneratedValue {
    GeneratedValue::Text(value)
}

fn slugify(value: &str) -> String {
    let slug: String = value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .flat_map(|ch| ch.to_lowercase())
        .collect();
    if slug.is_empty() {
        "contact".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockweave_core::{COMPANY_FIELDS, PERSON_FIELDS};

    fn options(seed: u64, locale: LocaleKey) -> LeafOptions {
        LeafOptions {
            seed,
            locale,
            base_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn person_record_covers_archetype_fields() {
        let record = FakeLeafGenerator
            .generate(Archetype::Person, &options(1, LocaleKey::EnUs))
            .unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = PERSON_FIELDS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert!(record["email"].as_str().unwrap().contains('@'));
    }

    #[test]
    fn company_record_covers_archetype_fields() {
        let record = FakeLeafGenerator
            .generate(Archetype::Company, &options(2, LocaleKey::PtBr))
            .unwrap();
        for field in COMPANY_FIELDS {
            assert!(record.contains_key(*field), "missing {field}");
        }
        let founded = record["founded_year"].as_i64().unwrap();
        assert!((1926..=2025).contains(&founded));
    }

    #[test]
    fn same_seed_same_record() {
        let a = FakeLeafGenerator
            .generate(Archetype::Person, &options(9, LocaleKey::PtBr))
            .unwrap();
        let b = FakeLeafGenerator
            .generate(Archetype::Person, &options(9, LocaleKey::PtBr))
            .unwrap();
        let c = FakeLeafGenerator
            .generate(Archetype::Person, &options(10, LocaleKey::PtBr))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn custom_archetype_is_empty() {
        let record = FakeLeafGenerator
            .generate(Archetype::Custom, &options(3, LocaleKey::EnUs))
            .unwrap();
        assert!(record.is_empty());
    }
}
