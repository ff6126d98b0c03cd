//! Field-name driven fallback values.
//!
//! Used for CUSTOM entity fields and for selected archetype fields the leaf
//! generator does not produce. Best effort: the lower-cased field name is
//! matched against the rules below in order and the first hit wins.
//!
//! | matched when the name...                                   | value |
//! |---|---|
//! | ends with `_id`, or is `uuid` / `guid`                    | UUID-shaped text |
//! | contains `email`                                           | `word.word12@example.com` |
//! | contains `phone`                                           | `555-123-4567` |
//! | contains `url`, `website`                                  | `https://example.com/...` |
//! | contains `address`                                         | `123 Lorem Street` |
//! | contains `city` / `country`                                | city / country name |
//! | ends with `_at`, contains `time`                           | timestamp in the year before the base date |
//! | contains `date`, `birthday`                                | date in the year before the base date |
//! | contains `price`, `amount`, `cost`, `total`, `salary`, `discount`, `revenue`, `balance` | float, two decimals |
//! | is / contains `age`                                        | integer 18..=90 |
//! | contains `count`, `quantity`, `qty`, `number`              | integer 0..=1000 |
//! | starts with `is_` / `has_`, contains `active`, `enabled`, `verified` | bool |
//! | contains `status`                                          | `active` / `inactive` / `pending` |
//! | contains `description`, `bio`, `notes`, `comment`, `summary` | lorem sentence |
//! | contains `name`, `title`                                   | one to three capitalised lorem words |
//! | anything else                                              | one lorem word |

use chrono::{Days, NaiveDate, NaiveTime};
use rand::{Rng, RngCore};

use crate::generators::GeneratedValue;

/// Generate a plausible value for a field from its name alone.
pub fn generate_for_field(
    field: &str,
    base_date: NaiveDate,
    rng: &mut dyn RngCore,
) -> GeneratedValue {
    let name = field.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| name.contains(needle));

    if name.ends_with("_id") || name == "uuid" || name == "guid" {
        return GeneratedValue::Text(random_uuid(rng));
    }
    if has(&["email"]) {
        return GeneratedValue::Text(format!(
            "{}.{}{}@example.com",
            word(rng),
            word(rng),
            rng.random_range(1..=99)
        ));
    }
    if has(&["phone"]) {
        return GeneratedValue::Text(format!(
            "555-{:03}-{:04}",
            rng.random_range(0..1000),
            rng.random_range(0..10000)
        ));
    }
    if has(&["url", "website"]) {
        return GeneratedValue::Text(format!(
            "https://example.com/{}-{}",
            word(rng),
            rng.random_range(1..=9999)
        ));
    }
    if has(&["address"]) {
        return GeneratedValue::Text(format!(
            "{} {} Street",
            rng.random_range(1..=9999),
            capitalize(word(rng))
        ));
    }
    if has(&["city"]) {
        return GeneratedValue::Text(pick(CITIES, rng).to_string());
    }
    if has(&["country"]) {
        return GeneratedValue::Text(pick(COUNTRIES, rng).to_string());
    }
    if name.ends_with("_at") || has(&["time"]) {
        let date = recent_date(base_date, rng);
        let seconds = rng.random_range(0..86_400);
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default();
        return GeneratedValue::Timestamp(date.and_time(time));
    }
    if has(&["date", "birthday"]) {
        return GeneratedValue::Date(recent_date(base_date, rng));
    }
    if has(&[
        "price", "amount", "cost", "total", "salary", "discount", "revenue", "balance",
    ]) {
        let cents = rng.random_range(100..=100_000_i64);
        return GeneratedValue::Float(cents as f64 / 100.0);
    }
    if name == "age" || name.ends_with("_age") || name.starts_with("age_") {
        return GeneratedValue::Int(rng.random_range(18..=90));
    }
    if has(&["count", "quantity", "qty", "number"]) {
        return GeneratedValue::Int(rng.random_range(0..=1000));
    }
    if name.starts_with("is_") || name.starts_with("has_") || has(&["active", "enabled", "verified"])
    {
        return GeneratedValue::Bool(rng.random_bool(0.5));
    }
    if has(&["status"]) {
        return GeneratedValue::Text(pick(STATUSES, rng).to_string());
    }
    if has(&["description", "bio", "notes", "comment", "summary"]) {
        return GeneratedValue::Text(sentence(rng));
    }
    if has(&["name", "title"]) {
        let count = rng.random_range(1..=3);
        let words: Vec<String> = (0..count).map(|_| capitalize(word(rng))).collect();
        return GeneratedValue::Text(words.join(" "));
    }

    GeneratedValue::Text(word(rng).to_string())
}

fn recent_date(base_date: NaiveDate, rng: &mut dyn RngCore) -> NaiveDate {
    let back = rng.random_range(0..=365);
    base_date
        .checked_sub_days(Days::new(back))
        .unwrap_or(base_date)
}

fn random_uuid(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

fn sentence(rng: &mut dyn RngCore) -> String {
    let count = rng.random_range(8..=16);
    let words: Vec<&str> = (0..count).map(|_| word(rng)).collect();
    format!("{}.", capitalize(&words.join(" ")))
}

fn word(rng: &mut dyn RngCore) -> &'static str {
    pick(LOREM_WORDS, rng)
}

fn pick<'a>(values: &'a [&'a str], rng: &mut dyn RngCore) -> &'a str {
    values[rng.random_range(0..values.len())]
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const LOREM_WORDS: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
];

const CITIES: &[&str] = &[
    "Springfield",
    "Riverton",
    "Lakeside",
    "Fairview",
    "Greenville",
    "Madison",
    "Georgetown",
    "Salem",
];

const COUNTRIES: &[&str] = &[
    "United States",
    "Brazil",
    "Canada",
    "Germany",
    "Japan",
    "Portugal",
    "Australia",
    "Mexico",
];

const STATUSES: &[&str] = &["active", "inactive", "pending"];
