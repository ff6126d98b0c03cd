//! Locale-aware leaf values for the PERSON and COMPANY archetypes.

mod adapter;
pub mod locales;

pub use adapter::{FakeLeafGenerator, LeafGenerator, LeafOptions, LeafRecord};
pub use locales::LocaleKey;
