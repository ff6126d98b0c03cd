use std::fmt;

/// Locales the leaf generator has data tables for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocaleKey {
    #[default]
    EnUs,
    PtBr,
}

impl LocaleKey {
    /// Parse a locale hint. Case and the `-`/`_` separator are ignored, and a
    /// bare language code selects its only supported region.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "en_us" | "en" => Some(Self::EnUs),
            "pt_br" | "pt" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
