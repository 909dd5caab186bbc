//! ``src/model/country.rs``
//! ============================================================================
//! # Country data model
//!
//! Mirrors the REST Countries v3.1 field set. Every field except the name and
//! code is optional on the wire because the bulk listing only asks for a
//! subset; missing fields deserialize to empty values. Maps are `IndexMap`s so
//! "first native name" and currency/language order follow the response.

use std::{borrow::Borrow, fmt, str::FromStr};

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Placeholder shown for any absent value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Three-letter country identifier (`cca3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(CompactString);

impl CountryCode {
    /// Accepts exactly three characters; the result is uppercased.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.chars().count() == 3 {
            Some(Self(CompactString::from(raw.to_uppercase())))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Route path for this country's detail view.
    pub fn path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CountryCode {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for CountryCode {
    fn from(value: &str) -> Self {
        Self(CompactString::from(value))
    }
}

/// Region selector. `All` disables the region gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Region {
    #[default]
    All,
    Africa,
    Americas,
    Antarctic,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    /// Picker order.
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Africa,
        Self::Americas,
        Self::Antarctic,
        Self::Asia,
        Self::Europe,
        Self::Oceania,
    ];

    /// Value as the API spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Africa => "Africa",
            Self::Americas => "Americas",
            Self::Antarctic => "Antarctic",
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::Oceania => "Oceania",
        }
    }

    /// Text for the filter control.
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Filter by Region",
            other => other.as_str(),
        }
    }

    pub fn matches(self, region: &str) -> bool {
        self == Self::All || self.as_str() == region
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown region: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeName {
    #[serde(default)]
    pub official: String,
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
    #[serde(default, rename = "nativeName")]
    pub native_name: IndexMap<String, NativeName>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// One country as returned by the API. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: CountryName,

    #[serde(rename = "cca3")]
    pub code: CountryCode,

    #[serde(default)]
    pub flags: Flags,

    /// Emoji flag; the only flag a terminal can show.
    #[serde(default)]
    pub flag: Option<String>,

    #[serde(default)]
    pub population: u64,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub subregion: Option<String>,

    #[serde(default)]
    pub capital: SmallVec<[String; 1]>,

    #[serde(default)]
    pub tld: SmallVec<[String; 1]>,

    #[serde(default)]
    pub currencies: IndexMap<String, Currency>,

    #[serde(default)]
    pub languages: IndexMap<String, String>,

    #[serde(default)]
    pub borders: SmallVec<[CountryCode; 8]>,
}

impl Country {
    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    /// First native-name entry, else the common name.
    pub fn native_name(&self) -> &str {
        self.name
            .native_name
            .values()
            .next()
            .map(|n| n.common.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name.common)
    }

    pub fn capital_label(&self) -> &str {
        first_or_na(&self.capital)
    }

    pub fn tld_label(&self) -> &str {
        first_or_na(&self.tld)
    }

    pub fn subregion_label(&self) -> &str {
        self.subregion
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn currencies_label(&self) -> String {
        join_or_na(self.currencies.values().map(|c| c.name.as_str()))
    }

    pub fn languages_label(&self) -> String {
        join_or_na(self.languages.values().map(String::as_str))
    }

    /// Best flag reference for display: svg before png.
    pub fn flag_url(&self) -> Option<&str> {
        self.flags.svg.as_deref().or(self.flags.png.as_deref())
    }
}

fn first_or_na(values: &[String]) -> &str {
    values
        .first()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn join_or_na<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let joined = values.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}

/// Minimal entry of the batch-by-codes lookup (`fields=cca3,name`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryNameEntry {
    #[serde(rename = "cca3")]
    pub code: CountryCode,
    pub name: CountryName,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Small country with just the fields the filters and cards use.
    pub fn country(code: &str, name: &str, region: &str) -> Country {
        Country {
            name: CountryName {
                common: name.to_string(),
                official: name.to_string(),
                native_name: IndexMap::new(),
            },
            code: CountryCode::from(code),
            flags: Flags::default(),
            flag: None,
            population: 1_000,
            region: region.to_string(),
            subregion: None,
            capital: SmallVec::new(),
            tld: SmallVec::new(),
            currencies: IndexMap::new(),
            languages: IndexMap::new(),
            borders: SmallVec::new(),
        }
    }
}
