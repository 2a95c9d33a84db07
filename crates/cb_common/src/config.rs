//! World generator configuration handling

use std::fmt::{Display, Formatter};

use smart_default::SmartDefault;
use thiserror::Error;

use crate::prelude::*;

/// Reasons the generator configuration can be rejected at start.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvalidConfig {
    /// A selector names a generator that is not registered.
    #[error("Unrecognized {kind} generator {selector:?}")]
    UnknownSelector {
        /// The stage kind the selector was given for.
        kind: &'static str,
        /// The offending selector, as written in the configuration.
        selector: String,
    },
    /// A selector argument failed to parse or is out of range.
    #[error("Invalid argument in selector {selector:?}: {reason}")]
    BadSelectorArgument {
        /// The offending selector, as written in the configuration.
        selector: String,
        /// What was wrong with the argument.
        reason: String,
    },
    /// A plain option value failed to parse.
    #[error("Option {key:?} has unparseable value {value:?}")]
    BadOptionValue {
        /// The option key.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// A parsed key/value view over the generator section of a world's configuration file.
/// Keys are matched case-insensitively; parsing the file itself happens elsewhere.
#[derive(Clone, Default, Debug)]
pub struct ConfigSection {
    values: HashMap<String, String>,
}

impl ConfigSection {
    /// Constructs an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a section from key/value pairs; later duplicates win.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut section = Self::new();
        for (key, value) in pairs {
            section.set(&key.into(), value);
        }
        section
    }

    /// Sets the value of an option.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_ascii_lowercase(), value.into());
    }

    /// Looks up an option value by its case-insensitive key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_ascii_lowercase()).map(String::as_str)
    }
}

/// A stage selector: a case-insensitive identifier with an optional `:argument` suffix,
/// e.g. `flat:64` or `Constant:plains`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Selector {
    /// The generator identifier, lowercased.
    pub name: String,
    /// The optional argument, verbatim apart from trimming.
    pub arg: Option<String>,
}

impl Selector {
    /// Parses a selector from its configuration spelling.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, arg)) => Self {
                name: name.trim().to_ascii_lowercase(),
                arg: Some(arg.trim().to_string()),
            },
            None => Self {
                name: raw.trim().to_ascii_lowercase(),
                arg: None,
            },
        }
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}:{}", self.name, arg),
            None => f.write_str(&self.name),
        }
    }
}

/// The typed chunk generator configuration assembled from a [`ConfigSection`].
#[derive(Clone, Eq, PartialEq, Debug, SmartDefault)]
pub struct GeneratorConfig {
    /// The world seed driving every pseudorandom stage decision.
    pub seed: i32,
    /// The biome generator selector.
    #[default(Selector::parse("multinoise"))]
    pub biome_gen: Selector,
    /// The terrain height generator selector.
    #[default(Selector::parse("noise"))]
    pub height_gen: Selector,
    /// The terrain composition generator selector.
    #[default(Selector::parse("classic"))]
    pub composition_gen: Selector,
    /// The structure generator selectors, applied in order.
    #[default(_code = "vec![Selector::parse(\"orenests\"), Selector::parse(\"trees\")]")]
    pub structure_gens: Vec<Selector>,
    /// The finish generator selectors, applied in order.
    #[default(_code = "vec![Selector::parse(\"snow\"), Selector::parse(\"tallgrass\")]")]
    pub finish_gens: Vec<Selector>,
}

impl GeneratorConfig {
    /// Reads the recognized options out of the given section, falling back to the defaults for
    /// missing keys. Selector validity is checked later, at pipeline assembly.
    pub fn from_section(section: &ConfigSection) -> Result<Self, InvalidConfig> {
        let mut config = Self::default();
        if let Some(raw) = section.get("seed") {
            config.seed = raw.trim().parse().map_err(|_| InvalidConfig::BadOptionValue {
                key: "seed",
                value: raw.to_string(),
            })?;
        }
        if let Some(raw) = section.get("biome_gen") {
            config.biome_gen = Selector::parse(raw);
        }
        if let Some(raw) = section.get("height_gen") {
            config.height_gen = Selector::parse(raw);
        }
        if let Some(raw) = section.get("composition_gen") {
            config.composition_gen = Selector::parse(raw);
        }
        if let Some(raw) = section.get("structures") {
            config.structure_gens = parse_selector_list(raw);
        }
        if let Some(raw) = section.get("finishers") {
            config.finish_gens = parse_selector_list(raw);
        }
        Ok(config)
    }
}

/// Parses a comma-separated, whitespace-trimmed selector list; empty entries are dropped.
fn parse_selector_list(raw: &str) -> Vec<Selector> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Selector::parse)
        .collect()
}
