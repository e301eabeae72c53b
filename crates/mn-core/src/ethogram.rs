//! Ethogram configuration: the static table of categories bound to keys.
//!
//! An [`Ethogram`] is built once at startup (from a [`Preset`] or a
//! user-supplied [`EthogramTable`]) and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key that finalizes the recording.
pub const QUIT_KEY: char = 'q';

/// Key that toggles pause/resume.
pub const PAUSE_KEY: char = ' ';

/// Validation errors for ethogram configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EthogramError {
    /// The ethogram has no categories.
    #[error("ethogram must define at least one category")]
    Empty,

    /// A category key was not exactly one character.
    #[error("category key must be a single character, got {value:?}")]
    InvalidKey { value: String },

    /// A category key collides with a control key.
    #[error("key {key:?} is reserved for {purpose}")]
    ReservedKey { key: char, purpose: &'static str },

    /// Two categories share the same key.
    #[error("duplicate category key {key:?}")]
    DuplicateKey { key: char },

    /// The default or initial category is not part of the table.
    #[error("{role} category {key:?} is not defined")]
    UnknownCategory { role: &'static str, key: char },

    /// A color was not of the form `#RRGGBB`.
    #[error("invalid color {value:?}, expected #RRGGBB")]
    InvalidColor { value: String },

    /// A category label was blank.
    #[error("category {key:?} has an empty label")]
    EmptyLabel { key: char },

    /// No built-in ethogram has this name.
    #[error("unknown ethogram preset: {name}")]
    UnknownPreset { name: String },
}

/// The single character bound to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryKey(char);

impl CategoryKey {
    /// Wraps a character. Membership in an ethogram is checked by [`Ethogram`].
    pub const fn new(key: char) -> Self {
        Self(key)
    }

    /// Returns the bound character.
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryKey {
    type Err = EthogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self(c)),
            _ => Err(EthogramError::InvalidKey {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for CategoryKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.encode_utf8(&mut [0; 4]))
    }
}

impl<'de> Deserialize<'de> for CategoryKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A display color in 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = EthogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EthogramError::InvalidColor {
            value: s.to_string(),
        };
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel =
            |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One behavioral or spatial classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub label: String,
    pub color: Color,
}

/// Unvalidated ethogram description, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthogramTable {
    /// Categories in summary order.
    pub categories: Vec<Category>,
    /// Fallback for unrecognized keys.
    pub default: CategoryKey,
    /// Category active when recording starts. Defaults to `default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<CategoryKey>,
}

/// A validated, immutable category table.
///
/// Category order is the order used for summaries and charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ethogram {
    categories: Vec<Category>,
    default: CategoryKey,
    initial: CategoryKey,
}

impl Ethogram {
    /// Validates a table into an ethogram.
    pub fn new(table: EthogramTable) -> Result<Self, EthogramError> {
        let EthogramTable {
            categories,
            default,
            initial,
        } = table;

        if categories.is_empty() {
            return Err(EthogramError::Empty);
        }

        for (i, category) in categories.iter().enumerate() {
            let key = category.key.as_char();
            if key == QUIT_KEY {
                return Err(EthogramError::ReservedKey {
                    key,
                    purpose: "quit",
                });
            }
            if key == PAUSE_KEY {
                return Err(EthogramError::ReservedKey {
                    key,
                    purpose: "pause",
                });
            }
            if category.label.trim().is_empty() {
                return Err(EthogramError::EmptyLabel { key });
            }
            if categories[..i].iter().any(|c| c.key == category.key) {
                return Err(EthogramError::DuplicateKey { key });
            }
        }

        let initial = initial.unwrap_or(default);
        for (role, key) in [("default", default), ("initial", initial)] {
            if !categories.iter().any(|c| c.key == key) {
                return Err(EthogramError::UnknownCategory {
                    role,
                    key: key.as_char(),
                });
            }
        }

        Ok(Self {
            categories,
            default,
            initial,
        })
    }

    /// Categories in summary order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The fallback category for unrecognized keys.
    pub const fn default_key(&self) -> CategoryKey {
        self.default
    }

    /// The category active at recording start.
    pub const fn initial_key(&self) -> CategoryKey {
        self.initial
    }

    /// Looks up a category by key.
    pub fn get(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: CategoryKey) -> bool {
        self.get(key).is_some()
    }

    /// Label for a key, falling back to the key itself for non-members.
    pub fn label(&self, key: CategoryKey) -> String {
        self.get(key)
            .map_or_else(|| key.to_string(), |c| c.label.clone())
    }

    /// Maps a raw key to a member category.
    ///
    /// Returns the resolved key and whether the default was substituted.
    pub fn resolve(&self, key: char) -> (CategoryKey, bool) {
        let key = CategoryKey::new(key);
        if self.contains(key) {
            (key, false)
        } else {
            (self.default, true)
        }
    }
}

/// Built-in ethograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Two mice in a cage, one unconscious.
    Mice,
    /// Single animal in a home cage.
    HomeCage,
    /// Two- or three-chamber apparatus location.
    TwoChamber,
}

type PresetRow = (char, &'static str, Color);

const MICE: &[PresetRow] = &[
    ('a', "Allogrooming", Color::rgb(0x00, 0x00, 0xE6)),
    ('r', "Rearing/Climbing", Color::rgb(0xFF, 0x00, 0x00)),
    ('b', "Burrowing", Color::rgb(0xFF, 0x66, 0x66)),
    ('m', "Pulling/Aggressive", Color::rgb(0xFF, 0x66, 0x33)),
    ('g', "Grooming", Color::rgb(0xFF, 0x80, 0x00)),
    ('f', "Fluffing own nest", Color::rgb(0xFF, 0xCC, 0x00)),
    ('o', "Other", Color::rgb(0xA6, 0xA6, 0xA6)),
    ('d', "Digging near mouse", Color::rgb(0x00, 0xCC, 0x44)),
    ('s', "Side-by-Side", Color::rgb(0x6A, 0x5A, 0xCD)),
    ('n', "Nesting", Color::rgb(0x00, 0xB3, 0xB3)),
    ('w', "Withdrawal/Attention", Color::rgb(0x7F, 0xFF, 0xD4)),
];

const HOME_CAGE: &[PresetRow] = &[
    ('a', "Allogrooming", Color::rgb(0x00, 0x00, 0xE6)),
    ('r', "Rearing", Color::rgb(0xFF, 0x00, 0x00)),
    ('b', "Burrowing", Color::rgb(0xFF, 0x66, 0x66)),
    ('c', "Climbing", Color::rgb(0xFF, 0x66, 0x33)),
    ('g', "Grooming", Color::rgb(0xFF, 0x80, 0x00)),
    ('o', "Other", Color::rgb(0xA6, 0xA6, 0xA6)),
    ('s', "Sitting", Color::rgb(0x6A, 0x5A, 0xCD)),
    ('n', "Nesting", Color::rgb(0x00, 0xB3, 0xB3)),
];

const TWO_CHAMBER: &[PresetRow] = &[
    ('l', "Left Chamber", Color::rgb(0x00, 0xCC, 0x44)),
    ('c', "Center", Color::rgb(0xFF, 0x80, 0x00)),
    ('r', "Right Chamber", Color::rgb(0x00, 0xB3, 0xB3)),
    ('o', "Other", Color::rgb(0xA6, 0xA6, 0xA6)),
];

impl Preset {
    pub const ALL: [Self; 3] = [Self::Mice, Self::HomeCage, Self::TwoChamber];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mice => "mice",
            Self::HomeCage => "home-cage",
            Self::TwoChamber => "two-chamber",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Mice => "two mice in a cage",
            Self::HomeCage => "single animal in a home cage",
            Self::TwoChamber => "chamber location in a two/three chamber apparatus",
        }
    }

    /// Builds the preset's ethogram.
    pub fn ethogram(self) -> Ethogram {
        let (rows, initial) = match self {
            Self::Mice => (MICE, 'o'),
            Self::HomeCage => (HOME_CAGE, 'o'),
            Self::TwoChamber => (TWO_CHAMBER, 'c'),
        };
        let categories = rows
            .iter()
            .map(|&(key, label, color)| Category {
                key: CategoryKey::new(key),
                label: label.to_string(),
                color,
            })
            .collect();

        // Preset tables are fixed and covered by tests, so skip validation.
        Ethogram {
            categories,
            default: CategoryKey::new('o'),
            initial: CategoryKey::new(initial),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = EthogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| EthogramError::UnknownPreset {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(key: char, label: &str) -> Category {
        Category {
            key: CategoryKey::new(key),
            label: label.to_string(),
            color: Color::rgb(0x11, 0x22, 0x33),
        }
    }

    fn table(keys: &[char], default: char) -> EthogramTable {
        EthogramTable {
            categories: keys.iter().map(|&k| category(k, "Label")).collect(),
            default: CategoryKey::new(default),
            initial: None,
        }
    }

    #[test]
    fn presets_pass_validation() {
        for preset in Preset::ALL {
            let ethogram = preset.ethogram();
            let rebuilt = Ethogram::new(EthogramTable {
                categories: ethogram.categories().to_vec(),
                default: ethogram.default_key(),
                initial: Some(ethogram.initial_key()),
            });
            assert_eq!(rebuilt, Ok(ethogram), "preset {preset} is invalid");
        }
    }

    #[test]
    fn two_chamber_starts_in_center_but_falls_back_to_other() {
        let ethogram = Preset::TwoChamber.ethogram();
        assert_eq!(ethogram.initial_key(), CategoryKey::new('c'));
        assert_eq!(ethogram.default_key(), CategoryKey::new('o'));
    }

    #[test]
    fn initial_defaults_to_default() {
        let ethogram = Ethogram::new(table(&['x', 'o'], 'o')).unwrap();
        assert_eq!(ethogram.initial_key(), CategoryKey::new('o'));
    }

    #[test]
    fn rejects_empty_table() {
        let result = Ethogram::new(table(&[], 'o'));
        assert_eq!(result, Err(EthogramError::Empty));
    }

    #[test]
    fn rejects_control_keys() {
        assert_eq!(
            Ethogram::new(table(&['q', 'o'], 'o')),
            Err(EthogramError::ReservedKey {
                key: 'q',
                purpose: "quit"
            })
        );
        assert_eq!(
            Ethogram::new(table(&[' ', 'o'], 'o')),
            Err(EthogramError::ReservedKey {
                key: ' ',
                purpose: "pause"
            })
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        assert_eq!(
            Ethogram::new(table(&['a', 'o', 'a'], 'o')),
            Err(EthogramError::DuplicateKey { key: 'a' })
        );
    }

    #[test]
    fn rejects_unknown_default_and_initial() {
        assert_eq!(
            Ethogram::new(table(&['a'], 'o')),
            Err(EthogramError::UnknownCategory {
                role: "default",
                key: 'o'
            })
        );

        let mut t = table(&['a', 'o'], 'o');
        t.initial = Some(CategoryKey::new('z'));
        assert_eq!(
            Ethogram::new(t),
            Err(EthogramError::UnknownCategory {
                role: "initial",
                key: 'z'
            })
        );
    }

    #[test]
    fn rejects_blank_label() {
        let mut t = table(&['a', 'o'], 'o');
        t.categories[0].label = "  ".to_string();
        assert_eq!(Ethogram::new(t), Err(EthogramError::EmptyLabel { key: 'a' }));
    }

    #[test]
    fn resolve_substitutes_default_for_unknown_keys() {
        let ethogram = Preset::Mice.ethogram();
        assert_eq!(ethogram.resolve('g'), (CategoryKey::new('g'), false));
        assert_eq!(ethogram.resolve('z'), (CategoryKey::new('o'), true));
    }

    #[test]
    fn color_parses_and_displays_hex() {
        let color: Color = "#7fffd4".parse().unwrap();
        assert_eq!(color, Color::rgb(0x7F, 0xFF, 0xD4));
        assert_eq!(color.to_string(), "#7FFFD4");
        assert!("7FFFD4".parse::<Color>().is_err());
        assert!("#7FFFD".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn category_key_rejects_multiple_chars() {
        assert!("ab".parse::<CategoryKey>().is_err());
        assert!("".parse::<CategoryKey>().is_err());
        assert_eq!("a".parse::<CategoryKey>().unwrap(), CategoryKey::new('a'));
    }

    #[test]
    fn table_deserializes_from_json() {
        let json = r##"{
            "categories": [
                {"key": "l", "label": "Left", "color": "#00CC44"},
                {"key": "o", "label": "Other", "color": "#A6A6A6"}
            ],
            "default": "o"
        }"##;
        let table: EthogramTable = serde_json::from_str(json).unwrap();
        let ethogram = Ethogram::new(table).unwrap();
        assert_eq!(ethogram.label(CategoryKey::new('l')), "Left");
        assert_eq!(ethogram.initial_key(), CategoryKey::new('o'));
    }

    #[test]
    fn preset_names_roundtrip() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        let err = "rats".parse::<Preset>().unwrap_err();
        assert_eq!(err.to_string(), "unknown ethogram preset: rats");
    }
}
