//! The badge catalog: named tier badges, named value badges and the anchor
//! logo, each addressed by a path or URL.
//!
//! Which catalog is active is deployment configuration. The built-in default
//! points at the assets `placeholder::generate_placeholders` writes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, ImageSource, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Tier badges by name (bronze, silver, ...)
    pub tiers: BTreeMap<String, String>,
    /// Value badges by name (empathize, ...)
    pub values: BTreeMap<String, String>,
    /// Logo drawn at native size to the left of the badges
    #[serde(default)]
    pub anchor: Option<String>,
    /// Directory or URL that relative entries are resolved against
    #[serde(default)]
    pub base: Option<String>,
}

/// Tier badges: (name, label, colour, file)
pub(crate) const TIER_BADGES: &[(&str, &str, &str, &str)] = &[
    ("bronze", "Bronze", "#CD7F32", "ozpert-bronze.png"),
    ("silver", "Silver", "#C0C0C0", "ozpert-silver.png"),
    ("gold", "Gold", "#FFD700", "ozpert-gold.png"),
    ("diamond", "Diamond", "#B9F2FF", "ozpert-diamond.png"),
];

/// Value badges: (name, label, colour, file)
pub(crate) const VALUE_BADGES: &[(&str, &str, &str, &str)] = &[
    ("bePositive", "Be Positive", "#4CAF50", "be-positive.png"),
    ("empathize", "Empathize", "#2196F3", "empathize.png"),
    ("evolveConstantly", "Evolve Constantly", "#9C27B0", "evolve-constantly.png"),
    ("focusOnOutcome", "Focus on Outcome", "#FF9800", "focus-on-outcome.png"),
    ("succeedAsTeam", "We Succeed as a Team", "#E91E63", "succeed-as-team.png"),
];

pub(crate) const ANCHOR_FILE: &str = "logo.png";

impl Default for Catalog {
    fn default() -> Self {
        let entries = |table: &[(&str, &str, &str, &str)]| {
            table
                .iter()
                .map(|(name, _, _, file)| (name.to_string(), format!("badges/{}", file)))
                .collect()
        };
        Self {
            tiers: entries(TIER_BADGES),
            values: entries(VALUE_BADGES),
            anchor: Some(format!("badges/{}", ANCHOR_FILE)),
            base: None,
        }
    }
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ConfigError(format!("Invalid catalog: {}", e)))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read catalog {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Override the base that relative entries are resolved against.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn tier(&self, name: &str) -> Result<ImageSource> {
        self.lookup(&self.tiers, "tier", name)
    }

    pub fn value(&self, name: &str) -> Result<ImageSource> {
        self.lookup(&self.values, "value", name)
    }

    pub fn anchor(&self) -> Result<ImageSource> {
        let entry = self
            .anchor
            .as_deref()
            .ok_or_else(|| Error::ConfigError("catalog has no anchor logo".into()))?;
        ImageSource::resolve(entry, self.base.as_deref())
    }

    fn lookup(&self, table: &BTreeMap<String, String>, kind: &str, name: &str) -> Result<ImageSource> {
        let entry = table.get(name).ok_or_else(|| {
            let known = table.keys().cloned().collect::<Vec<_>>().join(", ");
            Error::SelectionError(format!("unknown {} badge '{}' (known: {})", kind, name, known))
        })?;
        ImageSource::resolve(entry, self.base.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_catalog_matches_asset_layout() {
        let c = Catalog::default();
        assert_eq!(c.tiers.len(), 4);
        assert_eq!(c.values.len(), 5);
        assert_eq!(
            c.tier("gold").unwrap(),
            ImageSource::File(PathBuf::from("badges/ozpert-gold.png"))
        );
        assert_eq!(
            c.value("succeedAsTeam").unwrap(),
            ImageSource::File(PathBuf::from("badges/succeed-as-team.png"))
        );
    }

    #[test]
    fn unknown_names_are_selection_errors() {
        let c = Catalog::default();
        match c.tier("platinum") {
            Err(Error::SelectionError(msg)) => assert!(msg.contains("bronze")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn json_catalog_with_url_base() {
        let c = Catalog::from_json(
            r#"{"tiers": {"gold": "gold.png"}, "values": {}, "base": "https://cdn.example/badges/"}"#,
        )
        .unwrap();
        assert_eq!(c.tier("gold").unwrap().to_string(), "https://cdn.example/badges/gold.png");
        assert!(matches!(c.anchor(), Err(Error::ConfigError(_))));
        assert!(matches!(Catalog::from_json("{"), Err(Error::ConfigError(_))));
    }
}
