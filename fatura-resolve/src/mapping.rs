//! Canonical descriptions and the mapping snapshot.

use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

/// A learned original→simplified/category mapping, owned by one account.
/// Created and updated by explicit user action; this core only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionMapping {
    pub original: String,
    pub simplified: String,
    pub category: Option<String>,
    pub account_id: String,
}

/// Canonical form of a raw description, used as the mapping lookup key.
///
/// Case-folds, folds punctuation to spaces, collapses whitespace and strips
/// trailing all-digit store-code tokens. Idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() {
            folded.extend(c.to_lowercase());
        } else {
            folded.push(' ');
        }
    }

    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    // Trailing store codes ("LOJA 0412") are bare digit runs. Drop them all
    // in one pass so a second normalize is a no-op.
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|t| t.chars().all(|c| c.is_ascii_digit()))
    {
        tokens.pop();
    }
    tokens.join(" ")
}

/// Immutable per-run lookup keyed by canonical original description.
///
/// Built once before processing starts (snapshot-at-start): mapping edits
/// made by the surrounding application while an import is in flight are not
/// observed mid-run.
#[derive(Debug, Clone, Default)]
pub struct MappingSnapshot {
    entries: HashMap<String, Resolution>,
}

#[derive(Debug, Clone, PartialEq)]
struct Resolution {
    simplified: String,
    category: Option<String>,
}

impl MappingSnapshot {
    pub fn from_mappings<'a, I>(mappings: I) -> Self
    where
        I: IntoIterator<Item = &'a DescriptionMapping>,
    {
        let mut entries = HashMap::new();
        for m in mappings {
            entries.insert(
                normalize(&m.original),
                Resolution {
                    simplified: m.simplified.clone(),
                    category: m.category.clone(),
                },
            );
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, canonical: &str) -> Option<&Resolution> {
        self.entries.get(canonical)
    }
}

/// Result of resolving one raw description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDescription {
    pub simplified: String,
    pub category: Option<String>,
    pub matched: bool,
}

/// Exact lookup on the canonical form only. No fuzzy or edit-distance
/// matching: an unresolved description passes through with its canonical
/// form and no category, to be mapped later by the user.
pub fn resolve(raw: &str, snapshot: &MappingSnapshot) -> ResolvedDescription {
    let canonical = normalize(raw);
    match snapshot.get(&canonical) {
        Some(res) => ResolvedDescription {
            simplified: res.simplified.clone(),
            category: res.category.clone(),
            matched: true,
        },
        None => {
            trace!("unmapped description: {canonical}");
            ResolvedDescription {
                simplified: canonical,
                category: None,
                matched: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(original: &str, simplified: &str, category: Option<&str>) -> DescriptionMapping {
        DescriptionMapping {
            original: original.to_string(),
            simplified: simplified.to_string(),
            category: category.map(str::to_string),
            account_id: "acc-1".to_string(),
        }
    }

    #[test]
    fn test_normalize_folds_case_space_and_punctuation() {
        assert_eq!(normalize("UBER   TRIP"), "uber trip");
        assert_eq!(normalize("UBER *TRIP"), "uber trip");
        assert_eq!(normalize("  Pão de Açúcar  "), "pão de açúcar");
    }

    #[test]
    fn test_normalize_strips_trailing_store_codes() {
        assert_eq!(normalize("POSTO SHELL 1022"), "posto shell");
        assert_eq!(normalize("LOJA 10 22"), "loja");
        // A bare number is kept rather than normalized to nothing.
        assert_eq!(normalize("1022"), "1022");
        // Digits glued to letters are part of the name.
        assert_eq!(normalize("LOJA22"), "loja22");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "UBER   TRIP",
            "POSTO SHELL 1022",
            "  Pão de Açúcar *123  ",
            "NETFLIX.COM",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_resolve_exact_on_canonical() {
        let mappings = [mapping("uber trip", "Uber", Some("Transport"))];
        let snapshot = MappingSnapshot::from_mappings(&mappings);

        // Raw spacing/case differences do not matter.
        let res = resolve("UBER   TRIP", &snapshot);
        assert!(res.matched);
        assert_eq!(res.simplified, "Uber");
        assert_eq!(res.category.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_resolve_miss_passes_through() {
        let snapshot = MappingSnapshot::default();
        let res = resolve("IFOOD *PEDIDO 9912", &snapshot);
        assert!(!res.matched);
        assert_eq!(res.simplified, "ifood pedido");
        assert_eq!(res.category, None);
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let mappings = [mapping("uber trip", "Uber", Some("Transport"))];
        let snapshot = MappingSnapshot::from_mappings(&mappings);
        // One letter off: stays unmapped rather than guessing.
        assert!(!resolve("UBERX TRIP", &snapshot).matched);
    }

    #[test]
    fn test_snapshot_keys_are_canonicalized() {
        // Mappings saved with raw noise still hit.
        let mappings = [mapping("UBER *TRIP 0412", "Uber", None)];
        let snapshot = MappingSnapshot::from_mappings(&mappings);
        assert!(resolve("uber trip", &snapshot).matched);
    }
}
