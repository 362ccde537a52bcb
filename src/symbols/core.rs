use std::collections::BTreeMap;

/// Glyph used when a type string is empty.
pub const UNKNOWN_GLYPH: char = '?';

const DEFAULT_SYMBOLS: &[(&str, char)] = &[
    ("hvac", 'H'),
    ("electrical", 'E'),
    ("lighting", 'L'),
    ("fire", 'F'),
    ("fire_safety", 'F'),
    ("plumbing", 'P'),
    ("panel", 'P'),
    ("outlet", 'O'),
    ("switch", 'S'),
    ("sensor", 'S'),
    ("camera", 'C'),
    ("generic", '•'),
];

/// Case-insensitive mapping from equipment type to display glyph.
///
/// Owned per renderer/session; overrides never leak between registries.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    entries: BTreeMap<String, char>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    /// Registry seeded with the building-systems defaults.
    pub fn new() -> Self {
        let entries = DEFAULT_SYMBOLS
            .iter()
            .map(|(kind, glyph)| (kind.to_string(), *glyph))
            .collect();
        Self { entries }
    }

    /// Registry without any mappings; everything resolves through the fallback.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn set_symbol(&mut self, type_name: &str, glyph: char) {
        self.entries.insert(normalize(type_name), glyph);
    }

    pub fn resolve(&self, type_name: &str) -> char {
        if let Some(glyph) = self.entries.get(&normalize(type_name)) {
            return *glyph;
        }
        fallback_glyph(type_name)
    }

    pub fn is_mapped(&self, type_name: &str) -> bool {
        self.entries.contains_key(&normalize(type_name))
    }

    /// Known `(glyph, type)` pairs ordered by type name.
    pub fn legend(&self) -> Vec<(char, &str)> {
        self.entries
            .iter()
            .map(|(kind, glyph)| (*glyph, kind.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(type_name: &str) -> String {
    type_name.to_lowercase()
}

/// Upper-cased first character, or `?` for an empty type.
pub fn fallback_glyph(type_name: &str) -> char {
    type_name
        .chars()
        .next()
        .map(|first| first.to_uppercase().next().unwrap_or(first))
        .unwrap_or(UNKNOWN_GLYPH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_case_insensitively() {
        let registry = SymbolRegistry::new();
        assert_eq!(registry.resolve("hvac"), 'H');
        assert_eq!(registry.resolve("HVAC"), 'H');
        assert_eq!(registry.resolve("Panel"), 'P');
        assert_eq!(registry.resolve("generic"), '•');
    }

    #[test]
    fn unmapped_types_use_upper_cased_first_char() {
        let registry = SymbolRegistry::new();
        assert_eq!(registry.resolve("damper"), 'D');
        assert_eq!(registry.resolve("x-ray"), 'X');
        assert_eq!(registry.resolve("élévateur"), 'É');
        assert_eq!(registry.resolve("42u-rack"), '4');
    }

    #[test]
    fn empty_type_resolves_to_question_mark() {
        assert_eq!(SymbolRegistry::new().resolve(""), '?');
        assert_eq!(SymbolRegistry::empty().resolve(""), '?');
    }

    #[test]
    fn overrides_are_case_insensitive_and_persist() {
        let mut registry = SymbolRegistry::new();
        registry.set_symbol("HVAC", 'A');
        registry.set_symbol("Damper", 'd');
        assert_eq!(registry.resolve("hvac"), 'A');
        assert_eq!(registry.resolve("hVaC"), 'A');
        assert_eq!(registry.resolve("DAMPER"), 'd');
        assert_eq!(registry.resolve("damper"), 'd');
    }

    #[test]
    fn registries_do_not_share_overrides() {
        let mut first = SymbolRegistry::new();
        let second = SymbolRegistry::new();
        first.set_symbol("hvac", 'Z');
        assert_eq!(first.resolve("hvac"), 'Z');
        assert_eq!(second.resolve("hvac"), 'H');
    }

    #[test]
    fn legend_is_sorted_by_type() {
        let registry = SymbolRegistry::new();
        let legend = registry.legend();
        assert_eq!(legend.len(), registry.len());
        assert_eq!(legend[0], ('C', "camera"));
        let kinds: Vec<&str> = legend.iter().map(|(_, kind)| *kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }
}
