use std::collections::BTreeMap;

/// Immutable hero id -> localized name lookup, built once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroDirectory {
    names: BTreeMap<i32, String>,
}

impl HeroDirectory {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        HeroDirectory {
            names: entries
                .into_iter()
                .map(|(id, name)| (id, name.into()))
                .collect(),
        }
    }

    /// Localized name, or `Hero {id}` when the id is unknown.
    pub fn name(&self, hero_id: i32) -> String {
        self.names
            .get(&hero_id)
            .cloned()
            .unwrap_or_else(|| format!("Hero {}", hero_id))
    }

    pub fn get(&self, hero_id: i32) -> Option<&str> {
        self.names.get(&hero_id).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<i32, String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_for_unknown_heroes() {
        let heroes = HeroDirectory::new([(1, "Anti-Mage"), (2, "Axe")]);
        assert_eq!(heroes.name(2), "Axe");
        assert_eq!(heroes.name(138), "Hero 138");
        assert_eq!(heroes.get(138), None);
    }
}
