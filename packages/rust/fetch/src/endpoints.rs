//! URL construction for each site, keyed by deck id.

use kfdeck_shared::{DeckId, DeckLinks, SourcesConfig};

/// Base URLs of the three sites, without trailing slashes.
#[derive(Debug, Clone)]
pub struct Endpoints {
    compendium: String,
    dok: String,
    kfg: String,
}

impl Endpoints {
    pub fn new(sources: &SourcesConfig) -> Self {
        Self {
            compendium: trim_base(&sources.compendium_base),
            dok: trim_base(&sources.dok_base),
            kfg: trim_base(&sources.kfg_base),
        }
    }

    /// KeyForge Compendium deck page (HTML).
    pub fn compendium_page(&self, id: &DeckId) -> String {
        format!("{}/decks/{id}", self.compendium)
    }

    /// Decks of KeyForge simple deck API (JSON).
    pub fn dok_api(&self, id: &DeckId) -> String {
        format!("{}/api/decks/{id}/simple", self.dok)
    }

    /// Decks of KeyForge deck page.
    pub fn dok_page(&self, id: &DeckId) -> String {
        format!("{}/decks/{id}", self.dok)
    }

    /// Official deck API with linked cards (JSON).
    pub fn kfg_api(&self, id: &DeckId) -> String {
        format!("{}/api/decks/{id}/?links=cards", self.kfg)
    }

    /// Official deck page.
    pub fn kfg_page(&self, id: &DeckId) -> String {
        format!("{}/deck-details/{id}", self.kfg)
    }

    /// Human-facing links for all three sites.
    pub fn links(&self, id: &DeckId) -> DeckLinks {
        DeckLinks {
            keyforge_game: self.kfg_page(id),
            compendium: self.compendium_page(id),
            decks_of_keyforge: self.dok_page(id),
        }
    }
}

fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> DeckId {
        "2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a".parse().unwrap()
    }

    #[test]
    fn default_endpoints() {
        let endpoints = Endpoints::new(&SourcesConfig::default());
        assert_eq!(
            endpoints.dok_api(&id()),
            "https://decksofkeyforge.com/api/decks/2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a/simple"
        );
        assert_eq!(
            endpoints.kfg_api(&id()),
            "https://www.keyforgegame.com/api/decks/2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a/?links=cards"
        );
        assert_eq!(
            endpoints.compendium_page(&id()),
            "https://keyforge-compendium.com/decks/2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a"
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let sources = SourcesConfig {
            kfg_base: "http://localhost:9000/".into(),
            ..SourcesConfig::default()
        };
        let endpoints = Endpoints::new(&sources);
        assert_eq!(
            endpoints.kfg_page(&id()),
            "http://localhost:9000/deck-details/2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a"
        );
    }
}
