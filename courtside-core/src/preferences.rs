//! User display preferences kept in the persistent store.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ports::{KeyValueStore, StoreError};

/// Storage key holding the serialized preferences.
pub const PREFERENCES_KEY: &str = "preferences";

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English.
    #[default]
    English,
    /// Traditional Chinese.
    TraditionalChinese,
}

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Follow the operating system.
    #[default]
    System,
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
}

/// Persisted preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Interface language.
    pub language: Language,
    /// Colour theme.
    pub theme: Theme,
}

impl Preferences {
    /// Load preferences, falling back to defaults when absent or unreadable.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Ignoring malformed preferences: {err}");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("Could not read preferences: {err}");
                Self::default()
            }
        }
    }

    /// Persist the preferences.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(self)?;
        store.set(PREFERENCES_KEY, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rstest::rstest;

    #[rstest]
    fn defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[rstest]
    fn round_trips_through_store() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            language: Language::TraditionalChinese,
            theme: Theme::Dark,
        };
        prefs.save(&store).expect("save");
        assert_eq!(Preferences::load(&store), prefs);
    }

    #[rstest]
    #[case("not json", Preferences::default())]
    #[case(
        r#"{ "theme": "light" }"#,
        Preferences { language: Language::English, theme: Theme::Light }
    )]
    fn tolerates_partial_or_broken_values(#[case] raw: &str, #[case] expected: Preferences) {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, raw).expect("write");
        assert_eq!(Preferences::load(&store), expected);
    }
}
