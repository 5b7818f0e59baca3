//! Registry for the data providers of each sport.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::SportType;
use crate::ports::{DataProvider, PortError};

/// Registry that resolves providers by sport type.
pub struct ProviderRegistry {
    providers: BTreeMap<SportType, Arc<dyn DataProvider>>,
}

impl ProviderRegistry {
    /// Build a registry from the provided list; a later provider for the same
    /// sport replaces an earlier one.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn DataProvider>>) -> Self {
        let providers_map = providers
            .into_iter()
            .map(|provider| (provider.sport(), provider))
            .collect();
        Self {
            providers: providers_map,
        }
    }

    /// Sports with a registered provider, in display order.
    #[must_use]
    pub fn sports(&self) -> Vec<SportType> {
        self.providers.keys().copied().collect()
    }

    /// Look up the provider for the given sport.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSport`] when no provider is registered.
    pub fn provider(&self, sport: SportType) -> Result<&Arc<dyn DataProvider>, PortError> {
        self.providers
            .get(&sport)
            .ok_or(PortError::UnsupportedSport(sport))
    }
}
