//! Construction of the service graph from configuration.

use std::sync::Arc;
use std::time::Duration;

use trailerforge_common::Result;

use crate::browse::BrowseService;
use crate::cache::ResponseCache;
use crate::catalog::{CatalogClient, LanguageContext, TmdbCatalog};
use crate::config::Config;
use crate::items::ItemBuilder;
use crate::orchestrator::{CategoryOrchestrator, OrchestratorSettings};
use crate::refresh::RefreshScheduler;
use crate::resolver::{ExtractorClient, SiteRouter, StreamResolver};

/// Shared handles to every long-lived component.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<Config>,
    pub cache: Arc<ResponseCache>,
    pub orchestrator: Arc<CategoryOrchestrator>,
    pub browse: Arc<BrowseService>,
}

impl Services {
    /// Wire the TMDB catalog and the configured stream resolver.
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog: Arc<dyn CatalogClient> = Arc::new(TmdbCatalog::new(&config.tmdb)?);

        let youtube: Option<Arc<dyn StreamResolver>> = match &config.resolver.base_url {
            Some(url) => Some(Arc::new(ExtractorClient::new(url)?)),
            None => None,
        };
        let resolver: Arc<dyn StreamResolver> = Arc::new(SiteRouter::new(youtube));

        Ok(Self::with_backends(config, catalog, resolver))
    }

    /// Wire the given catalog and resolver.
    pub fn with_backends(
        config: Config,
        catalog: Arc<dyn CatalogClient>,
        resolver: Arc<dyn StreamResolver>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(config.cache.ttl_secs)));
        let context = LanguageContext::new(config.tmdb.language.clone(), config.tmdb.region.clone());

        let orchestrator = Arc::new(CategoryOrchestrator::new(
            catalog,
            context,
            ItemBuilder::new(resolver, config.resolver.max_bitrate),
            cache.clone(),
            OrchestratorSettings::from_config(&config),
        ));

        let browse = Arc::new(BrowseService::new(
            orchestrator.clone(),
            cache.clone(),
            config.channels.clone(),
        ));

        Self {
            config: Arc::new(config),
            cache,
            orchestrator,
            browse,
        }
    }

    pub fn scheduler(&self) -> Result<RefreshScheduler> {
        RefreshScheduler::new(self.browse.clone(), &self.config.refresh)
    }
}
