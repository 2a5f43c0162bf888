//! One client session: every surface wired to the same service, filters and
//! invalidation coordinator.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;
use crate::remote::{HttpTicketService, TicketService};
use crate::sync::{
    FilterCriteria, FilterState, InvalidationCoordinator, SearchInput, StatsView,
    TicketCollection, TicketCreationController,
};

pub struct DeskSession {
    config: Config,
    service: Arc<dyn TicketService>,
    invalidation: InvalidationCoordinator,
    filters: FilterState,
    search: SearchInput,
    collection: Arc<TicketCollection>,
    stats: Arc<StatsView>,
    creation: TicketCreationController,
}

impl DeskSession {
    /// Build a session against the configured HTTP service.
    pub fn connect(config: Config) -> Result<Self> {
        Self::connect_with_filters(config, FilterCriteria::default())
    }

    pub fn connect_with_filters(config: Config, initial: FilterCriteria) -> Result<Self> {
        let service = HttpTicketService::from_config(&config)?;
        Ok(Self::with_filters(config, Arc::new(service), initial))
    }

    pub fn new(config: Config, service: Arc<dyn TicketService>) -> Self {
        Self::with_filters(config, service, FilterCriteria::default())
    }

    pub fn with_filters(
        config: Config,
        service: Arc<dyn TicketService>,
        initial: FilterCriteria,
    ) -> Self {
        let timeout = config.request_timeout();
        let invalidation = InvalidationCoordinator::new();
        let filters = FilterState::new(initial);
        let search = SearchInput::new(filters.clone(), config.search_debounce());
        let collection = TicketCollection::new(
            Arc::clone(&service),
            filters.clone(),
            invalidation.clone(),
            timeout,
        );
        let stats = StatsView::new(Arc::clone(&service), invalidation.clone(), timeout);
        let creation =
            TicketCreationController::from_config(Arc::clone(&service), invalidation.clone(), &config);

        Self {
            config,
            service,
            invalidation,
            filters,
            search,
            collection,
            stats,
            creation,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &Arc<dyn TicketService> {
        &self.service
    }

    pub fn invalidation(&self) -> &InvalidationCoordinator {
        &self.invalidation
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search(&self) -> &SearchInput {
        &self.search
    }

    pub fn collection(&self) -> &Arc<TicketCollection> {
        &self.collection
    }

    pub fn stats(&self) -> &Arc<StatsView> {
        &self.stats
    }

    pub fn creation(&self) -> &TicketCreationController {
        &self.creation
    }

    /// Start the background synchronizers. They stop when the returned
    /// handle is dropped.
    pub fn start(&self) -> SessionTasks {
        tracing::debug!("starting collection and stats synchronizers");
        SessionTasks {
            handles: vec![self.collection.spawn(), self.stats.spawn()],
        }
    }
}

pub struct SessionTasks {
    handles: Vec<JoinHandle<()>>,
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
