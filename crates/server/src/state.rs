use std::sync::Arc;

use docvault_core::{
    CallerAuthenticator, Config, IngestionOrchestrator, ListingOrchestrator, MetadataIndex,
    Principal, RepositoryGateway, RetrievalOrchestrator, SanitizedConfig, TicketProvider,
    TicketSource,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn CallerAuthenticator>,
    ticket_provider: Arc<dyn TicketProvider>,
    ingestion: IngestionOrchestrator,
    retrieval: RetrievalOrchestrator,
    listing: ListingOrchestrator,
}

impl AppState {
    /// Wire the orchestrators over the given collaborators. Every
    /// orchestrator requests its tickets for the configured principal.
    pub fn new(
        config: Config,
        authenticator: Arc<dyn CallerAuthenticator>,
        ticket_provider: Arc<dyn TicketProvider>,
        repository: Arc<dyn RepositoryGateway>,
        index: Arc<dyn MetadataIndex>,
    ) -> Self {
        let tickets = TicketSource::new(
            Arc::clone(&ticket_provider),
            Principal::from(&config.principal),
        );

        let ingestion = IngestionOrchestrator::new(
            tickets.clone(),
            Arc::clone(&repository),
            Arc::clone(&index),
            config.ingestion.clone(),
        );
        let retrieval =
            RetrievalOrchestrator::new(tickets.clone(), Arc::clone(&repository), index);
        let listing = ListingOrchestrator::new(tickets, repository);

        Self {
            config,
            authenticator,
            ticket_provider,
            ingestion,
            retrieval,
            listing,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn CallerAuthenticator {
        self.authenticator.as_ref()
    }

    pub fn ticket_provider(&self) -> &dyn TicketProvider {
        self.ticket_provider.as_ref()
    }

    pub fn ingestion(&self) -> &IngestionOrchestrator {
        &self.ingestion
    }

    pub fn retrieval(&self) -> &RetrievalOrchestrator {
        &self.retrieval
    }

    pub fn listing(&self) -> &ListingOrchestrator {
        &self.listing
    }
}
