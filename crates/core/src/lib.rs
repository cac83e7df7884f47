pub mod auth;
pub mod config;
pub mod filetype;
pub mod index;
pub mod metadata;
pub mod metrics;
pub mod orchestrator;
pub mod repository;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, Caller, CallerAuthError, CallerAuthenticator,
    CallerRequest, OpenAccess,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, LoggingConfig, SanitizedConfig,
};
pub use filetype::FileType;
pub use index::{
    IndexError, IndexFilter, IndexRecord, IndexedMetadata, MetadataIndex, SearchQuery,
    SqliteMetadataIndex,
};
pub use metadata::{DocumentMetadata, SubCategory, ValidationError};
pub use orchestrator::{
    BatchEntry, BatchItem, BatchOptions, BatchResult, DocumentError, IngestOptions,
    IngestRequest, IngestionConfig, IngestionOrchestrator, IngestionReceipt,
    ListingOrchestrator, RetrievalOrchestrator, RetrievedDocument, TicketSource,
};
pub use repository::{
    Document, DownloadedFile, HttpRepositoryGateway, ListFilter, RepositoryDocument,
    RepositoryError, RepositoryGateway,
};
pub use ticket::{AuthTicket, Principal, RepositoryTicketProvider, TicketError, TicketProvider};
