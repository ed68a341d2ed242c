pub mod config_service;
pub mod dev_identity_provider;
pub mod paths;
pub mod upload_file;

pub use crate::config_service::ConfigService;
pub use crate::dev_identity_provider::DevIdentityProvider;
pub use crate::paths::DocsensePaths;
pub use crate::upload_file::load_upload_file;
