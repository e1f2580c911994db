use thiserror::Error;

pub mod advisors;
pub mod app_config;
pub mod assignment;
mod config;
pub mod links;
pub mod products;

pub use advisors::{normalize_number, AdvisorRecord, Roster, RosterError};
pub use app_config::{AppConfig, Environment};
pub use assignment::{
    resolve_assignment, Assignment, AssignmentSource, AssignmentStore, DirectoryProvider,
    IndexPicker, UniformPicker, STICKY_STORE_KEY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use links::{
    contact_message, product_share_message, show_price_param, whatsapp_contact_url,
    whatsapp_share_url, ShareLink,
};
pub use products::{validate_product_input, Brand, BrandRef, Product, ProductError, ProductSpecs};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
