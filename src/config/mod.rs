mod hub_config;

#[cfg(test)]
pub use hub_config::DEFAULT_ADMIN_SECRET;
pub use hub_config::{HubConfig, HubConfigError};
