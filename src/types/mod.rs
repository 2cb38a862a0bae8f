mod models;
mod provider;

pub use models::*;
pub use provider::Provider;
