pub mod applier;
pub mod configuration;

pub use applier::Applier;
pub use configuration::Configuration;
