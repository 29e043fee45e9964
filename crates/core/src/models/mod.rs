pub mod asset;
pub mod portfolio;
pub mod settings;
pub mod stats;
