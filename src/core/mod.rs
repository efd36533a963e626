pub mod config;
pub mod env;
pub mod error;
pub mod reference;
pub mod skopeo;
