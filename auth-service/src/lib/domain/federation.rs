pub mod errors;
pub mod ports;
pub mod profile;
pub mod reconciler;
