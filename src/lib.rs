pub mod config;
pub mod inspect;
pub mod logging;
pub mod project;
pub mod version;
