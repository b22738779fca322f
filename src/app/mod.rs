pub mod bootstrap;

pub use bootstrap::{resolve_config, run};
