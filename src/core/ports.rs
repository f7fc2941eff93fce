pub mod code_host;
pub mod notifier;
pub mod repository;
