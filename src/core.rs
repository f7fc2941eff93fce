pub mod email;
pub mod lock;
pub mod models;
pub mod ports;
pub mod saga;
pub mod services;
