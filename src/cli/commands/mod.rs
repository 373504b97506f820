pub mod campaign;
pub mod server;
