pub mod config;
pub mod images;
pub mod server;
pub mod state;
pub mod storage;
pub mod upstream;
