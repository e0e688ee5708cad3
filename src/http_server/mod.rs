pub mod app;
pub mod error;
pub mod rpc;
pub mod state;
