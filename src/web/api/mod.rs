pub mod error;
pub mod poller;
