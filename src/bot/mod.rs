pub mod commands;
pub mod router;
pub mod poller;
