pub mod config;
pub mod content;
pub mod filters;
pub mod handlers;
pub mod paths;
pub mod state;
