pub mod app;
pub mod appstate;
pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod rate_limit;
pub mod response;
pub mod service;
pub mod state;
