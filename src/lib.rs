pub mod cache;
pub mod check;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod photo;
pub mod session;
pub mod source;
pub mod writer;
