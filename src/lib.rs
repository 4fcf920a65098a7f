pub mod account;
pub mod cli;
pub mod collab;
pub mod config;
pub mod error;
pub mod feed;
pub mod notifications;
pub mod service;
pub mod session;
pub mod storage;
