pub mod api;
pub mod codec;
pub mod config;
pub mod countries;
pub mod models;
pub mod service;
pub mod storage;
