//! Formsmith - a local-first form builder with JSON form definitions and
//! persisted submissions

pub mod commands;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod render;
pub mod schema;
pub mod shell;
pub mod store;
pub mod workbench;
