pub mod api;
pub mod app;
pub mod config;
pub mod editor;
pub mod format;
pub mod headless;
pub mod init;
pub mod language;
pub mod query;
pub mod syntax;
pub mod ui;
