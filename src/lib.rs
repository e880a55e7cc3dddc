pub mod app;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod player;
pub mod playlist;
pub mod title_index;
pub mod ui;
