pub mod config;
pub mod pitch;
pub mod settings;
pub mod song;
