// Configuration loading

pub mod settings;

pub use settings::{LogFormat, Settings};
