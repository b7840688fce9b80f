mod configuration;
mod diagnostics;
mod error;
mod image;
