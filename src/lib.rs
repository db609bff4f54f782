// src/lib.rs

// Library half of the crate: everything the terminal front end in `main.rs`
// drives, usable without a terminal.

pub mod config;
pub mod core;
pub mod export;
pub mod logging;
