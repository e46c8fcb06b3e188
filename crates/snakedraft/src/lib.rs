// Library root: re-exports all modules so integration tests and the binary
// can reach the application shell.

pub mod app;
pub mod config;
pub mod console;
pub mod protocol;
