pub mod cli;
pub mod config;
pub mod console;
pub mod grading;
pub mod logging;
pub mod records;
pub mod session;
pub mod store;
pub mod view;
