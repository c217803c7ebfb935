pub mod app;
pub mod carousel;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod filter;
pub mod gallery;
pub mod output;
pub mod probe;
pub mod runner;
pub mod session;
pub mod utils;

#[cfg(test)]
mod tests;
