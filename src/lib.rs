// Library exports for gemlock
pub mod cli;
pub mod config;
pub mod lockfile;
pub mod output;
pub mod ruby;
