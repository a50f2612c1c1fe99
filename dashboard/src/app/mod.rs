//! Command line application

pub mod args;
pub mod commands;
pub mod options;
pub mod run;
pub mod state;
