pub mod action;
pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod model;
pub mod outputs;
pub mod ranges;
pub mod report;
pub mod source;
pub mod stats;
