pub mod activity;
pub mod branches;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod github;
pub mod model;
pub mod report;
pub mod week;
