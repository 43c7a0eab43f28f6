pub mod assist;
pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod extract;
pub mod generate;
pub mod ledger;
pub mod log;
pub mod plan;
pub mod prompt;
pub mod provider;
pub mod replan;
pub mod session;
pub mod store;
pub mod ux;
pub mod view;
pub mod wire;
