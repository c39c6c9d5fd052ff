pub mod cache;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod util;
pub mod web;
