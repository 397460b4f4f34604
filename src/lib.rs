pub mod builder;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod deeplink;
pub mod flow;
pub mod quota;
pub mod remote;
pub mod shared;
