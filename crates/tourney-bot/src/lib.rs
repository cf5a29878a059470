//! Tourney Bot - the command layer in front of the tournament registry.
//!
//! # Modules
//!
//! - [`facade`] - serialized, write-through access to the registry
//! - [`command`] - parsing of `!`-prefixed text commands
//! - [`dispatch`] - routes parsed commands and renders plain-text replies
//! - [`auto_role`] - recurring role-assignment job with start/stop lifecycle
//! - [`member`] - member display lookup supplied by the platform adapter
//! - [`config`] - TOML configuration loading

pub mod auto_role;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod facade;
pub mod member;
