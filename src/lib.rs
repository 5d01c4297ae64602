#![doc = include_str!("../README.md")]
//! Module layout:
//! - [`invocation`] : the author-supplied directive block and option conversion
//! - [`engine`]     : SQL execution capability and the [`rusqlite`] engine
//! - [`table`]      : the generic table structure and column-width resolution
//! - [`directive`]  : the [`SqlTableDirective`] handler and its output nodes
//! - [`error`]      : the directive error taxonomy
//! - [`plugin`]     : registration with the host document generator

pub mod directive;
pub mod engine;
pub mod error;
pub mod invocation;
pub mod plugin;
pub mod table;
pub use directive::SqlTableDirective;
