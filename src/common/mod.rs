//! # Common Components
//!
//! Shared utilities used by the library, the CLI and the web server.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration loading and the batch file format
//! - [`image_io`]: image files and buffers ⇄ pixel grids
//! - [`text`]: text ⇄ one-byte-per-character payloads

pub mod config;
pub mod image_io;
pub mod text;
