//! Maya ASCII scene codec.
//!
//! This crate provides:
//!
//! - **Commands**: `.ma` input split into tokenized [`Command`]s
//! - **Typed values**: `setAttr` payloads decoded into [`ma::AttrValue`]s
//!   (tuples, arrays, matrices, NURBS, poly faces, reference edits)
//! - **Continuations**: repeated `setAttr`s on one attribute merged into a
//!   single record
//! - **Encoding**: every decoded statement written back as MEL
//!
//! # Example
//!
//! ```ignore
//! use mascii_core::ma::parse_str;
//!
//! let doc = parse_str("createNode transform -n \"box\";\n\tsetAttr \".t\" -type \"double3\" 0 1 0;\n")?;
//! assert_eq!(doc.create_nodes().count(), 1);
//! ```

pub mod command;
pub mod error;
pub mod ma;
pub mod options;

// Re-export commonly used types
pub use command::{Command, CommandType};
pub use error::{CommandError, DecodeError, ParseError};
pub use ma::{parse_file, parse_reader, parse_str, Document};
pub use options::ParseOptions;
