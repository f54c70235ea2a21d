//! Maya ASCII (`.ma`) decoding and encoding.
//!
//! A `.ma` file is a stream of MEL commands terminated by `;`. Decoding runs
//! in file order through these stages:
//!
//! 1. [`assembler`]: input lines to command units
//! 2. [`tokenizer`]: a unit to tokens (quoting, brace lists, concatenation)
//! 3. [`statement`]: tokens to typed commands; `setAttr` values go through
//!    [`types`] and [`decode`] into [`value::AttrValue`]s
//! 4. [`merge`]: `setAttr` continuations folded into the record they extend
//!
//! [`serialize`] writes any decoded value or statement back as MEL.
//!
//! ## Not Supported
//!
//! - `mesh` values (kept as raw tokens and written back unchanged)
//! - `nurbsTrimface` values (same)
//! - Building a node graph from the statements
//!
//! # Example
//!
//! ```ignore
//! use mascii_core::ma::parse_file;
//!
//! let doc = parse_file("scenes/box.ma")?;
//! for record in doc.set_attrs() {
//!     println!("{} {} ({} values)", record.path, record.attr_type, record.values.len());
//! }
//! ```

pub mod assembler;
pub mod cursor;
pub mod decode;
pub mod infer;
pub mod merge;
pub mod parser;
pub mod refedit;
pub mod serialize;
pub mod statement;
pub mod tokenizer;
pub mod types;
pub mod value;

pub use parser::*;
pub use statement::*;
pub use types::AttrType;
pub use value::*;
