//! Graft TypeScript annotations onto JavaScript sources.
//!
//! Declarations found in `.d.ts` files next to the sources are collected into
//! one [`SymbolTable`](symbols::SymbolTable); each source is then parsed,
//! annotated by name against that table and written out as TypeScript with
//! its original layout intact. [`convert::convert`] runs the whole pipeline.

pub mod annotate;
pub mod convert;
pub mod discover;
pub mod error;
pub mod parser;
pub mod report;
pub mod symbols;
pub mod syntax;
pub mod types;

pub use convert::{convert, ConversionOptions, Converter, TransformationResult};
pub use error::{ConvertError, FileError};
