//! # Aion IR
//!
//! This crate defines the intermediate representation consumed by the aion
//! optimization diagnostic engine: a small typed IR laid out as modules of
//! functions, functions of basic blocks, and blocks of instructions, together
//! with a textual format, a parser, a stable printer and a structural
//! verifier.
//!
//! ## Architecture
//!
//! ```text
//! Module
//!   functions: IndexVec<FunctionId, Function>
//!   function_names: Map<String, FunctionId>
//!
//! Function
//!   blocks: IndexVec<BlockId, Block>
//!   params, linkage, attributes
//!
//! Block
//!   instructions: Vec<Instruction>   // last instruction is the terminator
//! ```
//!
//! Every module is parsed into a fresh [`Context`]. The context owns the
//! diagnostic channel: pass pipelines report optimization remarks and
//! resource notices through [`Context::emit`], and an installed
//! [`DiagnosticHandler`] may claim them before they reach the default
//! handler.
//!
//! The printed form of an instruction ([`Instruction`]'s `Display` impl) is
//! stable and is used by the structural differ as its alignment key.

pub use block::Block;
pub use context::Context;
pub use diag::{
    Diagnostic, DiagnosticArgument, DiagnosticHandler, DiagnosticKind, OptDiagnostic,
    ResourceDiagnostic,
};
pub use function::{Function, Linkage, Param};
pub use instruction::{BinOp, DebugLoc, IcmpPred, Instruction, Opcode};
pub use module::Module;
pub use parser::{parse_module, parse_module_file};
pub use types::Type;
pub use value::Value;
pub use verifier::verify_module;

pub mod block;
pub mod context;
pub mod diag;
pub mod function;
pub mod instruction;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod types;
pub mod value;
pub mod verifier;

use thiserror::Error;

// --- Core Identifiers ---

index_vec::define_index_type! {
    /// Unique identifier for a function within a module
    pub struct FunctionId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a basic block within a function
    pub struct BlockId = usize;
}

// --- Error Types ---

/// An error produced while reading or parsing textual IR
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input file could not be opened or read
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The input text is not well-formed IR
    #[error("{file}:{line}:{column}: {message}")]
    Syntax {
        file: String,
        line: u32,
        column: u32,
        message: String,
    },
}

/// A structural verification failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("verification of '@{function}' failed: {message}")]
pub struct VerifyError {
    pub function: String,
    pub message: String,
}

/// Result type for IR parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

// --- Pretty Printing Support ---

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Helper function to create indentation
pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}
