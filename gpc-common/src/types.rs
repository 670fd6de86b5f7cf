//! Common types used throughout the compiler

/// Label identifier for code generation
pub type LabelId = u32;

/// Source line number as recorded by the parser (1-based, 0 when unknown)
pub type LineNumber = u32;
