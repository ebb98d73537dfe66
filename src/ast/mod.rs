/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Program, classes and features
/// - expressions: The closed set of expression variants
/// - types: Static types attached by the type checker
/// - display: Renders any node back to source text
pub mod ast;
pub mod display;
pub mod expressions;
pub mod types;
