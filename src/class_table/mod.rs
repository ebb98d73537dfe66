//! Class hierarchy construction and the resulting class table.
//!
//! [`builder::build`] registers the built-in classes, validates the
//! inheritance graph of a parsed program and flattens every class's
//! attributes and methods into a [`class_table::ClassTable`].

pub mod builder;
pub mod class_table;

#[cfg(test)]
mod tests;
