//! Integration tests for node tree building and reading

mod cli_parse;
mod concurrent_readers;
mod multi_package;
mod single_namespace;
mod support;
mod tree_properties;
