//! Unit tests for biograph-cli, organized by module.
//!
//! Each submodule documents the behaviour under test.
