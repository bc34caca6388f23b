//! Integration tests for the scanning pipeline
//!
//! These tests run settings, token parsing, the detector and output
//! rendering together over in-memory readers and temporary files.

pub mod scan_integration;
