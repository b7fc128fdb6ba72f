//! End-to-end tests for dimscrub-xlsx.
//!
//! Each test builds the package it needs with [`common::FixtureBuilder`],
//! reads it with `XlsxReader`, and for the writing tests patches it with
//! `XlsxWriter` and inspects the resulting parts.

mod common;
mod reading;
mod writing;

pub use common::*;
