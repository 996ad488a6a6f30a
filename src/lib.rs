// src/lib.rs

//! ips2deb
//!
//! Converts IPS package manifests into Debian package source trees.
//!
//! # Architecture
//!
//! - `manifest`: reads IPS manifests and package FMRIs
//! - `tables`: name-rewrite tables for Replaces, Version and Priority
//! - `convert`: classifies manifests, stages payloads, builds script snippets
//! - `debian`: writes `debian/control`, maintainer scripts and `rules`

pub mod convert;
pub mod debian;
mod error;
pub mod manifest;
pub mod tables;

pub use convert::{convert_all, BatchReport, ConvertOptions};
pub use error::{Error, Result};
