//! fixlens Library
//!
//! This crate provides the core of fixlens: discovering source files,
//! detecting common defects, rewriting them deterministically (or through an
//! optional rewrite collaborator), and persisting the result safely.
//!
//! ```rust,no_run
//! use fixlens::config::Config;
//! use fixlens::pipeline::{Pipeline, RunOptions};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), fixlens::FixLensError> {
//! let pipeline = Pipeline::new(&Config::default())?;
//! let result = pipeline
//!     .run(Path::new("src"), RunOptions::default(), None)
//!     .await?;
//! println!("{} issue(s)", result.issues_found.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixes;
pub mod persist;
pub mod pipeline;
pub mod rules;
pub mod scanner;
pub mod utils;

pub use error::FixLensError;
