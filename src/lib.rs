//! # Virtual barrels
//!
//! Folders without an `index.ts` get a synthesized barrel: an aggregator
//! module re-exporting every named export of the folder's files. During a
//! build the barrel only exists in memory and every import of it is
//! rewritten into direct imports of the files it re-exports, so the emitted
//! output never depends on it. During an editing session the barrel is
//! served through the host's file system and kept current as files change.
//!
//! ## Pipeline
//!
//! 1. [`exports`] reads the export surface of one module from its syntax.
//! 2. [`barrel`] turns a folder into a printed aggregator plus a manifest of
//!    identifier -> origin file.
//! 3. [`rewriter`] replaces barrel imports with direct imports using the
//!    manifest.
//! 4. [`registry`] tracks which barrels are virtual and when they are stale.
//! 5. [`compiler`] and [`session`] wire the above into the build-time and
//!    interactive hosts by decorating their capabilities.

pub mod barrel;
pub mod compiler;
pub mod diagnostic;
pub mod directory;
pub mod error;
pub mod exports;
pub mod extensions;
pub mod fs;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod rewriter;
pub mod session;
pub mod specifier;
pub mod syntax;
pub mod tasks;
pub mod version;

#[cfg(feature = "napi")]
mod native;

#[cfg(test)]
mod barrel_tests;
#[cfg(test)]
mod options_tests;
#[cfg(test)]
mod rewriter_tests;

pub use barrel::{calculate_barrel, BarrelCalculation, BarrelFile, ExportedEntities};
pub use compiler::{transform_program, BarrelCompilerHost, BarrelProgram, CompilerHost, Program};
pub use diagnostic::{Diagnostic, DiagnosticCache, DiagnosticCategory};
pub use error::{BarrelError, Result};
pub use exports::{exports_of_source, EntityWithIdentifier, ExportedEntity};
pub use fs::{FileSystem, MemoryFileSystem, NodeFileSystem};
pub use options::{CompilerOptions, PluginConfig, ProjectConfig};
pub use registry::BarrelRegistry;
pub use rewriter::{rewrite_imports, RewrittenModule};
pub use session::{BarrelServerHost, BarrelSession, LanguageService, LanguageServiceHost, Project};

#[cfg(feature = "napi")]
pub use native::{calculate_barrel_native, rewrite_imports_native};
