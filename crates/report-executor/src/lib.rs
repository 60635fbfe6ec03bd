//! Command building and execution for the JasperStarter reporting engine
//!
//! This crate turns report requests (compile, process, list parameters) into
//! validated engine command lines and runs them as subprocesses, returning the
//! engine's output lines or a structured error.
//!
//! ```no_run
//! use report_executor::{engine, FormatTag, OptionSet, ReportEngine};
//!
//! # async fn example() -> report_executor::Result<()> {
//! let engine = ReportEngine::new(engine::locate(None)?);
//! let options = OptionSet::new()
//!     .formats([FormatTag::Pdf, FormatTag::Xlsx])
//!     .param("date", "2024-01-01");
//! engine.process("/srv/reports/sales.jasper", None, &options).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod command;
pub mod engine;
pub mod error;
pub mod executor;
pub mod format;
pub mod options;
pub mod report;
pub mod user;

pub use builder::{Action, CommandBuilder};
pub use command::Command;
pub use engine::{BundledEngine, EngineLocator, Platform, SearchPathEngine};
pub use error::{Error, Result, TERMINATED_EXIT_CODE};
pub use executor::ProcessExecutor;
pub use format::{FormatTag, validate_formats};
pub use options::{ConnectionKey, OptionSet, ProcessOptions};
pub use report::ReportEngine;
