//! Plan-then-run update workflows.
//!
//! An [`UpdateProcedure`] says what would change and how to apply it; an
//! [`UpdateRunner`] drives it through plan, optional confirmation and run,
//! rendering previews, reports and progress on an [`Output`]. The
//! [`catalog`] module provides the Gradle version catalog procedure used by
//! the `uprun` binary.

pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;
pub mod source;

pub use error::{PromptError, UpdateError, UpdateErrors};
pub use output::{Output, SharedBuffer, SharedWriter};
pub use runner::{
    AutoConfirm, AutoDecline, Prompt, ProgressScope, RunContext, TerminalPrompt, UpdateProcedure,
    UpdateRunner, UpdateRunnerBuilder,
};
