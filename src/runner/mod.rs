// Runner module - the plan-then-run lifecycle shared by every update workflow
//
// Architecture:
// - UpdateProcedure: what a concrete workflow supplies (plan, run, preview, report)
// - UpdateRunner: drives the lifecycle once for any procedure
// - RunContext: what a run procedure may read from its runner (todo, progress)
// - Prompt: yes/no confirmation collaborator
// - ProgressPanel / ProgressScope: scoped progress bar ownership
pub mod progress;
pub mod prompt;

pub use progress::{ProgressPanel, ProgressScope};
pub use prompt::{AutoConfirm, AutoDecline, Prompt, TerminalPrompt};

use crate::error::{PromptError, Result, UpdateError};
use crate::output::Output;
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::fmt;
use tracing::debug;

/// A concrete update workflow.
///
/// Implementors are bound to whatever domain manager they need at
/// construction time. The runner owns the produced todo and outcome.
#[async_trait(?Send)]
pub trait UpdateProcedure {
    /// Pending changes computed by [`plan`](UpdateProcedure::plan).
    type Todo;
    /// What [`run`](UpdateProcedure::run) applied.
    type Outcome;
    /// One failure record inside a plan or run failure.
    type Failure: fmt::Display + fmt::Debug;

    /// Human-readable rendering of `todo`; `None` before any successful plan.
    fn preview(&self, todo: Option<&Self::Todo>) -> String;

    /// Human-readable rendering of `outcome`; `None` before any successful run.
    fn report(&self, outcome: Option<&Self::Outcome>) -> String;

    /// Computes what would change without applying it.
    async fn plan(&mut self) -> Result<Self::Todo, Self::Failure>;

    /// Applies changes.
    async fn run(&mut self, ctx: RunContext<'_, Self>) -> Result<Self::Outcome, Self::Failure>;
}

/// Read access a run procedure has to its runner while it executes.
pub struct RunContext<'a, P: UpdateProcedure + ?Sized> {
    todo: Option<&'a P::Todo>,
    progress: &'a ProgressPanel,
}

impl<'a, P: UpdateProcedure + ?Sized> RunContext<'a, P> {
    /// The latest plan, or [`UpdateError::NotPlanned`].
    pub fn todo(&self) -> Result<&'a P::Todo, P::Failure> {
        self.todo.ok_or(UpdateError::NotPlanned)
    }

    /// See [`UpdateRunner::progress_bar`].
    pub fn progress_bar(&self, total: u64) -> ProgressScope<'a> {
        self.progress.scope(total)
    }

    pub fn progress(&self) -> Option<ProgressBar> {
        self.progress.current()
    }

    pub fn output(&self) -> &'a Output {
        self.progress.output()
    }
}

/// Drives plan → confirm → run for one [`UpdateProcedure`].
pub struct UpdateRunner<P: UpdateProcedure> {
    procedure: P,
    prompt: Box<dyn Prompt>,
    progress: ProgressPanel,
    todo: Option<P::Todo>,
    result: Option<P::Outcome>,
}

impl<P: UpdateProcedure> UpdateRunner<P> {
    /// Runner writing to stdout, asking on the terminal, with progress shown.
    pub fn new(procedure: P) -> Self {
        Self::builder(procedure).build()
    }

    pub fn builder(procedure: P) -> UpdateRunnerBuilder<P> {
        UpdateRunnerBuilder {
            procedure,
            prompt: None,
            output: Output::default(),
            show_progress: true,
        }
    }

    pub fn procedure(&self) -> &P {
        &self.procedure
    }

    pub fn procedure_mut(&mut self) -> &mut P {
        &mut self.procedure
    }

    pub fn output(&self) -> &Output {
        self.progress.output()
    }

    pub fn preview(&self) -> String {
        self.procedure.preview(self.todo.as_ref())
    }

    pub fn report(&self) -> String {
        self.procedure.report(self.result.as_ref())
    }

    /// The bar of the currently open progress scope, if any.
    pub fn progress(&self) -> Option<ProgressBar> {
        self.progress.current()
    }

    pub fn todo(&self) -> Result<&P::Todo, P::Failure> {
        self.todo.as_ref().ok_or(UpdateError::NotPlanned)
    }

    pub fn result(&self) -> Result<&P::Outcome, P::Failure> {
        self.result.as_ref().ok_or(UpdateError::NotRun)
    }

    /// Plans the update and stores the todo, replacing any previous one.
    ///
    /// On failure, including a failure to write the preview, the previous
    /// todo is kept.
    pub async fn plan(&mut self, show_preview: bool) -> Result<&P::Todo, P::Failure> {
        let todo = self.procedure.plan().await?;
        debug!("update planned");

        if show_preview {
            self.progress
                .output()
                .write_line(&self.procedure.preview(Some(&todo)))?;
        }

        Ok(self.todo.insert(todo))
    }

    /// Runs the update and stores its outcome, replacing any previous one.
    /// A report that cannot be written leaves the previous outcome in place.
    ///
    /// A prior plan is not required here; procedures that need one read it
    /// through [`RunContext::todo`].
    pub async fn run(&mut self, show_report: bool) -> Result<&P::Outcome, P::Failure> {
        let ctx = RunContext {
            todo: self.todo.as_ref(),
            progress: &self.progress,
        };
        let outcome = self.procedure.run(ctx).await?;
        debug!("update run completed");

        if show_report {
            self.progress
                .output()
                .write_line(&self.procedure.report(Some(&outcome)))?;
        }

        Ok(self.result.insert(outcome))
    }

    /// Asks the prompt for confirmation; a decline becomes [`UpdateError::Aborted`].
    pub fn confirm(&mut self) -> Result<(), P::Failure> {
        match self.prompt.confirm() {
            Ok(()) => Ok(()),
            Err(PromptError::Declined) => Err(UpdateError::Aborted),
            Err(err) => Err(UpdateError::Prompt(err)),
        }
    }

    /// Opens a progress scope of `total` units, exposed as [`progress`](Self::progress)
    /// until the returned guard is dropped.
    pub fn progress_bar(&self, total: u64) -> ProgressScope<'_> {
        self.progress.scope(total)
    }
}

pub struct UpdateRunnerBuilder<P: UpdateProcedure> {
    procedure: P,
    prompt: Option<Box<dyn Prompt>>,
    output: Output,
    show_progress: bool,
}

impl<P: UpdateProcedure> UpdateRunnerBuilder<P> {
    pub fn prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Without an explicit prompt, a [`TerminalPrompt`] bound to the output is used.
    pub fn build(self) -> UpdateRunner<P> {
        let prompt = self
            .prompt
            .unwrap_or_else(|| Box::new(TerminalPrompt::new(self.output.clone())));

        UpdateRunner {
            procedure: self.procedure,
            prompt,
            progress: ProgressPanel::new(self.output, self.show_progress),
            todo: None,
            result: None,
        }
    }
}
