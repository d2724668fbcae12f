use crate::output::Output;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::cell::RefCell;
use std::ops::Deref;

const PROGRESS_TEMPLATE: &str = "  [{bar:40}] {pos}/{len} {msg}";

/// Owns the runner's progress slot and knows where bars are drawn.
///
/// At most one bar is exposed at a time: the innermost open
/// [`ProgressScope`]. The slot is empty outside any scope.
#[derive(Debug)]
pub struct ProgressPanel {
    output: Output,
    show_progress: bool,
    active: RefCell<Option<ProgressBar>>,
}

impl ProgressPanel {
    pub fn new(output: Output, show_progress: bool) -> Self {
        Self {
            output,
            show_progress,
            active: RefCell::new(None),
        }
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    /// Handle to the bar of the currently open scope.
    pub fn current(&self) -> Option<ProgressBar> {
        self.active.borrow().clone()
    }

    /// Opens a progress scope of `total` units.
    ///
    /// The bar is drawn on the configured output when progress is shown and
    /// is hidden otherwise. Dropping the returned scope, on any path, clears
    /// the bar and hands the slot back to the enclosing scope, if any.
    pub fn scope(&self, total: u64) -> ProgressScope<'_> {
        let target = if self.show_progress {
            self.output.draw_target()
        } else {
            ProgressDrawTarget::hidden()
        };

        let bar = ProgressBar::with_draw_target(Some(total), target);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let previous = self.active.replace(Some(bar.clone()));
        ProgressScope {
            panel: self,
            bar,
            previous,
        }
    }
}

/// Guard for an open progress scope. Derefs to the underlying [`ProgressBar`].
#[must_use = "the progress bar is released as soon as the scope is dropped"]
pub struct ProgressScope<'a> {
    panel: &'a ProgressPanel,
    bar: ProgressBar,
    previous: Option<ProgressBar>,
}

impl ProgressScope<'_> {
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Deref for ProgressScope<'_> {
    type Target = ProgressBar;

    fn deref(&self) -> &Self::Target {
        &self.bar
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.panel.active.replace(self.previous.take());
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_filled_only_inside_scope() {
        let panel = ProgressPanel::new(Output::Stdout, false);
        assert!(panel.current().is_none());

        {
            let scope = panel.scope(3);
            scope.inc(2);
            let current = panel.current().expect("active bar");
            assert_eq!(current.position(), 2);
            assert_eq!(current.length(), Some(3));
        }

        assert!(panel.current().is_none());
    }

    #[test]
    fn slot_is_cleared_when_scope_body_fails() {
        fn work(panel: &ProgressPanel) -> Result<(), String> {
            let scope = panel.scope(5);
            scope.inc(1);
            Err("boom".to_string())
        }

        let panel = ProgressPanel::new(Output::Stdout, false);
        assert!(work(&panel).is_err());
        assert!(panel.current().is_none());
    }

    #[test]
    fn nested_scope_restores_outer_bar() {
        let panel = ProgressPanel::new(Output::Stdout, false);
        let outer = panel.scope(2);
        outer.inc(1);

        {
            let inner = panel.scope(5);
            inner.inc(3);
            assert_eq!(panel.current().map(|bar| bar.position()), Some(3));
        }

        let current = panel.current().expect("outer bar is exposed again");
        assert_eq!(current.position(), 1);
        assert_eq!(current.length(), Some(2));

        drop(outer);
        assert!(panel.current().is_none());
    }

    #[test]
    fn shown_progress_draws_on_output() {
        let (output, buffer) = Output::buffer();
        let panel = ProgressPanel::new(output, true);
        {
            let scope = panel.scope(10);
            for _ in 0..10 {
                scope.inc(1);
            }
        }
        assert!(buffer.contents().contains("10/10"));
        assert!(panel.current().is_none());
    }

    #[test]
    fn hidden_progress_writes_nothing() {
        let (output, buffer) = Output::buffer();
        let panel = ProgressPanel::new(output, false);
        {
            let scope = panel.scope(10);
            for _ in 0..10 {
                scope.inc(1);
            }
        }
        assert!(buffer.is_empty());
    }
}
