use std::future::Future;

use crate::error::Result;

// ESEQ is for "escape sequence"
pub const ESEQ_RED: &str = "\x1b[38;5;1m";
pub const ESEQ_GREEN: &str = "\x1b[38;5;2m";
pub const ESEQ_WEAK: &str = "\x1b[38;5;240m";
pub const ESEQ_RESET: &str = "\x1b[m";

/// One line per pipeline step. CI logs have no TTY, so there is no spinner;
/// a step announces itself and later resolves to a ✓ or ! line.
pub struct StepView {
    task: String,
}

impl StepView {
    pub fn begin(task: impl ToString) -> Self {
        let task = task.to_string();
        println!("{ESEQ_WEAK}… {task}{ESEQ_RESET}");

        Self { task }
    }

    pub fn success(self, message: Option<&str>) {
        println!(
            "{ESEQ_GREEN}✓ {}{}{ESEQ_RESET}",
            self.task,
            message.map(|m| format!(" - {m}")).unwrap_or_default()
        );
    }

    pub fn failure(self, message: Option<&str>) {
        println!(
            "{ESEQ_RED}! {}{}{ESEQ_RESET}",
            self.task,
            message.map(|m| format!(" - {m}")).unwrap_or_default()
        );
    }
}

/// Runs one pipeline step under a [`StepView`], resolving the line from the
/// outcome.
pub async fn with_step<T>(task: impl ToString, step: impl Future<Output = Result<T>>) -> Result<T> {
    let view = StepView::begin(task);

    match step.await {
        Ok(value) => {
            view.success(None);
            Ok(value)
        }
        Err(err) => {
            view.failure(None);
            Err(err)
        }
    }
}
