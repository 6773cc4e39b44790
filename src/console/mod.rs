//! Run-code console: owns the run lifecycle and renders every outcome to the
//! output surface.
//!
//! A run reads the editor, writes the start banner, awaits the execution
//! backend and renders the settled result. Refusals, backend errors and
//! transport failures all end up as text on the output surface and the
//! console is back to [`RunState::Idle`] afterwards. The settled result is
//! handed back only so a one-shot caller can pick an exit status.

use std::sync::{Arc, Mutex};

use crate::execution::{ExecutionBackend, ExecutionResult};
use crate::surface::{lock, EditorSurface, OutputSurface, SharedOutput};

mod render;

pub use render::{classify, LineKind};
use render::{separator, settled_lines, NO_CODE_WARNING, RUN_IN_PROGRESS_WARNING, START_BANNER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

pub struct RunConsole<E, O> {
    editor: Arc<E>,
    output: SharedOutput<O>,
    backend: Arc<dyn ExecutionBackend>,
    state: Mutex<RunState>,
    separator: String,
}

impl<E: EditorSurface, O: OutputSurface> RunConsole<E, O> {
    pub fn new(editor: Arc<E>, output: SharedOutput<O>, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            editor,
            output,
            backend,
            state: Mutex::new(RunState::Idle),
            separator: separator(50),
        }
    }

    pub fn with_separator_width(mut self, width: usize) -> Self {
        self.separator = separator(width);
        self
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    #[cfg(test)]
    pub fn output(&self) -> &SharedOutput<O> {
        &self.output
    }

    /// Run the editor's current contents once. Returns the settled result,
    /// or `None` when the run was refused (editor not ready, a run already
    /// outstanding, blank source).
    pub async fn run(&self) -> Option<ExecutionResult> {
        let Some((code, _running)) = self.begin() else {
            return None;
        };

        tracing::info!(code_len = code.len(), "run started");
        let result = self.backend.submit(&code).await;
        tracing::info!(kind = result.kind(), "run settled");

        self.render(&result);
        // `_running` drops here and puts the console back to idle.
        Some(result)
    }

    /// Apply the trigger guards. On success the console is `Running`, the
    /// start banner is written and the snapshot to submit is returned.
    fn begin(&self) -> Option<(String, RunningGuard<'_>)> {
        let Some(code) = self.editor.value() else {
            tracing::info!("editor not ready; run ignored");
            return None;
        };

        let mut state = lock(&self.state);
        if *state == RunState::Running {
            drop(state);
            tracing::warn!("run requested while another run is outstanding; rejected");
            self.write(&[RUN_IN_PROGRESS_WARNING]);
            return None;
        }

        if code.trim().is_empty() {
            drop(state);
            tracing::debug!("empty source; nothing to run");
            self.write(&[NO_CODE_WARNING]);
            return None;
        }

        *state = RunState::Running;
        drop(state);

        self.write(&[START_BANNER, self.separator.as_str()]);
        Some((code, RunningGuard { state: &self.state }))
    }

    fn render(&self, result: &ExecutionResult) {
        let lines = settled_lines(result, &self.separator);
        let mut output = lock(&self.output);
        for line in &lines {
            output.writeln(line);
        }
    }

    fn write(&self, lines: &[&str]) {
        let mut output = lock(&self.output);
        for line in lines {
            output.writeln(line);
        }
    }
}

/// Returns the console to idle when the run ends, including when the run
/// future is dropped before it settles.
struct RunningGuard<'a> {
    state: &'a Mutex<RunState>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = RunState::Idle;
    }
}
