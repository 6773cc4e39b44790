//! Output panel visibility and clearing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::surface::{lock, EditorSurface, OutputSurface, SharedOutput};

pub struct PanelController<E, O> {
    editor: Arc<E>,
    output: SharedOutput<O>,
    visible: bool,
    layout_delay: Duration,
    pending_layout: Option<JoinHandle<()>>,
}

impl<E, O> PanelController<E, O>
where
    E: EditorSurface + 'static,
    O: OutputSurface,
{
    pub fn new(editor: Arc<E>, output: SharedOutput<O>, layout_delay: Duration) -> Self {
        Self { editor, output, visible: true, layout_delay, pending_layout: None }
    }

    pub fn is_output_visible(&self) -> bool {
        self.visible
    }

    /// Flip the panel's visibility and ask the editor to re-layout once the
    /// new geometry has been applied. Returns the new visibility.
    ///
    /// Must be called from within a tokio runtime.
    pub fn toggle_output_panel(&mut self) -> bool {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, "output panel toggled");

        // The editor is measured on the next frame; refresh after it.
        let editor = Arc::clone(&self.editor);
        let delay = self.layout_delay;
        self.pending_layout = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            editor.layout();
        }));
        self.visible
    }

    pub fn clear_output(&self) {
        lock(&self.output).clear();
    }
}

impl<E, O> Drop for PanelController<E, O> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_layout.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{shared, TerminalBuffer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEditor {
        layouts: AtomicUsize,
    }

    impl EditorSurface for CountingEditor {
        fn value(&self) -> Option<String> {
            Some(String::new())
        }

        fn layout(&self) {
            self.layouts.fetch_add(1, Ordering::SeqCst);
        }
    }

    const DELAY: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn toggle_refreshes_layout_after_the_delay() {
        let editor = Arc::new(CountingEditor::default());
        let mut panel =
            PanelController::new(editor.clone(), shared(TerminalBuffer::new(10)), DELAY);

        assert!(panel.is_output_visible());
        assert!(!panel.toggle_output_panel());
        assert!(!panel.is_output_visible());
        assert_eq!(editor.layouts.load(Ordering::SeqCst), 0);

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(editor.layouts.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(editor.layouts.load(Ordering::SeqCst), 1);

        assert!(panel.toggle_output_panel());
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(editor.layouts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_output_empties_the_surface_and_is_idempotent() {
        let output = shared(TerminalBuffer::new(10));
        let panel = PanelController::new(Arc::new(CountingEditor::default()), output.clone(), DELAY);

        {
            let mut term = lock(&output);
            term.writeln("a");
            term.writeln("b");
        }
        panel.clear_output();
        assert!(lock(&output).is_empty());

        panel.clear_output();
        assert!(lock(&output).is_empty());
    }
}
