use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use workbench_application::{FileSessionController, ViewEvent, ViewNotifier};
use workbench_core::graphics::GraphicsCommand;
use workbench_core::output::OutputKind;

use super::context::{AlreadyReported, Workbench};

/// Runs `file` and pumps interpreter output and terminal input until the
/// interpreter halts.
///
/// End of terminal input closes the interpreter's input so it can finish
/// on its own. Ctrl-C stops it.
pub async fn execute(workbench: &Workbench, file: &Path) -> Result<()> {
    let (view, mut events) = ViewNotifier::channel();
    let mut controller = workbench.open(file)?.with_view(view);
    let session = controller.run().await.map_err(|_| AlreadyReported)?;
    tracing::debug!("[CLI] Attached to session {}", session);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            message = controller.next_message() => match message {
                Some(message) => controller.handle_message(message).await,
                None => break,
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => controller.interact(&line),
                Ok(None) => {
                    stdin_open = false;
                    controller.end_input();
                }
                Err(e) => {
                    tracing::warn!("[CLI] Failed to read input: {}", e);
                    stdin_open = false;
                    controller.end_input();
                }
            },
            _ = tokio::signal::ctrl_c() => controller.stop(),
        }

        render(&controller, &mut events)?;
        if !controller.output_active() {
            break;
        }
    }

    Ok(())
}

fn render(controller: &FileSessionController, events: &mut UnboundedReceiver<ViewEvent>) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        match event {
            ViewEvent::OutputAppended(entry) => match entry.kind {
                OutputKind::Stdout => println!("{}", entry.text),
                OutputKind::Stderr => eprintln!("{}", entry.text.red()),
                // Already echoed by the terminal.
                OutputKind::InputEcho => {}
            },
            ViewEvent::GraphicsAppended(command) => {
                if let Some(line) = graphics_line(&command)? {
                    println!("{}", line.cyan());
                }
            }
            ViewEvent::DebugTraceReady => {
                if let Some(data) = controller.debugger_data() {
                    println!("{}", format!("[debug] {}", data).bright_magenta());
                }
            }
            ViewEvent::EditorTextChanged => {
                tracing::debug!("[CLI] Editor text now {} bytes", controller.editor_text().len());
            }
            ViewEvent::Reveal(panel) => tracing::trace!("[CLI] Reveal {:?}", panel),
            ViewEvent::Halted => tracing::debug!("[CLI] Interpreter halted"),
        }
    }
    Ok(())
}

/// Text shown for a drawing command. Every run starts with a clear, and a
/// terminal has no canvas to reset, so clears print nothing.
fn graphics_line(command: &GraphicsCommand) -> Result<Option<String>> {
    if command.is_clear() {
        return Ok(None);
    }
    Ok(Some(format!("[graphics] {}", serde_json::to_string(command)?)))
}
