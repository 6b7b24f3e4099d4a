//! Interactive interpreter sessions backed by a child process.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use workbench_core::config::CommandSpec;
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::session::{OutputSink, SessionControl, SessionHandle};

/// How long reader tasks may keep draining pipes after the process exited.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Control side of a running child process.
struct ProcessControl {
    /// `None` once input was closed; dropping the sender ends `write_input`.
    input: Mutex<Option<mpsc::UnboundedSender<String>>>,
    cancel: CancellationToken,
    attached: Arc<AtomicBool>,
}

impl SessionControl for ProcessControl {
    fn interact(&self, line: &str) -> Result<()> {
        let input = self
            .input
            .lock()
            .map_err(|_| WorkbenchError::internal("interpreter input lock poisoned"))?;
        match input.as_ref() {
            Some(tx) => tx
                .send(line.to_string())
                .map_err(|_| WorkbenchError::io("interpreter input is closed")),
            None => Err(WorkbenchError::io("interpreter input is closed")),
        }
    }

    fn close_input(&self) {
        if let Ok(mut input) = self.input.lock() {
            input.take();
        }
    }

    fn kill(&self) {
        // Cancelling twice, or after the supervisor is gone, does nothing.
        self.cancel.cancel();
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

/// Spawns `spec` on `script` and wires its pipes to `sink`.
///
/// `script_guard` keeps a temporary script alive until the process is gone.
pub(crate) fn spawn_session(
    spec: &CommandSpec,
    script: &Path,
    script_guard: Option<NamedTempFile>,
    sink: OutputSink,
) -> Result<SessionHandle> {
    let args = spec.args_for(&script.to_string_lossy());

    let mut cmd = Command::new(&spec.program);
    cmd.args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        tracing::error!("[Interpreter] Failed to spawn {}: {}", spec.program, e);
        WorkbenchError::launch(format!("{}: {}", spec.program, e))
    })?;

    let (stdin, stdout, stderr) = match (child.stdin.take(), child.stdout.take(), child.stderr.take())
    {
        (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
        _ => {
            let _ = child.start_kill();
            return Err(WorkbenchError::launch(format!(
                "{}: interpreter pipes unavailable",
                spec.program
            )));
        }
    };

    tracing::info!(
        "[Interpreter] Started session {} ({} {:?}, pid {:?})",
        sink.session(),
        spec.program,
        args,
        child.id()
    );

    let attached = Arc::new(AtomicBool::new(true));
    let cancel = CancellationToken::new();
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    let stdout_task = tokio::spawn(forward_lines(stdout, false, sink.clone(), attached.clone()));
    let stderr_task = tokio::spawn(forward_lines(stderr, true, sink.clone(), attached.clone()));
    tokio::spawn(write_input(stdin, input_rx));
    tokio::spawn(supervise(
        child,
        cancel.clone(),
        [stdout_task, stderr_task],
        sink.clone(),
        attached.clone(),
        script_guard,
    ));

    Ok(SessionHandle::new(
        sink.session(),
        Box::new(ProcessControl {
            input: Mutex::new(Some(input_tx)),
            cancel,
            attached,
        }),
    ))
}

/// Forwards each line of `reader` while the session is attached.
async fn forward_lines<R>(reader: R, is_err: bool, sink: OutputSink, attached: Arc<AtomicBool>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if !attached.load(Ordering::Acquire) {
                    continue;
                }
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(['\n', '\r']);
                tracing::trace!("[Interpreter] {} line: {}", sink.session(), line);
                if !sink.output(line, is_err) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("[Interpreter] Read error on {}: {}", sink.session(), e);
                break;
            }
        }
    }
}

/// Feeds queued lines to the child. Returning drops `stdin`, which the
/// child sees as end of input.
async fn write_input(mut stdin: ChildStdin, mut lines: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        if let Err(e) = stdin.write_all(&bytes).await {
            tracing::debug!("[Interpreter] Input pipe closed: {}", e);
            break;
        }
        if let Err(e) = stdin.flush().await {
            tracing::debug!("[Interpreter] Input flush failed: {}", e);
            break;
        }
    }
}

/// Waits for exit (or a kill request) and reports the halt.
async fn supervise(
    mut child: Child,
    cancel: CancellationToken,
    readers: [JoinHandle<()>; 2],
    sink: OutputSink,
    attached: Arc<AtomicBool>,
    script_guard: Option<NamedTempFile>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            tracing::info!("[Interpreter] Killing session {}", sink.session());
            if let Err(e) = child.start_kill() {
                tracing::debug!("[Interpreter] Kill failed (already exited?): {}", e);
            }
            child.wait().await
        }
    };

    for reader in readers {
        let abort = reader.abort_handle();
        if tokio::time::timeout(DRAIN_GRACE, reader).await.is_err() {
            abort.abort();
        }
    }
    drop(script_guard);

    let text = match status {
        Ok(status) => describe_exit(status),
        Err(e) => format!("Interpreter wait failed: {}", e),
    };
    tracing::info!("[Interpreter] Session {} halted: {}", sink.session(), text);

    if attached.load(Ordering::Acquire) {
        sink.halt(text);
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("Process exited with code {}", code),
        None => "Process terminated".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_describe_exit() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(
            describe_exit(ExitStatus::from_raw(0)),
            "Process exited with code 0"
        );
        assert_eq!(
            describe_exit(ExitStatus::from_raw(3 << 8)),
            "Process exited with code 3"
        );
        // Raw status 9: killed by SIGKILL.
        assert_eq!(describe_exit(ExitStatus::from_raw(9)), "Process terminated");
    }
}
