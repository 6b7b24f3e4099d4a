#![cfg(unix)]

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use workbench_core::Language;
use workbench_core::config::{CommandSpec, InterpreterConfig};
use workbench_core::interpreter::LanguageBackend;
use workbench_core::session::{OutputSink, SessionId, SessionMessage, SessionMessageKind};
use workbench_execution::ProcessBackend;

fn sh_backend() -> ProcessBackend {
    sh_backend_with(None, None)
}

fn sh_backend_with(debug: Option<CommandSpec>, format: Option<CommandSpec>) -> ProcessBackend {
    ProcessBackend::new(
        Language::Python,
        InterpreterConfig {
            run: CommandSpec::new("/bin/sh", &["{file}"]),
            debug,
            format,
            debug_prefix: String::new(),
        },
        Duration::from_millis(500),
    )
}

fn sink() -> (OutputSink, mpsc::UnboundedReceiver<SessionMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutputSink::new(SessionId::new(), tx), rx)
}

/// Collects messages until the halt arrives.
async fn collect_until_halt(rx: &mut mpsc::UnboundedReceiver<SessionMessage>) -> Vec<SessionMessageKind> {
    let mut messages = Vec::new();
    loop {
        let message = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("session did not halt in time")
            .expect("channel closed");
        let is_halt = matches!(message.kind, SessionMessageKind::Halt { .. });
        messages.push(message.kind);
        if is_halt {
            return messages;
        }
    }
}

#[tokio::test]
async fn test_run_code_streams_output_then_halts() {
    let (sink, mut rx) = sink();
    let _handle = sh_backend()
        .run_code("echo hello\necho oops 1>&2\n", sink)
        .expect("launch");

    let messages = collect_until_halt(&mut rx).await;
    assert!(messages.contains(&SessionMessageKind::Output {
        text: "hello".to_string(),
        is_err: false
    }));
    assert!(messages.contains(&SessionMessageKind::Output {
        text: "oops".to_string(),
        is_err: true
    }));
    assert_eq!(
        messages.last(),
        Some(&SessionMessageKind::Halt {
            text: "Process exited with code 0".to_string()
        })
    );
}

#[tokio::test]
async fn test_interact_feeds_stdin() {
    let (sink, mut rx) = sink();
    let handle = sh_backend()
        .run_code("read name\necho \"got $name\"\n", sink)
        .expect("launch");

    handle.interact("ada").unwrap();

    let messages = collect_until_halt(&mut rx).await;
    assert!(messages.contains(&SessionMessageKind::Output {
        text: "got ada".to_string(),
        is_err: false
    }));
}

#[tokio::test]
async fn test_kill_is_idempotent_and_halts() {
    let (sink, mut rx) = sink();
    let handle = sh_backend().run_code("sleep 30\n", sink).expect("launch");

    handle.kill();
    handle.kill();

    let messages = collect_until_halt(&mut rx).await;
    assert!(matches!(messages.last(), Some(SessionMessageKind::Halt { .. })));

    // The process is gone; further kills must not panic.
    handle.kill();
}

#[tokio::test]
async fn test_detached_session_stops_routing() {
    let (sink, mut rx) = sink();
    let mut handle = sh_backend()
        .run_code("sleep 0.2\necho late\n", sink)
        .expect("launch");

    handle.detach();
    handle.kill();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(rx.try_recv().is_err(), "detached session must not deliver messages");
}

#[tokio::test]
async fn test_run_file_uses_location() {
    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("prog.py");
    std::fs::write(&script, "echo from-file\n").unwrap();

    let (sink, mut rx) = sink();
    let _handle = sh_backend().run_file(&script, sink).expect("launch");

    let messages = collect_until_halt(&mut rx).await;
    assert_eq!(
        messages.first(),
        Some(&SessionMessageKind::Output {
            text: "from-file".to_string(),
            is_err: false
        })
    );
}

#[tokio::test]
async fn test_launch_failure_returns_error() {
    let backend = ProcessBackend::new(
        Language::Scheme,
        InterpreterConfig {
            run: CommandSpec::new("/nonexistent/interpreter", &["{file}"]),
            debug: None,
            format: None,
            debug_prefix: String::new(),
        },
        Duration::from_secs(1),
    );
    let (sink, mut rx) = sink();

    let err = backend.run_code("(+ 1 2)", sink).unwrap_err();
    assert!(err.is_launch());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_generate_debug_trace_parses_response() {
    let backend = sh_backend_with(
        Some(CommandSpec::new(
            "/bin/sh",
            &["-c", r#"cat >/dev/null; echo '{"success": true, "data": [1, 2]}'"#],
        )),
        None,
    );
    let data = backend.generate_debug_trace("x = 1").await.unwrap();
    assert_eq!(data, serde_json::json!([1, 2]));
}

#[tokio::test]
async fn test_generate_debug_trace_times_out() {
    let backend = sh_backend_with(Some(CommandSpec::new("/bin/sh", &["-c", "sleep 5"])), None);
    let err = backend.generate_debug_trace("x = 1").await.unwrap_err();
    assert!(err.is_generation());
    assert!(err.user_message().contains("timed out"));
}

#[tokio::test]
async fn test_format_success_and_failure() {
    let echo = sh_backend_with(None, Some(CommandSpec::new("/bin/cat", &[])));
    assert_eq!(echo.format("x=1\n").await.unwrap(), "x=1\n");

    let failing = sh_backend_with(
        None,
        Some(CommandSpec::new("/bin/sh", &["-c", "echo 'cannot parse' 1>&2; exit 1"])),
    );
    let err = failing.format("x=").await.unwrap_err();
    assert_eq!(err.user_message(), "cannot parse");
}

#[tokio::test]
async fn test_format_streams_large_source() {
    let backend = sh_backend_with(None, Some(CommandSpec::new("/bin/cat", &[])));
    let source = "x = 1\n".repeat(200_000);

    let formatted = timeout(Duration::from_secs(5), backend.format(&source))
        .await
        .expect("format must finish within the generation timeout")
        .unwrap();
    assert_eq!(formatted.len(), source.len());
}

#[tokio::test]
async fn test_generation_timeout_covers_stdin_write() {
    // Never reads stdin, so writing a large source blocks on a full pipe.
    let backend = sh_backend_with(Some(CommandSpec::new("/bin/sh", &["-c", "sleep 5"])), None);
    let source = "x = 1\n".repeat(200_000);

    let err = timeout(Duration::from_secs(3), backend.generate_debug_trace(&source))
        .await
        .expect("generation timeout must bound the stdin write")
        .unwrap_err();
    assert!(err.user_message().contains("timed out"));
}

#[tokio::test]
async fn test_close_input_lets_process_finish() {
    let (sink, mut rx) = sink();
    let handle = sh_backend()
        .run_code("cat\nsleep 0.1\necho done\n", sink)
        .expect("launch");

    handle.interact("queued").unwrap();
    handle.close_input();
    handle.close_input();
    assert!(handle.interact("late").is_err());

    let messages = collect_until_halt(&mut rx).await;
    assert_eq!(
        messages,
        vec![
            SessionMessageKind::Output {
                text: "queued".to_string(),
                is_err: false
            },
            SessionMessageKind::Output {
                text: "done".to_string(),
                is_err: false
            },
            SessionMessageKind::Halt {
                text: "Process exited with code 0".to_string()
            },
        ]
    );
}
