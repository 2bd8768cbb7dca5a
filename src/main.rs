mod backup;
mod calc;
mod db;
mod error;
mod ipc;
mod model;
mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::Level;

/// Log lines go to stderr; stdout carries the response stream.
fn init_tracing() {
    let level = std::env::var("MARKSD_LOG")
        .ok()
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let mut state = ipc::AppState::default();

    if let Some(path) = std::env::var_os("MARKSD_WORKSPACE").map(PathBuf::from) {
        if let Err(e) = state.open_workspace(&path) {
            tracing::error!(workspace = %path.display(), error = %e, "startup workspace failed to open");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    state.close_workspace();
    tracing::debug!("stdin closed, exiting");
}
