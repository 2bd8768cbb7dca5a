use crate::ipc::error::{err, marks_err, ok};
use crate::ipc::helpers::required_path;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_count = state.store.as_ref().and_then(|s| s.count().ok());
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "studentCount": student_count
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_path(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    let store = match state.open_workspace(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(workspace = %path.display(), error = %e, "workspace open failed");
            return err(&req.id, "db_open_failed", format!("{e:#}"), None);
        }
    };
    let student_count = match store.count() {
        Ok(n) => n,
        Err(e) => return marks_err(&req.id, &e, "db_query_failed"),
    };

    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "studentCount": student_count
        }),
    )
}

fn handle_workspace_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let closed = state.close_workspace();
    ok(&req.id, json!({ "closed": closed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.close" => Some(handle_workspace_close(state, req)),
        _ => None,
    }
}
