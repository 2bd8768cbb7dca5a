use crate::backup;
use crate::calc;
use crate::ipc::error::{err, marks_err, ok};
use crate::ipc::helpers::{required_path, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use serde_json::json;
use std::path::{Path, PathBuf};

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn workspace_param(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    req.params
        .get("workspacePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone())
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn handle_backup_export_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_path(req, "outPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let workspace_path = match workspace_param(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let export = match backup::export_workspace_bundle(&workspace_path, &PathBuf::from(&out_path)) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            )
        }
    };
    tracing::info!(path = %out_path, "workspace bundle exported");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "dbSha256": export.db_sha256
        }),
    )
}

fn handle_backup_import_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_path(req, "inPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let workspace_path = match workspace_param(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    // Release the open connection before its file is replaced.
    let previous = state.workspace.clone();
    state.close_workspace();

    let import = match backup::import_workspace_bundle(&src, &workspace_path) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %in_path, error = %e, "bundle import failed");
            restore_previous(state, previous.as_deref());
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": in_path })),
            );
        }
    };

    let student_count = match state.open_workspace(&workspace_path) {
        Ok(store) => store.count(),
        Err(e) => {
            restore_previous(state, previous.as_deref());
            return err(&req.id, "db_open_failed", format!("{e:#}"), None);
        }
    };
    let student_count = match student_count {
        Ok(n) => n,
        Err(e) => return marks_err(&req.id, &e, "db_query_failed"),
    };
    tracing::info!(path = %in_path, "workspace bundle imported");

    ok(
        &req.id,
        json!({
            "workspacePath": workspace_path.to_string_lossy(),
            "bundleFormatDetected": import.bundle_format_detected,
            "studentCount": student_count
        }),
    )
}

/// Reopens the workspace that was active before a failed import.
fn restore_previous(state: &mut AppState, previous: Option<&Path>) {
    let Some(path) = previous else {
        return;
    };
    if let Err(e) = state.open_workspace(path) {
        tracing::error!(workspace = %path.display(), error = %e, "failed to reopen workspace");
    }
}

/// Writes the list view (stored fields plus derived columns) as CSV.
fn handle_exchange_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let out_path = match required_path(req, "outPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let records = match store.list_all() {
        Ok(v) => v,
        Err(e) => return marks_err(&req.id, &e, "db_query_failed"),
    };

    let mut csv = String::from("Name,Roll No");
    for subject in Subject::ALL {
        csv.push(',');
        csv.push_str(subject.label());
    }
    csv.push_str(",Total,Percentage,Grade\n");

    for record in &records {
        let stats = calc::derive_row(record);
        csv.push_str(&csv_quote(&record.name));
        csv.push(',');
        csv.push_str(&csv_quote(&record.roll_no));
        for subject in Subject::ALL {
            csv.push_str(&format!(",{}", record.scores.get(subject)));
        }
        csv.push_str(&format!(
            ",{},{},{}\n",
            stats.total,
            calc::format_percent(stats.percentage),
            stats.grade
        ));
    }

    let out = PathBuf::from(&out_path);
    if let Some(parent) = out.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
    }
    if let Err(e) = std::fs::write(&out, csv) {
        return err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": out_path })),
        );
    }

    ok(
        &req.id,
        json!({
            "path": out_path,
            "rowsExported": records.len()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_backup_export_workspace_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import_workspace_bundle(state, req)),
        "exchange.exportCsv" => Some(handle_exchange_export_csv(state, req)),
        _ => None,
    }
}
