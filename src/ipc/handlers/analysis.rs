use crate::calc;
use crate::ipc::error::{err, marks_err, ok};
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_analysis_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let records = match store.list_all() {
        Ok(v) => v,
        Err(e) => return marks_err(&req.id, &e, "db_query_failed"),
    };

    let Some(analysis) = calc::class_analysis(&records) else {
        return ok(
            &req.id,
            json!({
                "hasData": false,
                "count": 0,
                "message": "No students in the database"
            }),
        );
    };

    tracing::debug!(count = analysis.count, "class analysis computed");
    ok(
        &req.id,
        json!({
            "hasData": true,
            "count": analysis.count,
            "avgPercentage": analysis.avg_percentage,
            "avgPercentageDisplay": calc::format_percent(analysis.avg_percentage),
            "topPerformer": analysis.top_performer,
            "bottomPerformer": analysis.bottom_performer,
            "labels": analysis.labels()
        }),
    )
}

fn handle_analysis_grade(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(percentage) = req.params.get("percentage").and_then(|v| v.as_f64()) else {
        return err(&req.id, "bad_params", "missing percentage", None);
    };
    let grade = calc::Grade::from_percentage(percentage);
    ok(&req.id, json!({ "percentage": percentage, "grade": grade }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analysis.class" => Some(handle_analysis_class(state, req)),
        "analysis.grade" => Some(handle_analysis_grade(state, req)),
        _ => None,
    }
}
