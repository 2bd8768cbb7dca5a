use crate::calc;
use crate::error::MarksError;
use crate::ipc::error::{err, marks_err, ok};
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use crate::model::{self, StudentRecord};
use crate::store::UpsertOutcome;
use serde_json::json;

/// One list-view row: the stored fields plus total, percentage and grade.
pub fn student_row_json(record: &StudentRecord) -> serde_json::Value {
    let stats = calc::derive_row(record);
    let s = &record.scores;
    json!({
        "name": record.name,
        "rollNo": record.roll_no,
        "maths": s.maths,
        "science": s.science,
        "hindi": s.hindi,
        "english": s.english,
        "sst": s.sst,
        "total": stats.total,
        "percentage": stats.percentage,
        "percentageDisplay": calc::format_percent(stats.percentage),
        "grade": stats.grade
    })
}

fn roll_no_param(req: &Request) -> Result<String, serde_json::Value> {
    model::required_text(&req.params, "rollNo").map_err(|e| marks_err(&req.id, &e, "bad_params"))
}

fn handle_students_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let record = match model::student_from_params(&req.params) {
        Ok(r) => r,
        Err(e) => return marks_err(&req.id, &e, "bad_params"),
    };

    match store.upsert(&record) {
        Ok(outcome) => ok(
            &req.id,
            json!({
                "rollNo": record.roll_no,
                "created": outcome == UpsertOutcome::Created,
                "student": student_row_json(&record)
            }),
        ),
        Err(e) => marks_err(&req.id, &e, "db_write_failed"),
    }
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roll_no = match roll_no_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.get(&roll_no) {
        Ok(Some(record)) => ok(&req.id, json!({ "student": student_row_json(&record) })),
        Ok(None) => marks_err(&req.id, &MarksError::not_found(&roll_no), "db_query_failed"),
        Err(e) => marks_err(&req.id, &e, "db_query_failed"),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match store.list_all() {
        Ok(records) => {
            let rows: Vec<serde_json::Value> = records.iter().map(student_row_json).collect();
            ok(&req.id, json!({ "students": rows }))
        }
        Err(e) => marks_err(&req.id, &e, "db_query_failed"),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roll_no = match model::required_text(&req.params, "rollNo") {
        Ok(v) => v,
        Err(_) => {
            return err(
                &req.id,
                "bad_params",
                "select a student to delete",
                Some(json!({ "field": "rollNo" })),
            )
        }
    };

    match store.delete_by_roll_no(&roll_no) {
        Ok(true) => ok(&req.id, json!({ "rollNo": roll_no, "deleted": true })),
        // Nothing matched: the store is unchanged, so report a warning rather than fail.
        Ok(false) => ok(
            &req.id,
            json!({
                "rollNo": roll_no,
                "deleted": false,
                "warning": {
                    "code": "not_found",
                    "message": MarksError::not_found(&roll_no).to_string()
                }
            }),
        ),
        Err(e) => marks_err(&req.id, &e, "db_write_failed"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.upsert" => Some(handle_students_upsert(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
