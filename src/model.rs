use crate::error::MarksError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Maths,
    Science,
    Hindi,
    English,
    Sst,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Maths,
        Subject::Science,
        Subject::Hindi,
        Subject::English,
        Subject::Sst,
    ];

    /// Request parameter name and table column share this key.
    pub fn key(self) -> &'static str {
        match self {
            Subject::Maths => "maths",
            Subject::Science => "science",
            Subject::Hindi => "hindi",
            Subject::English => "english",
            Subject::Sst => "sst",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::Maths => "Maths",
            Subject::Science => "Science",
            Subject::Hindi => "Hindi",
            Subject::English => "English",
            Subject::Sst => "SST",
        }
    }
}

/// Marks for the five fixed subjects. Range [0,100] is expected but not enforced;
/// `i32` marks keep totals and percentages well inside `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores {
    pub maths: i32,
    pub science: i32,
    pub hindi: i32,
    pub english: i32,
    pub sst: i32,
}

impl Scores {
    #[cfg(test)]
    pub fn uniform(mark: i32) -> Self {
        Self {
            maths: mark,
            science: mark,
            hindi: mark,
            english: mark,
            sst: mark,
        }
    }

    pub fn get(&self, subject: Subject) -> i32 {
        match subject {
            Subject::Maths => self.maths,
            Subject::Science => self.science,
            Subject::Hindi => self.hindi,
            Subject::English => self.english,
            Subject::Sst => self.sst,
        }
    }

    fn set(&mut self, subject: Subject, mark: i32) {
        match subject {
            Subject::Maths => self.maths = mark,
            Subject::Science => self.science = mark,
            Subject::Hindi => self.hindi = mark,
            Subject::English => self.english = mark,
            Subject::Sst => self.sst = mark,
        }
    }

    pub fn total(&self) -> i64 {
        Subject::ALL.iter().map(|s| i64::from(self.get(*s))).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub roll_no: String,
    pub name: String,
    pub scores: Scores,
}

impl StudentRecord {
    #[cfg(test)]
    pub fn new(roll_no: impl Into<String>, name: impl Into<String>, scores: Scores) -> Self {
        Self {
            roll_no: roll_no.into(),
            name: name.into(),
            scores,
        }
    }

    /// Identity fields must be non-empty; scores are already integers by type.
    pub fn validate(&self) -> Result<(), MarksError> {
        if self.roll_no.trim().is_empty() {
            return Err(MarksError::validation("rollNo", "rollNo must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(MarksError::validation("name", "name must not be empty"));
        }
        Ok(())
    }
}

/// Builds a record from the raw form values sent by the UI.
///
/// Scores may arrive as JSON integers or as form text holding an integer.
/// Name and roll number are trimmed; whitespace-only values count as empty.
pub fn student_from_params(params: &serde_json::Value) -> Result<StudentRecord, MarksError> {
    let name = required_text(params, "name")?;
    let roll_no = required_text(params, "rollNo")?;

    let mut scores = Scores::default();
    for subject in Subject::ALL {
        scores.set(subject, score_param(params, subject)?);
    }

    Ok(StudentRecord {
        roll_no,
        name,
        scores,
    })
}

pub fn required_text(params: &serde_json::Value, key: &str) -> Result<String, MarksError> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => {
            Err(MarksError::validation(key, format!("missing {}", key)))
        }
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(MarksError::validation(key, format!("{} must not be empty", key)))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(MarksError::validation(key, format!("{} must be a string", key))),
    }
}

fn score_param(params: &serde_json::Value, subject: Subject) -> Result<i32, MarksError> {
    let key = subject.key();
    let not_integer = || MarksError::validation(key, format!("{} must be an integer", key));
    let wide = match params.get(key) {
        None | Some(serde_json::Value::Null) => {
            return Err(MarksError::validation(key, format!("missing {}", key)))
        }
        Some(serde_json::Value::Number(n)) => {
            if n.is_u64() && n.as_i64().is_none() {
                return Err(out_of_range(key));
            }
            n.as_i64().ok_or_else(not_integer)?
        }
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(MarksError::validation(key, format!("{} must not be empty", key)));
            }
            match trimmed.parse::<i64>() {
                Ok(v) => v,
                Err(_) if is_integer_text(trimmed) => return Err(out_of_range(key)),
                Err(_) => return Err(not_integer()),
            }
        }
        Some(_) => return Err(not_integer()),
    };
    i32::try_from(wide).map_err(|_| out_of_range(key))
}

fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn out_of_range(key: &str) -> MarksError {
    MarksError::validation(
        key,
        format!(
            "{} must be between {} and {}",
            key,
            i32::MIN,
            i32::MAX
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(overrides: serde_json::Value) -> serde_json::Value {
        let mut base = json!({
            "name": "Alice",
            "rollNo": "R1",
            "maths": 90,
            "science": "88",
            "hindi": " 75 ",
            "english": 60,
            "sst": "+41"
        });
        if let (Some(b), Some(o)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in o {
                b.insert(k.clone(), v.clone());
            }
        }
        base
    }

    fn field_of(e: MarksError) -> String {
        match e {
            MarksError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_integers_and_integer_text() {
        let rec = student_from_params(&form(json!({}))).expect("valid form");
        assert_eq!(rec.roll_no, "R1");
        assert_eq!(rec.name, "Alice");
        assert_eq!(
            rec.scores,
            Scores {
                maths: 90,
                science: 88,
                hindi: 75,
                english: 60,
                sst: 41
            }
        );
        assert_eq!(rec.scores.total(), 354);
    }

    #[test]
    fn rejects_missing_and_empty_fields() {
        let mut params = form(json!({}));
        params.as_object_mut().unwrap().remove("english");
        assert_eq!(field_of(student_from_params(&params).unwrap_err()), "english");

        let e = student_from_params(&form(json!({ "name": "   " }))).unwrap_err();
        assert_eq!(field_of(e), "name");

        let e = student_from_params(&form(json!({ "rollNo": "" }))).unwrap_err();
        assert_eq!(field_of(e), "rollNo");

        let e = student_from_params(&form(json!({ "sst": "" }))).unwrap_err();
        assert_eq!(field_of(e), "sst");
    }

    #[test]
    fn rejects_non_integer_scores() {
        for bad in [json!("ninety"), json!(90.5), json!("90.0"), json!(true)] {
            let e = student_from_params(&form(json!({ "maths": bad }))).unwrap_err();
            assert!(e.to_string().contains("maths must be an integer"), "{e}");
        }
    }

    #[test]
    fn out_of_range_marks_pass_through() {
        let rec = student_from_params(&form(json!({ "maths": 120, "science": -5 })))
            .expect("range is not enforced");
        assert_eq!(rec.scores.maths, 120);
        assert_eq!(rec.scores.science, -5);
    }

    #[test]
    fn marks_too_large_to_total_are_rejected() {
        for bad in [
            json!(100_000_000_000_000_000_i64),
            json!(u64::MAX),
            json!("100000000000000000"),
            json!("-99999999999999999999"),
            json!(i64::from(i32::MAX) + 1),
        ] {
            let e = student_from_params(&form(json!({ "hindi": bad }))).unwrap_err();
            assert!(e.to_string().contains("hindi must be between"), "{e}");
            assert_eq!(field_of(e), "hindi");
        }
    }

    #[test]
    fn extreme_in_range_marks_total_without_overflow() {
        let max = student_from_params(&form(json!({
            "maths": i32::MAX, "science": i32::MAX, "hindi": i32::MAX,
            "english": i32::MAX, "sst": i32::MAX
        })))
        .expect("i32 bounds are accepted");
        assert_eq!(max.scores.total(), 5 * i64::from(i32::MAX));
    }
}
