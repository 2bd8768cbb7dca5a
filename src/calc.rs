use crate::model::StudentRecord;
use serde::Serialize;
use std::fmt;

/// Five subjects at 100 marks each.
pub const MAX_TOTAL: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

/// Inclusive lower bounds, checked highest first.
const GRADE_THRESHOLDS: [(f64, Grade); 6] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
    (40.0, Grade::D),
];

impl Grade {
    pub fn from_percentage(percentage: f64) -> Grade {
        GRADE_THRESHOLDS
            .iter()
            .find(|(min, _)| percentage >= *min)
            .map(|(_, g)| *g)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `total / 500 * 100`. Scaling before the division keeps whole-number
/// percentages exact, so 450 lands on 90.0 and not a hair below it.
pub fn percentage_of(total: i64) -> f64 {
    (total * 100) as f64 / MAX_TOTAL as f64
}

pub fn format_percent(percentage: f64) -> String {
    format!("{:.2}%", percentage)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowStats {
    pub total: i64,
    pub percentage: f64,
    pub grade: Grade,
}

pub fn derive_row(record: &StudentRecord) -> RowStats {
    let total = record.scores.total();
    let percentage = percentage_of(total);
    RowStats {
        total,
        percentage,
        grade: Grade::from_percentage(percentage),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub roll_no: String,
    pub name: String,
    pub total: i64,
    pub percentage: f64,
}

impl Performer {
    fn from_record(record: &StudentRecord) -> Self {
        let total = record.scores.total();
        Self {
            roll_no: record.roll_no.clone(),
            name: record.name.clone(),
            total,
            percentage: percentage_of(total),
        }
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.roll_no)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAnalysis {
    pub count: usize,
    pub avg_percentage: f64,
    pub top_performer: Performer,
    pub bottom_performer: Performer,
}

/// Text for the four analysis fields, as the marks form displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisLabels {
    pub total_students: String,
    pub avg_percentage: String,
    pub top_performer: String,
    pub lowest_performer: String,
}

impl ClassAnalysis {
    pub fn labels(&self) -> AnalysisLabels {
        AnalysisLabels {
            total_students: format!("Total Students: {}", self.count),
            avg_percentage: format!(
                "Average Percentage: {}",
                format_percent(self.avg_percentage)
            ),
            top_performer: format!("Top Performer: {}", self.top_performer.label()),
            lowest_performer: format!("Lowest Performer: {}", self.bottom_performer.label()),
        }
    }
}

/// Class-level aggregates over a store snapshot. `None` means there is no data.
///
/// Top and bottom performers are picked by total; equal totals resolve to the
/// lowest roll number so the answer does not depend on scan order. Roll numbers
/// compare as strings, not numbers: "R10" sorts before "R2".
pub fn class_analysis(records: &[StudentRecord]) -> Option<ClassAnalysis> {
    let top = records.iter().max_by(|a, b| {
        a.scores
            .total()
            .cmp(&b.scores.total())
            .then_with(|| b.roll_no.cmp(&a.roll_no))
    })?;
    let bottom = records.iter().min_by(|a, b| {
        a.scores
            .total()
            .cmp(&b.scores.total())
            .then_with(|| a.roll_no.cmp(&b.roll_no))
    })?;

    let sum: f64 = records.iter().map(|r| derive_row(r).percentage).sum();
    let count = records.len();

    Some(ClassAnalysis {
        count,
        avg_percentage: sum / count as f64,
        top_performer: Performer::from_record(top),
        bottom_performer: Performer::from_record(bottom),
    })
}
