use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown letter grade {0:?}")]
pub struct UnknownGrade(pub String);

impl TryFrom<String> for Grade {
    type Error = UnknownGrade;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "A+" => Ok(Grade::APlus),
            "A" => Ok(Grade::A),
            "B+" => Ok(Grade::BPlus),
            "B" => Ok(Grade::B),
            "C+" => Ok(Grade::CPlus),
            "C" => Ok(Grade::C),
            "F" => Ok(Grade::F),
            _ => Err(UnknownGrade(value)),
        }
    }
}

/// A graded course. `grade` and `gpa` are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub id: String,
    pub owner_id: String,
    pub course: String,
    pub score: f64,
    pub credit_hours: f64,
    #[sqlx(try_from = "String")]
    pub grade: Grade,
    pub gpa: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGradeRequest {
    pub course: Option<String>,
    pub score: Option<f64>,
    pub credit_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaSummary {
    /// Rounded half-up to two decimals.
    pub gpa: f64,
    pub credit_total: f64,
    pub course_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_letters_round_trip_through_storage_text() {
        for grade in [
            Grade::APlus,
            Grade::A,
            Grade::BPlus,
            Grade::B,
            Grade::CPlus,
            Grade::C,
            Grade::F,
        ] {
            assert_eq!(Grade::try_from(grade.as_str().to_string()).unwrap(), grade);
            assert_eq!(
                serde_json::to_string(&grade).unwrap(),
                format!("\"{}\"", grade.as_str())
            );
        }
        assert!(Grade::try_from("D".to_string()).is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = GradeRecord {
            id: "g1".to_string(),
            owner_id: "u1".to_string(),
            course: "Calculus".to_string(),
            score: 91.0,
            credit_hours: 3.0,
            grade: Grade::APlus,
            gpa: 4.0,
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["creditHours"], 3.0);
        assert_eq!(value["ownerId"], "u1");
        assert_eq!(value["grade"], "A+");
    }
}
