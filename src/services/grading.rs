use crate::models::Grade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBand {
    pub min_score: f64,
    pub grade: Grade,
    pub points: f64,
}

/// Highest band first. Lower bounds are inclusive.
pub const GRADE_BANDS: [GradeBand; 6] = [
    GradeBand { min_score: 85.0, grade: Grade::APlus, points: 4.00 },
    GradeBand { min_score: 75.0, grade: Grade::A, points: 3.75 },
    GradeBand { min_score: 70.0, grade: Grade::BPlus, points: 3.50 },
    GradeBand { min_score: 65.0, grade: Grade::B, points: 3.00 },
    GradeBand { min_score: 60.0, grade: Grade::CPlus, points: 2.50 },
    GradeBand { min_score: 50.0, grade: Grade::C, points: 2.00 },
];

pub const FAILING_BAND: GradeBand = GradeBand {
    min_score: f64::NEG_INFINITY,
    grade: Grade::F,
    points: 0.00,
};

/// Total over every `f64`: out-of-range scores land in the top or bottom
/// band and NaN is failing.
pub fn band_for(score: f64) -> GradeBand {
    GRADE_BANDS
        .iter()
        .copied()
        .find(|band| score >= band.min_score)
        .unwrap_or(FAILING_BAND)
}

pub fn letter_grade(score: f64) -> Grade {
    band_for(score).grade
}

pub fn grade_point(score: f64) -> f64 {
    band_for(score).points
}
