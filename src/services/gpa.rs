use crate::models::{GpaSummary, GradeRecord};

/// Credit-weighted GPA over `records`, using each record's stored points.
///
/// Sums are compensated so the result does not drift with record order.
pub fn cumulative_gpa(records: &[GradeRecord]) -> GpaSummary {
    let mut credits = CompensatedSum::default();
    let mut weighted = CompensatedSum::default();

    for record in records {
        credits.add(record.credit_hours);
        weighted.add(record.gpa * record.credit_hours);
    }

    let credit_total = credits.total();
    let gpa = if credit_total > 0.0 {
        round_half_up(weighted.total() / credit_total, 2)
    } else {
        0.0
    };

    GpaSummary {
        gpa,
        credit_total,
        course_count: records.len(),
    }
}

pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

// Neumaier summation.
#[derive(Debug, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}
