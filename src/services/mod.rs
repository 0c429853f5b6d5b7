pub mod gpa;
pub mod grading;

pub use gpa::{cumulative_gpa, round_half_up};
pub use grading::{GradeBand, band_for, grade_point, letter_grade};
