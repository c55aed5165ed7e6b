use drawscale_types::{GradingContext, GradingResult};
use serde::Serialize;
use serde_json::Value;

use crate::config::LenientReference;
use crate::error::{json_kind, GradeError};
use crate::extract::extract_json;
use crate::grader::Grader;
use crate::measure::{echoed_or_zero, required, Measure};

const INCHES_PER_FOOT: Measure = Measure::Int(12);

/// Grades the first entry of a measurement array by its total length in inches.
pub struct LenientMeasurementGrader {
	reference: LenientReference,
}

impl LenientMeasurementGrader {
	pub fn new() -> Self {
		Self::with_reference(LenientReference::default())
	}

	pub fn with_reference(reference: LenientReference) -> Self {
		Self { reference }
	}
}

impl Default for LenientMeasurementGrader {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug, Serialize)]
struct LenientDiagnostics {
	measured_feet: Measure,
	measured_inches: Measure,
	measured_total_inches: Measure,
	actual_total_inches: Measure,
	difference_inches: Measure,
	pixel_length: Value,
	inches_on_drawing: Value,
}

impl Grader for LenientMeasurementGrader {
	fn name(&self) -> &'static str {
		"lenient_measurement"
	}

	fn grade(&self, output: &str, _context: &GradingContext) -> Result<GradingResult, GradeError> {
		let parsed: Value = serde_json::from_str(extract_json(output))?;
		let items = parsed.as_array().ok_or(GradeError::NotAnArray { found: json_kind(&parsed) })?;
		let first = items.first().ok_or(GradeError::EmptyArray)?;
		let obj = first.as_object().ok_or(GradeError::NotAnObject { found: json_kind(first) })?;

		let feet = required(obj, "feet")?;
		let inches = required(obj, "inches")?;
		let pixel_length = echoed_or_zero(obj, "pixel_length");
		let inches_on_drawing = echoed_or_zero(obj, "inches_on_drawing");

		let total_inches = feet * INCHES_PER_FOOT + inches;
		let actual_total_inches = Measure::Float(self.reference.total_inches);
		let difference = total_inches.abs_diff(actual_total_inches);
		let passed = difference.as_f64() <= self.reference.tolerance_inches;

		let diagnostics = LenientDiagnostics {
			measured_feet: feet,
			measured_inches: inches,
			measured_total_inches: total_inches,
			actual_total_inches,
			difference_inches: difference,
			pixel_length,
			inches_on_drawing,
		};
		let details = serde_json::to_string_pretty(&diagnostics).map_err(GradeError::Diagnostics)?;

		tracing::debug!(
			grader = self.name(),
			passed,
			total_inches = total_inches.as_f64(),
			difference = difference.as_f64(),
			"graded measurement"
		);

		Ok(GradingResult::new(
			passed,
			format!(
				"Measured {} in vs actual {} in, difference {:.2} in ({} - tolerance: <= {} in)\n\n{}",
				total_inches,
				actual_total_inches,
				difference.as_f64(),
				if passed { "PASS" } else { "FAIL" },
				self.reference.tolerance_inches,
				details
			),
		))
	}
}
