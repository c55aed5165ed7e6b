use drawscale_types::{GradingContext, GradingResult};
use serde::Serialize;
use serde_json::Value;

use crate::config::StrictReference;
use crate::error::{json_kind, GradeError};
use crate::extract::extract_json;
use crate::grader::Grader;
use crate::measure::{echoed, optional, point, Measure, Point};

/// Grades a single measurement object by its pixel length.
///
/// Expects `{feet, inches, pixel_length?, start_coordinates, end_coordinates}`.
/// The y-coordinate offsets of both edges are reported in the diagnostics but
/// only the pixel-length difference decides pass/fail. `feet`, `inches` and the
/// x coordinates are echoed as written and may hold any JSON value.
pub struct StrictMeasurementGrader {
	reference: StrictReference,
}

impl StrictMeasurementGrader {
	pub fn new() -> Self {
		Self::with_reference(StrictReference::default())
	}

	pub fn with_reference(reference: StrictReference) -> Self {
		Self { reference }
	}
}

impl Default for StrictMeasurementGrader {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug, Serialize)]
struct StrictDiagnostics {
	measured_feet: Value,
	measured_inches: Value,
	measured_pixel_length: Measure,
	actual_pixel_length: Measure,
	pixel_difference: Measure,
	start_coordinates: EdgeDiagnostics,
	end_coordinates: EdgeDiagnostics,
	total_y_difference: Measure,
}

#[derive(Debug, Serialize)]
struct EdgeDiagnostics {
	measured: Vec<Value>,
	actual: (Value, Measure),
	y_difference: Measure,
}

impl EdgeDiagnostics {
	fn new(point: Point, reference_y: i64) -> Self {
		let actual_y = Measure::Int(reference_y);
		Self {
			y_difference: point.y.abs_diff(actual_y),
			actual: (point.x, actual_y),
			measured: point.measured,
		}
	}
}

impl Grader for StrictMeasurementGrader {
	fn name(&self) -> &'static str {
		"strict_measurement"
	}

	fn grade(&self, output: &str, _context: &GradingContext) -> Result<GradingResult, GradeError> {
		let parsed: Value = serde_json::from_str(extract_json(output))?;
		let obj = parsed.as_object().ok_or(GradeError::NotAnObject { found: json_kind(&parsed) })?;

		let feet = echoed(obj, "feet")?;
		let inches = echoed(obj, "inches")?;
		let pixel_length = optional(obj, "pixel_length")?;
		let start = point(obj, "start_coordinates")?;
		let end = point(obj, "end_coordinates")?;

		let actual_pixel_length = Measure::Int(self.reference.pixel_length);
		let pixel_difference = pixel_length.abs_diff(actual_pixel_length);
		let start_coordinates = EdgeDiagnostics::new(start, self.reference.start_y);
		let end_coordinates = EdgeDiagnostics::new(end, self.reference.end_y);
		let total_y_difference = start_coordinates.y_difference + end_coordinates.y_difference;

		let passed = pixel_difference.as_f64() < self.reference.pixel_tolerance;

		let diagnostics = StrictDiagnostics {
			measured_feet: feet,
			measured_inches: inches,
			measured_pixel_length: pixel_length,
			actual_pixel_length,
			pixel_difference,
			start_coordinates,
			end_coordinates,
			total_y_difference,
		};
		let details = serde_json::to_string_pretty(&diagnostics).map_err(GradeError::Diagnostics)?;

		tracing::debug!(
			grader = self.name(),
			passed,
			pixel_difference = pixel_difference.as_f64(),
			total_y_difference = total_y_difference.as_f64(),
			"graded measurement"
		);

		Ok(GradingResult::new(
			passed,
			format!(
				"Pixel difference: {:.2} px ({} - tolerance: < {} px)\n\n{}",
				pixel_difference.as_f64(),
				if passed { "PASS" } else { "FAIL" },
				self.reference.pixel_tolerance,
				details
			),
		))
	}
}
