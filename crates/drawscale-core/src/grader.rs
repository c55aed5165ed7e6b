use drawscale_types::{GradingContext, GradingResult};

use crate::error::GradeError;

pub trait Grader: Send + Sync {
	fn name(&self) -> &'static str;
	fn grade(&self, output: &str, context: &GradingContext) -> Result<GradingResult, GradeError>;
}
