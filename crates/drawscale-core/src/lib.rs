//! drawscale-core: prompt formatting and output grading for drawing-scale evals.
//! Build a provider-specific image prompt, send it, then grade the model's
//! measurement with one of the graders.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod grader;
pub mod measure;
pub mod prompt;

pub mod graders {
	pub mod lenient;
	pub mod strict;
}

pub use config::{GraderConfig, LenientReference, StrictReference};
pub use error::{FetchError, GradeError, PromptError};
pub use extract::extract_json;
pub use fetch::{EncodedImage, HttpImageFetcher, ImageFetcher};
pub use grader::Grader;
pub use graders::{lenient::LenientMeasurementGrader, strict::StrictMeasurementGrader};
pub use measure::Measure;
pub use prompt::{provider_family, PromptFormatter, ProviderFamily, CUSTOM_OPENAI_LABEL, MEASUREMENT_PROMPT};

pub use drawscale_types::{
	GradingContext, GradingResult, PromptContext, PromptMessage, PromptVars, ProviderInfo,
};
