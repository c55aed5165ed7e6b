use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Reference values the graders compare against. Every field defaults to the
/// values for the red-rectangle drawing, so an empty config changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
	#[serde(default)]
	pub strict: StrictReference,
	#[serde(default)]
	pub lenient: LenientReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrictReference {
	#[serde(default = "default_pixel_length")]
	pub pixel_length: i64,
	#[serde(default = "default_start_y")]
	pub start_y: i64,
	#[serde(default = "default_end_y")]
	pub end_y: i64,
	/// Exclusive upper bound on the pixel-length difference.
	#[serde(default = "default_pixel_tolerance")]
	pub pixel_tolerance: f64,
}

fn default_pixel_length() -> i64 {
	83
}

fn default_start_y() -> i64 {
	1051
}

fn default_end_y() -> i64 {
	1134
}

fn default_pixel_tolerance() -> f64 {
	5.0
}

impl Default for StrictReference {
	fn default() -> Self {
		Self {
			pixel_length: default_pixel_length(),
			start_y: default_start_y(),
			end_y: default_end_y(),
			pixel_tolerance: default_pixel_tolerance(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenientReference {
	#[serde(default = "default_total_inches")]
	pub total_inches: f64,
	/// Inclusive upper bound on the total-inches difference.
	#[serde(default = "default_inch_tolerance")]
	pub tolerance_inches: f64,
}

fn default_total_inches() -> f64 {
	211.0
}

fn default_inch_tolerance() -> f64 {
	6.0
}

impl Default for LenientReference {
	fn default() -> Self {
		Self {
			total_inches: default_total_inches(),
			tolerance_inches: default_inch_tolerance(),
		}
	}
}

impl GraderConfig {
	/// Reads a config file; `.json` files are parsed as JSON, anything else as YAML.
	pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("Failed to read {:?}", path))?;
		let is_json = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

		if is_json {
			serde_json::from_str(&content).with_context(|| format!("Invalid JSON config in {:?}", path))
		} else {
			Self::from_yaml_str(&content).with_context(|| format!("Invalid YAML config in {:?}", path))
		}
	}

	pub fn from_yaml_str(content: &str) -> Result<Self> {
		// An empty YAML document deserializes to unit, not an empty map.
		if content.trim().is_empty() {
			return Ok(Self::default());
		}
		Ok(serde_yaml::from_str(content)?)
	}
}
