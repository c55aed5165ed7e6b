use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use drawscale_core::{
	Grader, GraderConfig, GradingContext, LenientMeasurementGrader, PromptContext, PromptFormatter,
	ProviderInfo, StrictMeasurementGrader,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "drawscale", about = "Build drawing-measurement prompts and grade model output")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Print the provider-specific message list as JSON
	Prompt(PromptArgs),
	/// Grade a model output and print the grading result
	Grade(GradeArgs),
}

#[derive(Debug, Clone, Parser)]
struct PromptArgs {
	/// JSON file with the framework context: { "vars": { "image_url": .. }, "provider": { "id": .., "label"?: .. } }
	#[arg(long, conflicts_with_all = ["provider_id", "image_url", "label"])]
	context: Option<PathBuf>,

	/// Provider id, e.g. anthropic:messages:claude-3-5-sonnet
	#[arg(long, required_unless_present = "context")]
	provider_id: Option<String>,

	/// Provider label
	#[arg(long)]
	label: Option<String>,

	/// Image to measure
	#[arg(long, required_unless_present = "context")]
	image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraderKind {
	/// Single object, graded on pixel length
	Strict,
	/// Array of measurements, graded on total inches
	Lenient,
}

#[derive(Debug, Clone, Parser)]
struct GradeArgs {
	#[arg(long, value_enum)]
	grader: GraderKind,

	/// File holding the raw model output (reads stdin when omitted)
	#[arg(long)]
	output: Option<PathBuf>,

	/// JSON file with the grading context passed through from the framework
	#[arg(long)]
	context: Option<PathBuf>,

	/// YAML or JSON file overriding the reference measurements
	#[arg(long)]
	config: Option<PathBuf>,

	/// Print a summary table instead of JSON
	#[arg(long, action = ArgAction::SetTrue)]
	table: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.without_time()
		.init();

	let cli = Cli::parse();
	match cli.command {
		Commands::Prompt(args) => prompt(args).await?,
		Commands::Grade(args) => grade(args).await?,
	}
	Ok(())
}

async fn prompt(args: PromptArgs) -> Result<()> {
	let context = match args.context {
		Some(path) => read_json::<PromptContext>(&path).await?,
		None => {
			let id = args.provider_id.context("--provider-id is required")?;
			let image_url = args.image_url.context("--image-url is required")?;
			let provider = ProviderInfo { id, label: args.label };
			PromptContext::new(provider, image_url)
		}
	};

	let messages = PromptFormatter::http().format(&context).await?;
	println!("{}", serde_json::to_string_pretty(&messages)?);
	Ok(())
}

async fn grade(args: GradeArgs) -> Result<()> {
	let config = match &args.config {
		Some(path) => GraderConfig::load(path).await?,
		None => GraderConfig::default(),
	};

	let grader: Box<dyn Grader> = match args.grader {
		GraderKind::Strict => Box::new(StrictMeasurementGrader::with_reference(config.strict)),
		GraderKind::Lenient => Box::new(LenientMeasurementGrader::with_reference(config.lenient)),
	};

	let context = match &args.context {
		Some(path) => read_json::<GradingContext>(path).await?,
		None => GradingContext::default(),
	};

	let output = match &args.output {
		Some(path) => tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("Failed to read {:?}", path))?,
		None => read_output(tokio::io::stdin())
			.await
			.context("Failed to read model output from stdin")?,
	};

	let result = grader
		.grade(&output, &context)
		.with_context(|| format!("{} grader rejected the output", grader.name()))?;

	if args.table {
		print!("{}", result.summary_table());
	} else {
		println!("{}", serde_json::to_string_pretty(&result)?);
	}
	Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
	let content = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Failed to read {:?}", path))?;
	serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

async fn read_output<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
	let mut buf = String::new();
	reader.read_to_string(&mut buf).await?;
	Ok(buf)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_read_output_from_async_reader() {
		let text = "```json\n[{\"feet\": 17, \"inches\": 7}]\n```\n";
		let output = read_output(text.as_bytes()).await.unwrap();
		assert_eq!(output, text);
	}

	#[tokio::test]
	async fn test_read_json_takes_a_path() {
		let path = std::env::temp_dir().join(format!("drawscale-context-{}.json", std::process::id()));
		tokio::fs::write(&path, r#"{"vars": {"image_url": "https://example.com/rect.png"}, "provider": {"id": "openai:gpt-4.1"}}"#)
			.await
			.unwrap();

		let ctx: PromptContext = read_json(path.as_path()).await.unwrap();
		tokio::fs::remove_file(&path).await.unwrap();

		assert_eq!(ctx.provider.id, "openai:gpt-4.1");
		assert_eq!(ctx.vars.image_url, "https://example.com/rect.png");
	}

	#[tokio::test]
	async fn test_read_json_missing_file() {
		let err = read_json::<GradingContext>(Path::new("/nonexistent/context.json")).await.unwrap_err();
		assert!(err.to_string().contains("Failed to read"));
	}
}
