//! Output formatters for evaluation results

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::EvaluationResult;
use colored::Colorize;
use std::path::Path;

/// Trait for rendering an evaluation result
pub trait OutputFormatter {
    fn format_result(&self, result: &EvaluationResult) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter; the verdict is printed exactly as the model returned it
pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &EvaluationResult) -> Result<String> {
        let header = "✅ Evaluation Complete";
        let meta = format!("model: {} • {}ms", result.model, result.elapsed_ms);

        let (header, meta) = if self.use_colors {
            (header.green().bold().to_string(), meta.dimmed().to_string())
        } else {
            (header.to_string(), meta)
        };

        Ok(format!("{}\n{}\n\n{}\n", header, meta, result.verdict))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &EvaluationResult) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_result(&self, result: &EvaluationResult) -> Result<String> {
        Ok(format!(
            "# ICP Fit Evaluation\n\n_Model: {} | Evaluated: {} | {}ms_\n\n{}\n",
            result.model,
            result.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            result.elapsed_ms,
            result.verdict
        ))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Picks the formatter for a format and writes saved reports
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new(use_colors: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate(&self, format: OutputFormat, result: &EvaluationResult) -> Result<String> {
        self.formatter(format).format_result(result)
    }

    /// Saves without terminal colors regardless of the console setting.
    pub fn save(&self, format: OutputFormat, result: &EvaluationResult, path: &Path) -> Result<()> {
        let content = match format {
            OutputFormat::Console => ConsoleFormatter::new(false).format_result(result)?,
            other => self.generate(other, result)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        log::info!("Saved evaluation to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> EvaluationResult {
        EvaluationResult::new(
            "Fit Status: Fit\nReason: **strong** match.".to_string(),
            "gemini-2.5-flash".to_string(),
            840,
        )
    }

    #[test]
    fn test_console_output_keeps_verdict_verbatim() {
        let out = ConsoleFormatter::new(false).format_result(&sample()).unwrap();
        assert!(out.starts_with("✅ Evaluation Complete\nmodel: gemini-2.5-flash"));
        assert!(out.contains("Fit Status: Fit\nReason: **strong** match."));
    }

    #[test]
    fn test_json_output_roundtrips() {
        let result = sample();
        let out = JsonFormatter::new(true).format_result(&result).unwrap();
        let parsed: EvaluationResult = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_markdown_has_title_and_verdict() {
        let out = MarkdownFormatter.format_result(&sample()).unwrap();
        assert!(out.starts_with("# ICP Fit Evaluation"));
        assert!(out.contains("Reason: **strong** match."));
    }

    #[test]
    fn test_generator_dispatches_by_format() {
        let generator = ReportGenerator::new(false);
        for format in [OutputFormat::Console, OutputFormat::Json, OutputFormat::Markdown] {
            assert_eq!(generator.formatter(format).supports_format(), format);
        }
    }

    #[test]
    fn test_save_writes_uncolored_console_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("verdict.txt");

        ReportGenerator::new(true)
            .save(OutputFormat::Console, &sample(), &path)
            .unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("✅ Evaluation Complete\n"));
        assert!(!saved.contains('\u{1b}'));
    }
}
