//! `pipecheck list`: show the cases without running them.

use pipecheck_core::{HarnessConfig, TestCase, default_cases, filter_cases};

use crate::cli::ListArgs;
use crate::error::CliResult;
use pipecheck_core::CoreError;

pub fn list_cases(args: &ListArgs, config: &HarnessConfig) -> Vec<TestCase> {
    filter_cases(default_cases(config), &args.pipelines, &args.cases)
}

/// Renders the case list as text lines or a JSON array.
pub fn render_cases(cases: &[TestCase], json: bool) -> CliResult<String> {
    if json {
        return serde_json::to_string_pretty(cases)
            .map_err(|e| CoreError::OperationFailed(format!("Failed to serialize cases: {}", e)));
    }

    let lines: Vec<String> = cases
        .iter()
        .map(|case| {
            format!(
                "{:<48} {} {}  (expects {} in {})",
                case.name,
                case.script.display(),
                case.args.join(" "),
                case.expectation.describe(),
                case.expectation.stream
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipecheck_core::Pipeline;

    #[test]
    fn test_render_text_lists_each_case() {
        let args = ListArgs {
            pipelines: vec![Pipeline::Detection],
            cases: vec![],
            json: false,
        };
        let cases = list_cases(&args, &HarnessConfig::default());
        let text = render_cases(&cases, false).unwrap();

        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("invalid_video_input[detection]"));
        assert!(text.contains("\"Can't typefind stream\" in stdout"));
    }

    #[test]
    fn test_render_json_is_an_array() {
        let args = ListArgs {
            pipelines: vec![],
            cases: vec![],
            json: true,
        };
        let cases = list_cases(&args, &HarnessConfig::default());
        let json = render_cases(&cases, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 6);
        assert_eq!(value[5]["pipeline"], "face_recognition");
        assert_eq!(value[5]["expectation"]["exit"], "failure");
    }
}
