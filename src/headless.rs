//! Subcommands that talk to the backend without starting the TUI.
//!
//! Results are printed to stdout as plain text; progress goes through
//! `tracing` (stderr in headless mode).

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{
    AnalyzeRequest, AnalyzeResponse, ApiClient, DocumentRequest, DocumentResponse, FunctionDoc,
    HealthResponse, ProvidersResponse, ReviewsListResponse, ReviewsQuery, Severity,
};
use crate::config::Config;
use crate::editor;
use crate::format::{format_score, format_timestamp, score_badge, truncate, ScoreGrade};
use crate::language::{DocStyle, Language};

/// Terminal columns for an issue description, ellipsis included.
const DESCRIPTION_WIDTH: usize = 53;
const SHORT_ID_LEN: usize = 8;

/// Arguments shared by `analyze` and `document`.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub path: PathBuf,
    /// Detected from the file extension when absent.
    pub language: Option<Language>,
    /// Falls back to the configured default provider.
    pub provider: Option<String>,
    /// Save the raw JSON response here.
    pub output: Option<PathBuf>,
}

struct SourceFile {
    code: String,
    language: Language,
    filename: Option<String>,
    provider: Option<String>,
}

impl SubmitOptions {
    fn load(&self, config: &Config) -> Result<SourceFile> {
        let code = editor::read_code_file(&self.path)?;
        let language = self
            .language
            .unwrap_or_else(|| Language::detect(&self.path));
        let provider = self
            .provider
            .clone()
            .or_else(|| Some(config.default_provider.clone()))
            .filter(|p| !p.trim().is_empty());
        Ok(SourceFile {
            code,
            language,
            filename: self
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string),
            provider,
        })
    }
}

pub async fn run_analyze(client: &ApiClient, config: &Config, options: &SubmitOptions) -> Result<()> {
    let source = options.load(config)?;
    tracing::info!(
        path = %options.path.display(),
        language = %source.language,
        "analyzing"
    );

    let request = AnalyzeRequest {
        code: source.code,
        language: source.language,
        filename: source.filename,
        llm_provider: source.provider,
    };
    let response = client.analyze(&request).await.context("Analysis failed")?;

    println!("{}", format_analysis(&response));
    if let Some(ref output) = options.output {
        save_json(output, &response)?;
        println!("\nResults saved to {}", output.display());
    }
    Ok(())
}

pub async fn run_document(
    client: &ApiClient,
    config: &Config,
    options: &SubmitOptions,
    style: DocStyle,
) -> Result<()> {
    let source = options.load(config)?;
    tracing::info!(
        path = %options.path.display(),
        language = %source.language,
        %style,
        "generating documentation"
    );

    let request = DocumentRequest {
        code: source.code,
        language: source.language,
        filename: source.filename,
        doc_style: Some(style),
        llm_provider: source.provider,
    };
    let response = client
        .document(&request)
        .await
        .context("Documentation failed")?;

    println!("{}", format_documentation(&response));
    if let Some(ref output) = options.output {
        save_json(output, &response)?;
        println!("\nDocumentation saved to {}", output.display());
    }
    Ok(())
}

pub async fn run_history(
    client: &ApiClient,
    page: u32,
    limit: u32,
    language: Option<&str>,
) -> Result<()> {
    tracing::info!(page, limit, ?language, "fetching review history");
    let query = ReviewsQuery::new(page, limit, language);
    let list = client
        .list_reviews(&query)
        .await
        .context("Failed to fetch review history")?;
    println!("{}", format_history(&list));
    Ok(())
}

pub async fn run_review(client: &ApiClient, review_id: &str, output: Option<&Path>) -> Result<()> {
    let response = client
        .get_review(review_id)
        .await
        .with_context(|| format!("Failed to fetch review {}", review_id))?;
    println!("{}", format_analysis(&response));
    if let Some(output) = output {
        save_json(output, &response)?;
        println!("\nResults saved to {}", output.display());
    }
    Ok(())
}

pub async fn run_delete(client: &ApiClient, review_id: &str) -> Result<()> {
    client
        .delete_review(review_id)
        .await
        .with_context(|| format!("Failed to delete review {}", review_id))?;
    println!("Deleted review {}", review_id);
    Ok(())
}

pub async fn run_providers(client: &ApiClient) -> Result<()> {
    let providers = client
        .list_providers()
        .await
        .context("Failed to fetch providers")?;
    println!("{}", format_providers(&providers));
    Ok(())
}

pub async fn run_health(client: &ApiClient) -> Result<()> {
    let health = client.health().await.context("Health check failed")?;
    println!("{}", format_health(client.base_url().as_str(), &health));
    Ok(())
}

pub fn run_config(config: &Config, client: &ApiClient) {
    println!("{}", format_config(config, &client.docs_url()));
}

/// Human-readable review (no JSON).
pub fn format_analysis(response: &AnalyzeResponse) -> String {
    let analysis = &response.analysis;
    let grade = match ScoreGrade::from_score(analysis.quality_score) {
        ScoreGrade::Good => "good",
        ScoreGrade::Fair => "fair",
        ScoreGrade::Poor => "poor",
    };

    let mut lines = vec![
        format!("[Review {}] {}", response.review_id, response.language),
        format!(
            "Quality Score: {} ({})",
            score_badge(analysis.quality_score),
            grade
        ),
        String::new(),
        "Summary:".to_string(),
        format!("  {}", analysis.summary),
    ];

    if !analysis.security_concerns.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Security Concerns ({}):",
            analysis.security_concerns.len()
        ));
        for concern in &analysis.security_concerns {
            lines.push(format!(
                "  - [{}] {}",
                Severity::from(concern.severity).label(),
                concern.title
            ));
            lines.push(format!("    {}", concern.description));
            lines.push(format!("    Recommendation: {}", concern.recommendation));
        }
    }

    if !analysis.issues.is_empty() {
        lines.push(String::new());
        lines.push(format!("Issues ({}):", analysis.issues.len()));
        for issue in &analysis.issues {
            let line = issue
                .line_number
                .map(|n| format!("line {}", n))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "  - [{}] {} ({}): {}",
                issue.severity.label(),
                issue.category,
                line,
                truncate(&issue.description, DESCRIPTION_WIDTH)
            ));
        }
    }

    if !analysis.suggestions.is_empty() {
        lines.push(String::new());
        lines.push("Suggestions:".to_string());
        for (i, suggestion) in analysis.suggestions.iter().enumerate() {
            lines.push(format!(
                "  {}. {} ({} priority)",
                i + 1,
                suggestion.title,
                suggestion.priority.label()
            ));
            lines.push(format!("     {}", suggestion.description));
        }
    }

    lines.join("\n")
}

pub fn format_documentation(response: &DocumentResponse) -> String {
    let docs = &response.documentation;
    let mut lines = vec![
        format!("[Documentation {}] {}", response.doc_id, response.language),
        String::new(),
        "Overview:".to_string(),
        format!("  {}", docs.overview),
    ];

    if !docs.functions.is_empty() {
        lines.push(String::new());
        lines.push("Functions:".to_string());
        for function in &docs.functions {
            push_function(&mut lines, function, "  ");
        }
    }

    if !docs.classes.is_empty() {
        lines.push(String::new());
        lines.push("Classes:".to_string());
        for class in &docs.classes {
            lines.push(format!("  {}", class.name));
            lines.push(format!("    {}", class.description));
            for method in &class.methods {
                push_function(&mut lines, method, "    ");
            }
        }
    }

    if !docs.usage_examples.is_empty() {
        lines.push(String::new());
        lines.push("Usage Examples:".to_string());
        for example in &docs.usage_examples {
            lines.extend(example.lines().map(|l| format!("  {}", l)));
            lines.push(String::new());
        }
        // drop the separator after the last example
        lines.pop();
    }

    lines.join("\n")
}

fn push_function(lines: &mut Vec<String>, function: &FunctionDoc, indent: &str) {
    lines.push(format!("{}{}()", indent, function.name));
    lines.push(format!("{}  {}", indent, function.description));
    if !function.parameters.is_empty() {
        lines.push(format!("{}  Parameters:", indent));
        for param in &function.parameters {
            lines.push(format!(
                "{}    - {} ({}): {}",
                indent, param.name, param.type_name, param.description
            ));
        }
    }
    if let Some(ref returns) = function.returns {
        lines.push(format!(
            "{}  Returns: {} - {}",
            indent, returns.type_name, returns.description
        ));
    }
}

pub fn format_history(list: &ReviewsListResponse) -> String {
    if list.reviews.is_empty() {
        return "No reviews found".to_string();
    }

    let mut lines = vec![format!(
        "{:<10} {:<11} {:>7}  {:<16}  {}",
        "ID", "LANGUAGE", "SCORE", "DATE", "FILENAME"
    )];
    for review in &list.reviews {
        let short_id: String = review.review_id.chars().take(SHORT_ID_LEN).collect();
        let score = review
            .quality_score
            .map(|s| format!("{}/10", format_score(s)))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<10} {:<11} {:>7}  {:<16}  {}",
            short_id,
            review.language,
            score,
            format_timestamp(&review.created_at),
            review.filename.as_deref().unwrap_or("-")
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Page {} of {} ({} reviews)",
        list.pagination.page,
        list.pagination.last_page(),
        list.pagination.total
    ));
    lines.join("\n")
}

pub fn format_providers(response: &ProvidersResponse) -> String {
    if response.providers.is_empty() {
        return "No providers configured".to_string();
    }
    response
        .providers
        .iter()
        .map(|p| {
            let marker = if p.default { " (default)" } else { "" };
            let models = if p.models.is_empty() {
                String::new()
            } else {
                format!(": {}", p.models.join(", "))
            };
            format!("{:<10} {}{}{}", p.id, p.name, marker, models)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_health(base_url: &str, health: &HealthResponse) -> String {
    let mut line = format!("{}: {}", base_url, health.status().unwrap_or("unknown"));
    if let Some(version) = health.version() {
        line.push_str(&format!(" (version {})", version));
    }
    line
}

pub fn format_config(config: &Config, docs_url: &str) -> String {
    let config_file = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    [
        format!("API URL:              {}", config.api_url),
        format!("Default LLM Provider: {}", config.default_provider),
        format!("Page limit:           {}", config.page_limit),
        format!("Theme:                {}", config.theme),
        format!(
            "Editor:               {}",
            config.editor.as_deref().unwrap_or("$VISUAL / $EDITOR / vi")
        ),
        format!("API docs:             {}", docs_url),
        format!("Config file:          {}", config_file),
        String::new(),
        "Environment overrides:".to_string(),
        "  CODDOC_API_URL       API endpoint URL".to_string(),
        "  CODDOC_LLM_PROVIDER  Default LLM provider".to_string(),
    ]
    .join("\n")
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved response");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        Analysis, CodeIssue, Documentation, FieldDoc, LlmProvider, Pagination, Priority,
        ReturnDoc, ReviewSummary, SecurityConcern, SecuritySeverity, Suggestion,
    };

    fn analysis_response(score: f64) -> AnalyzeResponse {
        AnalyzeResponse {
            review_id: "0f1e2d3c-aaaa".to_string(),
            code: "print(1)".to_string(),
            language: "python".to_string(),
            filename: Some("main.py".to_string()),
            analysis: Analysis {
                summary: "Small script".to_string(),
                quality_score: score,
                issues: vec![CodeIssue {
                    severity: Severity::Medium,
                    category: "style".to_string(),
                    description: "x".repeat(60),
                    line_number: Some(3),
                    suggestion: String::new(),
                }],
                suggestions: vec![Suggestion {
                    title: "Add a main guard".to_string(),
                    description: "Wrap the call".to_string(),
                    code_example: None,
                    priority: Priority::Low,
                }],
                security_concerns: vec![SecurityConcern {
                    severity: SecuritySeverity::High,
                    title: "eval".to_string(),
                    description: "Arbitrary code".to_string(),
                    recommendation: "Remove it".to_string(),
                }],
            },
            created_at: "2024-03-01T12:30:00Z".to_string(),
        }
    }

    #[test]
    fn test_format_analysis() {
        let text = format_analysis(&analysis_response(7.95));
        assert!(text.contains("Quality Score: 8.0/10 (fair)"));
        assert!(text.contains("Security Concerns (1):"));
        assert!(text.contains("Recommendation: Remove it"));
        assert!(text.contains("(line 3)"));
        assert!(text.contains(&format!("{}...", "x".repeat(50))));
        assert!(text.contains("1. Add a main guard (low priority)"));
        assert!(!text.contains("\"summary\""));
    }

    #[test]
    fn test_format_analysis_cuts_wide_descriptions_by_width() {
        let mut response = analysis_response(9.0);
        response.analysis.issues[0].description = "漢".repeat(40);
        let text = format_analysis(&response);

        // 25 double-width chars fill 50 columns, leaving room for "..."
        assert!(text.contains(&format!("{}...", "漢".repeat(25))));
        assert!(!text.contains(&"漢".repeat(26)));
    }

    #[test]
    fn test_format_analysis_without_findings() {
        let mut response = analysis_response(9.2);
        response.analysis.issues.clear();
        response.analysis.suggestions.clear();
        response.analysis.security_concerns.clear();
        let text = format_analysis(&response);
        assert!(text.contains("9.2/10 (good)"));
        assert!(!text.contains("Issues"));
        assert!(!text.contains("Suggestions"));
    }

    #[test]
    fn test_format_documentation() {
        let response = DocumentResponse {
            doc_id: "d1".to_string(),
            code: String::new(),
            language: "python".to_string(),
            documentation: Documentation {
                overview: "Adds numbers".to_string(),
                functions: vec![FunctionDoc {
                    name: "add".to_string(),
                    description: "Sum".to_string(),
                    parameters: vec![FieldDoc {
                        name: "a".to_string(),
                        type_name: "int".to_string(),
                        description: "left".to_string(),
                    }],
                    returns: Some(ReturnDoc {
                        type_name: "int".to_string(),
                        description: "the sum".to_string(),
                    }),
                    examples: vec![],
                }],
                classes: vec![],
                usage_examples: vec!["add(1, 2)\nadd(3, 4)".to_string()],
            },
            created_at: "2024-03-01T12:30:00Z".to_string(),
        };
        let text = format_documentation(&response);
        assert!(text.contains("Overview:\n  Adds numbers"));
        assert!(text.contains("  add()"));
        assert!(text.contains("    - a (int): left"));
        assert!(text.contains("Returns: int - the sum"));
        assert!(text.ends_with("  add(1, 2)\n  add(3, 4)"));
    }

    #[test]
    fn test_format_history() {
        let list = ReviewsListResponse {
            reviews: vec![
                ReviewSummary {
                    review_id: "abcdef0123456789".to_string(),
                    language: "go".to_string(),
                    quality_score: Some(5.999),
                    created_at: "2024-03-01T12:30:00".to_string(),
                    filename: None,
                },
                ReviewSummary {
                    review_id: "r2".to_string(),
                    language: "java".to_string(),
                    quality_score: None,
                    created_at: "not a date".to_string(),
                    filename: Some("App.java".to_string()),
                },
            ],
            pagination: Pagination {
                page: 2,
                limit: 2,
                total: 5,
                pages: 3,
            },
        };
        let text = format_history(&list);
        assert!(text.contains("abcdef01 "));
        assert!(!text.contains("abcdef012"));
        assert!(text.contains("6.0/10"));
        assert!(text.contains("not a date"));
        assert!(text.contains("App.java"));
        assert!(text.ends_with("Page 2 of 3 (5 reviews)"));
    }

    #[test]
    fn test_format_history_empty() {
        let list = ReviewsListResponse {
            reviews: vec![],
            pagination: Pagination {
                page: 1,
                limit: 10,
                total: 0,
                pages: 0,
            },
        };
        assert_eq!(format_history(&list), "No reviews found");
    }

    #[test]
    fn test_format_providers_marks_default() {
        let response = ProvidersResponse {
            providers: vec![
                LlmProvider {
                    id: "gemini".to_string(),
                    name: "Google Gemini".to_string(),
                    models: vec!["gemini-1.5-pro".to_string()],
                    default: true,
                },
                LlmProvider {
                    id: "openai".to_string(),
                    name: "OpenAI".to_string(),
                    models: vec![],
                    default: false,
                },
            ],
        };
        let text = format_providers(&response);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "gemini     Google Gemini (default): gemini-1.5-pro");
        assert_eq!(lines[1], "openai     OpenAI");
    }

    #[test]
    fn test_format_health() {
        let health = HealthResponse(serde_json::json!({"status": "healthy", "version": "1.0.0"}));
        assert_eq!(
            format_health("http://localhost:8000/", &health),
            "http://localhost:8000/: healthy (version 1.0.0)"
        );
        let bare = HealthResponse(serde_json::json!({}));
        assert_eq!(format_health("http://x/", &bare), "http://x/: unknown");
    }

    #[test]
    fn test_format_config_lists_docs_and_env() {
        let text = format_config(&Config::default(), "http://localhost:8000/docs");
        assert!(text.contains("API URL:              http://localhost:8000"));
        assert!(text.contains("Default LLM Provider: gemini"));
        assert!(text.contains("API docs:             http://localhost:8000/docs"));
        assert!(text.contains("CODDOC_LLM_PROVIDER"));
    }

    #[test]
    fn test_submit_options_detect_language_and_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        fs::write(&path, "fn main() {}\n").unwrap();

        let options = SubmitOptions {
            path: path.clone(),
            language: None,
            provider: None,
            output: None,
        };
        let source = options.load(&Config::default()).unwrap();
        assert_eq!(source.language, Language::Rust);
        assert_eq!(source.filename.as_deref(), Some("lib.rs"));
        assert_eq!(source.provider.as_deref(), Some("gemini"));

        let explicit = SubmitOptions {
            language: Some(Language::Go),
            provider: Some("openai".to_string()),
            ..options
        };
        let source = explicit.load(&Config::default()).unwrap();
        assert_eq!(source.language, Language::Go);
        assert_eq!(source.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_unknown_extension_defaults_to_python() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        fs::write(&path, "x = 1\n").unwrap();
        let options = SubmitOptions {
            path,
            language: None,
            provider: None,
            output: None,
        };
        assert_eq!(options.load(&Config::default()).unwrap().language, Language::Python);
    }

    #[test]
    fn test_save_json_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_json(&path, &analysis_response(9.0)).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"review_id\""));
        let back: AnalyzeResponse = serde_json::from_str(&written).unwrap();
        assert_eq!(back.analysis.quality_score, 9.0);
    }
}
