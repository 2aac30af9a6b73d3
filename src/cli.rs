//! Command-line argument parsing for tabchat.

use clap::Parser;
use std::path::PathBuf;

/// Ask natural-language questions over a spreadsheet, answered by a local LLM.
#[derive(Parser, Debug)]
#[command(name = "tabchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the data file (csv, xlsx, xls, xlsb, or ods)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Model to use (overrides config)
    #[arg(short, long, value_name = "MODEL", env = "OLLAMA_MODEL")]
    pub model: Option<String>,

    /// Ollama base URL (overrides config)
    #[arg(short, long, value_name = "URL", env = "OLLAMA_URL")]
    pub url: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer a single question and exit instead of starting the loop
    #[arg(short, long, value_name = "QUESTION")]
    pub question: Option<String>,

    /// LLM provider to use: "ollama" or "mock" (overrides config)
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_args() {
        let cli = Cli::parse_from(["tabchat", "patients.xlsx"]);
        assert_eq!(cli.data_file, PathBuf::from("patients.xlsx"));
        assert!(cli.question.is_none());
        assert!(cli.llm.is_none());
    }

    #[test]
    fn test_one_shot_question() {
        let cli = Cli::parse_from(["tabchat", "data.csv", "-q", "How many rows?"]);
        assert_eq!(cli.question.as_deref(), Some("How many rows?"));
    }

    #[test]
    fn test_provider_override() {
        let cli = Cli::parse_from(["tabchat", "data.csv", "--llm", "mock"]);
        assert_eq!(cli.llm.as_deref(), Some("mock"));
    }

    #[test]
    fn test_model_and_url_flags() {
        let cli = Cli::parse_from([
            "tabchat",
            "data.csv",
            "--model",
            "codellama",
            "--url",
            "http://workstation:11434",
        ]);
        assert_eq!(cli.model.as_deref(), Some("codellama"));
        assert_eq!(cli.url.as_deref(), Some("http://workstation:11434"));
    }
}
