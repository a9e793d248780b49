use anyhow::{Context, Result};

/// Per-artifact credentials for the AI workflow engine. Each generation kind
/// runs as its own workflow with its own API key.
#[derive(Debug, Clone)]
pub struct WorkflowKeys {
    pub profile_summary: String,
    pub strengths: String,
    pub improvements: String,
    pub college_list: String,
    pub college_why: String,
    pub strategies: String,
    pub schedule: String,
    pub essay_brainstorm: String,
    pub activities_improver: String,
    pub counselor: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub workflow_url: String,
    pub chatflow_url: String,
    pub workflow_keys: WorkflowKeys,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            workflow_url: require_env("DIFY_WORKFLOW_URL")?,
            chatflow_url: require_env("DIFY_CHATFLOW_URL")?,
            workflow_keys: WorkflowKeys {
                profile_summary: require_env("PROFILE_SUMMARY_KEY")?,
                strengths: require_env("PROFILE_STRENGTHS_KEY")?,
                improvements: require_env("PROFILE_IMPROVEMENTS_KEY")?,
                college_list: require_env("COLLEGE_LIST_KEY")?,
                college_why: require_env("COLLEGE_WHY_KEY")?,
                strategies: require_env("STRATEGIES_KEY")?,
                schedule: require_env("SCHEDULE_GENERATION_KEY")?,
                essay_brainstorm: require_env("ESSAY_BRAINSTORM_KEY")?,
                activities_improver: require_env("ACTIVITIES_IMPROVER_KEY")?,
                counselor: require_env("COUNSELOR_KEY")?,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
