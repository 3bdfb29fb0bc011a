use clap::Parser;
use gitenberg_core::ConfigOverrides;

/// Configuration for the gitenberg adapter server.
#[derive(Parser, Debug, Clone)]
#[command(name = "gitenberg-server")]
#[command(about = "Keeps posts in sync with markdown files in a GitHub repository")]
pub struct Config {
    /// TCP host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "GITENBERG_HOST")]
    pub host: String,

    /// TCP port to bind to
    #[arg(long, default_value = "8080", env = "GITENBERG_PORT")]
    pub port: u16,

    /// GitHub API root
    #[arg(long, default_value = gitenberg_github::DEFAULT_API_URL, env = "GITENBERG_GITHUB_API_URL")]
    pub github_api_url: String,

    /// Timeout for GitHub list and fetch requests (seconds)
    #[arg(long, default_value = "10", env = "GITENBERG_GITHUB_TIMEOUT_SECS")]
    pub github_timeout_secs: u64,

    /// Repository (`owner/name`), overrides the stored setting
    #[arg(long, env = "GITENBERG_GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// Personal access token, overrides the stored setting
    #[arg(long, env = "GITENBERG_GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Directory holding the markdown files, overrides the stored setting
    #[arg(long, env = "GITENBERG_GITHUB_REMOTE_DIR")]
    pub github_remote_dir: Option<String>,
}

impl Config {
    /// Deployment-level overrides for config resolution.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo: self.github_repo.clone(),
            token: self.github_token.clone(),
            remote_dir: self.github_remote_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_from_args() {
        let config = Config::try_parse_from([
            "gitenberg-server",
            "--github-repo",
            "owner/repo",
            "--github-remote-dir",
            "guides",
        ])
        .unwrap();

        let overrides = config.overrides();
        assert_eq!(overrides.repo.as_deref(), Some("owner/repo"));
        assert_eq!(overrides.remote_dir.as_deref(), Some("guides"));
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.github_timeout_secs, 10);
    }
}
