//! Daemon configuration loaded from a YAML file.
//!
//! The configuration is read once at startup into an immutable
//! [`EirConfig`] which is then handed to every component that needs it.
//! Keys are PascalCase, matching [`SAMPLE`].
//!
//! | Key                | Default          |
//! |--------------------|------------------|
//! | `SlackToken`       | empty (disabled) |
//! | `SlackChannel`     | empty            |
//! | `StatusFile`       | `./status.yml`   |
//! | `ResultDir`        | `./results`      |
//! | `WatchInterval`    | `10` seconds     |
//! | `Debug`            | `false`          |
//! | `WebHooks`         | none             |
//! | `WebHooksTimeout`  | `3` seconds      |
//! | `EnableHttpStatus` | `false`          |
//! | `HttpListenOn`     | `127.0.0.1:8080` |
//! | `DryRun`           | `false`          |
//! | `Actions`          | none             |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::action::Actions;
use crate::error::ConfigError;

/// File names tried in each search directory, in order.
const CONFIG_FILE_NAMES: [&str; 2] = ["eir.yml", "eir.yaml"];

/// System-wide configuration directory.
const SYSTEM_CONFIG_DIR: &str = "/etc/eir";

/// Commented sample configuration printed by `eir confsample`.
pub const SAMPLE: &str = r##"# Eir sample configuration file, feel free to adapt!

# Slack updates need both the token and the channel
SlackToken: "my awesome slack token"
SlackChannel: "#monitoring"
# Seconds between two result directory checks
WatchInterval: 60
# Where the last known state is kept, so Eir can be restarted at any time
StatusFile: ./status.yml
# Where the probes write their results
ResultDir: results
# Verbose logging
Debug: true
# URLs notified with a POST of the new state on every change
WebHooks:
  - http://localhost:8080
# Timeout in seconds for webhook and Slack requests
WebHooksTimeout: 2
# Serve the current state over HTTP
EnableHttpStatus: true
# Bind address of the HTTP status server
HttpListenOn: "0.0.0.0:8080"
# When true, actions are logged but never executed
DryRun: false
# Commands run when a state is newly reached
Actions:
  # Run when the global state of the host changes
  Global:
    OnOk:
      - Command: /bin/touch statechanged
        Timeout: 10
  # Run when a particular probe changes state
  Probes:
    postfix:
      OnCritical:
        - Command: systemctl restart postfix
      OnOk:
        - Command: echo "Yay !"
"##;

/// Immutable daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EirConfig {
    pub slack_token: String,
    pub slack_channel: String,
    pub status_file: PathBuf,
    pub result_dir: PathBuf,
    /// Seconds between two cycles of the watch loop.
    pub watch_interval: u64,
    pub debug: bool,
    #[serde(rename = "WebHooks")]
    pub web_hooks: Vec<String>,
    /// Seconds allowed for each notification request.
    #[serde(rename = "WebHooksTimeout")]
    pub web_hooks_timeout: u64,
    pub enable_http_status: bool,
    pub http_listen_on: String,
    pub dry_run: bool,
    pub actions: Actions,
}

impl Default for EirConfig {
    fn default() -> Self {
        Self {
            slack_token: String::new(),
            slack_channel: String::new(),
            status_file: PathBuf::from("./status.yml"),
            result_dir: PathBuf::from("./results"),
            watch_interval: 10,
            debug: false,
            web_hooks: Vec::new(),
            web_hooks_timeout: 3,
            enable_http_status: false,
            http_listen_on: "127.0.0.1:8080".to_string(),
            dry_run: false,
            actions: Actions::default(),
        }
    }
}

impl EirConfig {
    /// Load the configuration from `explicit`, or from the first file found
    /// in the search path (see [`search_paths`]).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidates = search_paths();
                candidates
                    .iter()
                    .find(|p| p.is_file())
                    .cloned()
                    .ok_or_else(|| ConfigError::NotFound {
                        searched: candidates
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })?
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&contents, &path)
    }

    /// Parse and validate YAML `contents`. `path` is only used for errors.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: EirConfig = if contents.trim().is_empty() {
            EirConfig::default()
        } else {
            serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the daemon cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_interval == 0 {
            return Err(ConfigError::Invalid(
                "WatchInterval must be at least 1 second".into(),
            ));
        }

        if self.enable_http_status {
            self.http_listen_on.parse::<SocketAddr>().map_err(|e| {
                ConfigError::Invalid(format!(
                    "HttpListenOn {:?} is not a socket address: {e}",
                    self.http_listen_on
                ))
            })?;
        }

        if let Some(url) = self
            .web_hooks
            .iter()
            .find(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        {
            return Err(ConfigError::Invalid(format!(
                "WebHooks entry {url:?} must be an http(s) URL"
            )));
        }

        let scopes = std::iter::once(("Global", &self.actions.global)).chain(
            self.actions
                .probes
                .iter()
                .map(|(name, table)| (name.as_str(), table)),
        );
        for (scope, table) in scopes {
            if table.iter().any(|cmd| cmd.command_line.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "Actions for {scope} contain an empty Command"
                )));
            }
        }

        Ok(())
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.web_hooks_timeout)
    }

    /// Slack is used only when both token and channel are set.
    pub fn slack_enabled(&self) -> bool {
        !self.slack_token.is_empty() && !self.slack_channel.is_empty()
    }

    /// Non-fatal configuration issues worth reporting at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.slack_token.is_empty() && self.slack_channel.is_empty() {
            warnings.push(
                "SlackToken is set but SlackChannel is empty, Slack notifications are disabled"
                    .to_string(),
            );
        }
        if self.dry_run {
            warnings.push("DryRun is active, no configured action will be executed".to_string());
        }
        warnings
    }
}

/// Candidate configuration files: current directory, `$HOME`, `/etc/eir`.
pub fn search_paths() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home));
    }
    dirs.push(PathBuf::from(SYSTEM_CONFIG_DIR));

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::action::Command;
    use crate::status::Status;

    fn parse(yaml: &str) -> Result<EirConfig, ConfigError> {
        EirConfig::parse(yaml, Path::new("test.yml"))
    }

    #[test]
    fn sample_parses() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.slack_channel, "#monitoring");
        assert_eq!(config.watch_interval(), Duration::from_secs(60));
        assert_eq!(config.result_dir, PathBuf::from("results"));
        assert_eq!(config.web_hooks, vec!["http://localhost:8080"]);
        assert_eq!(config.notify_timeout(), Duration::from_secs(2));
        assert!(config.enable_http_status);
        assert!(config.slack_enabled());

        let global = &config.actions.global;
        assert_eq!(
            global.commands_for(Status::Ok),
            [Command::new("/bin/touch statechanged", 10)]
        );

        let postfix = config.actions.for_probe("postfix").unwrap();
        assert_eq!(postfix.on_critical[0].command_line, "systemctl restart postfix");
        assert_eq!(postfix.on_critical[0].timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = parse("DryRun: true\n").unwrap();
        assert!(config.dry_run);
        assert_eq!(config.status_file, PathBuf::from("./status.yml"));
        assert_eq!(config.result_dir, PathBuf::from("./results"));
        assert_eq!(config.watch_interval, 10);
        assert_eq!(config.web_hooks_timeout, 3);
        assert_eq!(config.http_listen_on, "127.0.0.1:8080");
        assert!(!config.enable_http_status);
        assert!(config.actions.global.is_empty());
        assert!(config.actions.probes.is_empty());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.watch_interval, 10);
    }

    #[test]
    fn zero_watch_interval_is_rejected() {
        assert_matches!(parse("WatchInterval: 0\n"), Err(ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_listen_address_is_rejected_only_when_enabled() {
        assert_matches!(
            parse("EnableHttpStatus: true\nHttpListenOn: nowhere\n"),
            Err(ConfigError::Invalid(_))
        );
        assert!(parse("EnableHttpStatus: false\nHttpListenOn: nowhere\n").is_ok());
    }

    #[test]
    fn non_http_webhook_is_rejected() {
        assert_matches!(
            parse("WebHooks:\n  - ftp://example.com\n"),
            Err(ConfigError::Invalid(msg)) if msg.contains("ftp://example.com")
        );
    }

    #[test]
    fn empty_command_is_rejected() {
        let yaml = "Actions:\n  Probes:\n    disk:\n      OnWarning:\n        - Command: \"  \"\n";
        assert_matches!(
            parse(yaml),
            Err(ConfigError::Invalid(msg)) if msg.contains("disk")
        );
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert_matches!(parse("WatchInterval: [1\n"), Err(ConfigError::Parse { .. }));
        assert_matches!(parse("WatchInterval: soon\n"), Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn warnings_for_half_configured_slack_and_dry_run() {
        let config = parse("SlackToken: abc\nDryRun: true\n").unwrap();
        assert!(!config.slack_enabled());
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("SlackChannel"));
        assert!(warnings[1].contains("DryRun"));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eir.yml");
        std::fs::write(&path, "WatchInterval: 5\n").unwrap();

        let config = EirConfig::load(Some(&path)).unwrap();
        assert_eq!(config.watch_interval, 5);
    }

    #[test]
    fn load_explicit_missing_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert_matches!(EirConfig::load(Some(&path)), Err(ConfigError::Read { .. }));
    }

    #[test]
    fn search_paths_end_with_system_dir() {
        let paths = search_paths();
        assert_eq!(paths[0], PathBuf::from("./eir.yml"));
        assert_eq!(paths[1], PathBuf::from("./eir.yaml"));
        assert_eq!(
            paths.last().unwrap(),
            &PathBuf::from("/etc/eir/eir.yaml")
        );
    }
}
