//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "timebars")]
#[command(about = "A sequential countdown timer queue with alarms")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding persistent.json
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Tick period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(50..))]
    pub tick_ms: u64,

    /// Shell command run when an alarm fires (rings the terminal bell if unset)
    #[arg(short, long)]
    pub alarm_command: Option<String>,

    /// Keep the queue in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Location of the queue snapshot
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("persistent.json")
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["timebars"]).expect("defaults parse");
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.state_file(), PathBuf::from("data").join("persistent.json"));
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
        assert!(config.alarm_command.is_none());
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "timebars",
            "--port",
            "9000",
            "--data-dir",
            "/tmp/tb",
            "--alarm-command",
            "paplay bleep.wav",
            "--tick-ms",
            "250",
            "-v",
        ])
        .expect("overrides parse");
        assert_eq!(config.port, 9000);
        assert_eq!(config.state_file(), PathBuf::from("/tmp/tb/persistent.json"));
        assert_eq!(config.alarm_command.as_deref(), Some("paplay bleep.wav"));
        assert_eq!(config.tick_period(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_tiny_tick_period() {
        assert!(Config::try_parse_from(["timebars", "--tick-ms", "5"]).is_err());
    }
}
