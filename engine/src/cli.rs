//! CLI interface for the crop advisor
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crop disease and soil advisor
///
/// Answers farming questions with context retrieved from a local directory of
/// agronomy notes and a hosted language model.
#[derive(Parser, Debug)]
#[command(name = "crop-advisor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the web form
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer one question and print the result
    Ask {
        /// The question to ask
        question: String,

        /// Region, e.g. "North India"
        #[arg(long, default_value = "")]
        region: String,

        /// Temperature in °C
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        temperature: String,

        /// Climate type (Tropical, Dry, Temperate, Continental, Polar)
        #[arg(long, default_value = "")]
        climate: String,
    },

    /// Show the corpus documents that would be used as context
    Context {
        /// Question text to match
        text: String,

        /// Match the text as given instead of the labeled query block
        #[arg(long)]
        raw: bool,
    },

    /// Run system diagnostics
    Doctor,

    /// Store the API key in the OS keychain
    Setup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["crop-advisor", "--json", "--log", "debug", "doctor"]);
        assert!(cli.json);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Doctor));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let result = Cli::try_parse_from(["crop-advisor", "--log", "verbose", "doctor"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["crop-advisor", "doctor", "--log", "trace"]).unwrap();
        assert_eq!(cli.log.as_deref(), Some("trace"));
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["crop-advisor", "setup", "--config", "/tmp/advisor.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/advisor.toml")));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["crop-advisor", "serve", "--host", "0.0.0.0", "--port", "8080"]);
        if let Command::Serve { host, port } = cli.command {
            assert_eq!(host.as_deref(), Some("0.0.0.0"));
            assert_eq!(port, Some(8080));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from([
            "crop-advisor",
            "ask",
            "Why are my wheat leaves rusty?",
            "--region",
            "Punjab",
            "--temperature",
            "-2",
            "--climate",
            "Continental",
        ]);
        if let Command::Ask {
            question,
            region,
            temperature,
            climate,
        } = cli.command
        {
            assert_eq!(question, "Why are my wheat leaves rusty?");
            assert_eq!(region, "Punjab");
            assert_eq!(temperature, "-2");
            assert_eq!(climate, "Continental");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_ask_defaults_to_blank_fields() {
        let cli = Cli::parse_from(["crop-advisor", "ask", "soil for rice"]);
        if let Command::Ask {
            region,
            temperature,
            climate,
            ..
        } = cli.command
        {
            assert!(region.is_empty());
            assert!(temperature.is_empty());
            assert!(climate.is_empty());
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_context_raw_flag() {
        let cli = Cli::parse_from(["crop-advisor", "context", "blight", "--raw"]);
        if let Command::Context { text, raw } = cli.command {
            assert_eq!(text, "blight");
            assert!(raw);
        } else {
            panic!("Expected Context command");
        }
    }
}
