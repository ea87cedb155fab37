use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};

/// Initialize the global logger.
///
/// Always logs to the terminal. When `logfile` is set, the same records are
/// appended to that file as well.
pub fn initialize_logging(level: LevelFilter, logfile: Option<&Path>) -> Result<()> {
    let loggers = build_loggers(level, logfile)?;
    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(())
}

fn build_loggers(level: LevelFilter, logfile: Option<&Path>) -> Result<Vec<Box<dyn SharedLogger>>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = logfile {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }

    Ok(loggers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_temp_dir;

    #[test]
    fn test_terminal_only() {
        let loggers = build_loggers(LevelFilter::Info, None).unwrap();
        assert_eq!(loggers.len(), 1);
    }

    #[test]
    fn test_logfile_is_created() {
        let dir = create_temp_dir().unwrap();
        let path = dir.path().join("agent.log");

        let loggers = build_loggers(LevelFilter::Debug, Some(&path)).unwrap();
        assert_eq!(loggers.len(), 2);
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_logfile_is_an_error() {
        let dir = create_temp_dir().unwrap();
        let path = dir.path().join("missing").join("agent.log");

        match build_loggers(LevelFilter::Info, Some(&path)) {
            Ok(_) => panic!("expected an error for a log file in a missing directory"),
            Err(err) => assert!(err.to_string().contains("Failed to open log file")),
        }
    }
}
