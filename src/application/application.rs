use std::io::{BufRead, Cursor};

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::config::{HubConfig, HubConfigError};
use crate::ext::BestEffortPathExt;
use crate::hub::{Hub, HubError, Reply};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let mut config = HubConfig::read(&app_config.root)
            .await
            .context(ConfigSnafu)?;
        config.seed_demo &= app_config.seed;
        debug!("Loaded config: {:?}", config);

        let mut hub = Hub::from_config(&config, &app_config.root).context(SeedSnafu)?;

        let lines: Box<dyn Iterator<Item = std::io::Result<String>>> = match &app_config.script {
            Some(path) => {
                info!("Running script {}", path.best_effort_path_display());
                let bytes = fs::read(path).await.context(ScriptSnafu {
                    file_path: path.best_effort_path_display(),
                })?;
                Box::new(session_lines(Cursor::new(bytes)))
            }
            None => Box::new(session_lines(std::io::stdin().lock())),
        };

        for line in lines {
            let line = line.context(StdinSnafu)?;
            match hub.execute_line(&line).await {
                Ok(Some(Reply::Output(text))) => println!("{text}"),
                Ok(Some(Reply::Quit)) => break,
                Ok(None) => {}
                Err(err) => report(&line, &err),
            }
        }

        info!("Session ended");
        Ok(())
    }
}

/// Splits input into session lines. Invalid UTF-8 is replaced rather than
/// rejected, so a bad line fails as a command instead of ending the session.
fn session_lines(reader: impl BufRead) -> impl Iterator<Item = std::io::Result<String>> {
    reader.split(b'\n').map(|line| {
        line.map(|bytes| {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            if text.ends_with('\r') {
                text.pop();
            }
            text
        })
    })
}

/// Command failures end the command, not the session.
fn report(line: &str, err: &HubError) {
    eprintln!("{}", failure_message(err));
    debug!("Command '{}' failed: {:?}", line.trim(), err);
}

fn failure_message(err: &HubError) -> String {
    match err {
        HubError::TreeError { source } if source.is_validation() => {
            format!("{err}, please try again")
        }
        _ => format!("error: {err}"),
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: HubConfigError },
    #[snafu(display("Failed to seed the demo dataset"))]
    SeedError { source: HubError },
    #[snafu(display("Failed to read the script file: {}", file_path))]
    ScriptError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read from stdin"))]
    StdinError { source: std::io::Error },
}
