//! Error type shared by the configuration loaders and the metric sources.
//!
//! Nothing in the layout or rendering path returns these: the dashboard
//! recovers locally there. They surface from config loading (fatal at
//! startup, the binary decides) and from fetches (logged and retried).

use std::{path::PathBuf, process::ExitStatus};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to find colorscheme {name} (searched: {})", display_paths(.searched))]
    ColorScheme { name: String, searched: Vec<PathBuf> },

    #[error("`{program}` exited with {status}: {stderr}")]
    Command {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("cannot parse {what} from {input:?}")]
    Parse { what: &'static str, input: String },

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorscheme_error_lists_paths() {
        let err = Error::ColorScheme {
            name: "solarized".into(),
            searched: vec![PathBuf::from("/a/solarized.json"), PathBuf::from("/b/solarized.json")],
        };
        assert_eq!(
            err.to_string(),
            "unable to find colorscheme solarized (searched: /a/solarized.json,/b/solarized.json)"
        );
    }

    #[test]
    fn test_parse_error_quotes_input() {
        let err = Error::Parse {
            what: "percentage",
            input: "abc".into(),
        };
        assert_eq!(err.to_string(), "cannot parse percentage from \"abc\"");
    }
}
