//! Session-level value types shared by the wizard and the execution layer

use serde::{Deserialize, Serialize};

/// A file chosen by the user in the shell's picker
///
/// The core only carries the reference; it never opens the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub path: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Parse `NAME=PATH`, or a bare path whose file name becomes the name
    ///
    /// Text before the first `=` only counts as a name when it holds no path
    /// separator, so `/data/run=3/0.txt` stays a bare path.
    pub fn parse(spec: &str) -> Self {
        let named = spec
            .split_once('=')
            .filter(|(name, _)| !name.contains(['/', '\\']));
        match named {
            Some((name, path)) => Self::new(name.trim(), path.trim()),
            None => {
                let path = spec.trim();
                let name = std::path::Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                Self::new(name, path)
            }
        }
    }
}

/// How the session supplies knowledge to the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeMode {
    /// Knowledge authored in the interactive builder and compiled
    #[default]
    Builder,
    /// A knowledge file chosen on disk, passed through by path
    FileImport,
}

/// Visual state of the run button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionStatus {
    #[default]
    Ready,
    /// A precondition failed; the user must fix input first
    Blocked,
    Running,
    Succeeded,
    Failed,
}
