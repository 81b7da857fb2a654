//! Startup loading of the prompt templates and the example corpus.
//!
//! Layout, relative to the prompt directory:
//!   prompt-system.md   system-role template (required)
//!   prompt-user.md     user-role template (required)
//!   data/*.txt|*.md    example documents (optional)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::prompt::composer::{BoundPipeline, TemplatePair};
use crate::prompt::template::{Template, TemplateError};

pub const SYSTEM_TEMPLATE_FILE: &str = "prompt-system.md";
pub const USER_TEMPLATE_FILE: &str = "prompt-user.md";
pub const EXAMPLES_DIR: &str = "data";

/// Substituted for the corpus when the data directory does not exist.
pub const MISSING_EXAMPLES_WARNING: &str =
    "(warning: data directory not found, no example documents loaded)";

pub const INIT_SUCCESS_MESSAGE: &str = "System initialized successfully";

const EXAMPLE_EXTENSIONS: [&str; 2] = ["txt", "md"];

#[derive(Debug, Error)]
pub enum InitError {
    #[error("missing prompt-system.md or prompt-user.md in {}", .0.display())]
    MissingTemplates(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDocument {
    pub name: String,
    pub content: String,
}

/// Example documents in filename order.
#[derive(Debug, Clone, Default)]
pub struct ExampleCorpus {
    pub documents: Vec<ExampleDocument>,
}

impl ExampleCorpus {
    pub fn read_dir(dir: &Path) -> io::Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_example_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let documents = paths
            .into_iter()
            .map(|path| {
                let content = load_text(&path)?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(ExampleDocument { name, content })
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self { documents })
    }

    /// One block per document, each headed by its filename, blocks separated
    /// by a blank line.
    pub fn render(&self) -> String {
        self.documents
            .iter()
            .map(|doc| format!("--- Example: {} ---\n{}\n", doc.name, doc.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn has_example_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXAMPLE_EXTENSIONS.contains(&ext))
}

pub fn load_text(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Loads and concatenates the example corpus. A missing directory is not an
/// error: the fixed warning text stands in for the corpus. A path that exists
/// but is not a directory yields an empty corpus.
pub fn load_examples(dir: &Path) -> io::Result<String> {
    if !dir.exists() {
        return Ok(MISSING_EXAMPLES_WARNING.to_string());
    }
    if !dir.is_dir() {
        return Ok(ExampleCorpus::default().render());
    }
    Ok(ExampleCorpus::read_dir(dir)?.render())
}

pub fn init_pipeline(base_dir: &Path) -> Result<BoundPipeline, InitError> {
    let system_path = base_dir.join(SYSTEM_TEMPLATE_FILE);
    let user_path = base_dir.join(USER_TEMPLATE_FILE);
    let data_path = base_dir.join(EXAMPLES_DIR);

    if !system_path.is_file() || !user_path.is_file() {
        return Err(InitError::MissingTemplates(base_dir.to_path_buf()));
    }

    let system = read_template(&system_path)?;
    let user = read_template(&user_path)?;
    let examples = load_examples(&data_path).map_err(|source| InitError::Io {
        path: data_path.clone(),
        source,
    })?;

    Ok(BoundPipeline::new(TemplatePair { system, user }, examples))
}

fn read_template(path: &Path) -> Result<Template, InitError> {
    let text = load_text(path).map_err(|source| InitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Template::parse(&text).map_err(|source| InitError::Template {
        path: path.to_path_buf(),
        source,
    })
}

/// Outcome of startup initialization, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    pub ready: bool,
    pub message: String,
}

impl PipelineStatus {
    /// Runs [`init_pipeline`] and records the result as data. Never fails.
    pub fn initialize(base_dir: &Path) -> (Option<Arc<BoundPipeline>>, Self) {
        match init_pipeline(base_dir) {
            Ok(pipeline) => {
                info!(
                    "Prompt pipeline ready from {} (inputs: {})",
                    base_dir.display(),
                    pipeline.input_variables().join(", ")
                );
                let status = Self {
                    ready: true,
                    message: INIT_SUCCESS_MESSAGE.to_string(),
                };
                (Some(Arc::new(pipeline)), status)
            }
            Err(e) => {
                error!("Prompt pipeline initialization failed: {e}");
                let status = Self {
                    ready: false,
                    message: format!("Initialization error: {e}"),
                };
                (None, status)
            }
        }
    }
}
