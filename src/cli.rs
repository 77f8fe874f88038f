//! Command line front end: argument parsing, configuration loading and the
//! file-to-file transformation run.
use clap::{Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use trellis_tree::{Document, TreeError};
use trellis_xslt::{
    DoctypeInjection, Processor, Stylesheet, TransformConfig, TransformError, Transformation,
    XsltError,
};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Stylesheet error: {0}")]
    Stylesheet(#[from] XsltError),

    #[error("Source document error: {0}")]
    Source(#[source] TreeError),

    #[error("Serialization error: {0}")]
    Serialize(#[source] TreeError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DoctypeArg {
    Always,
    XmlOnly,
}

impl From<DoctypeArg> for DoctypeInjection {
    fn from(arg: DoctypeArg) -> Self {
        match arg {
            DoctypeArg::Always => DoctypeInjection::Always,
            DoctypeArg::XmlOnly => DoctypeInjection::XmlOnly,
        }
    }
}

/// Applies an XSLT stylesheet to an XML document.
#[derive(Parser, Debug)]
#[command(name = "trellis", version, about)]
pub struct Args {
    /// Path to the stylesheet
    pub stylesheet: PathBuf,

    /// Path to the source document
    pub source: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON file holding a transformation configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail when any diagnostic is reported
    #[arg(long)]
    pub strict: bool,

    /// When to add a document type declaration to the result
    #[arg(long, value_enum)]
    pub doctype: Option<DoctypeArg>,
}

impl Args {
    /// Loads the configuration file, if any, and applies flag overrides.
    pub fn load_config(&self) -> Result<TransformConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&read(path)?)?,
            None => TransformConfig::default(),
        };
        if self.strict {
            config.strict = true;
        }
        if let Some(doctype) = self.doctype {
            config.doctype_injection = doctype.into();
        }
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Compiles the stylesheet, transforms the source and writes the result to
/// the output file when one is given. Returns the transformation and its
/// serialized form.
pub fn run(args: &Args) -> Result<(Transformation, String), CliError> {
    let config = args.load_config()?;
    log::debug!("Using configuration {:?}", config);

    let stylesheet = Stylesheet::parse(&read(&args.stylesheet)?)?;
    let source = Document::parse(&read(&args.source)?).map_err(CliError::Source)?;

    let result = Processor::new(&stylesheet).with_config(config).apply(&source)?;
    let text = result.serialize().map_err(CliError::Serialize)?;

    if let Some(path) = &args.output {
        fs::write(path, &text).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {}", path.display());
    }
    Ok((result, text))
}
