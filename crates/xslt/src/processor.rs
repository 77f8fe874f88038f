//! Drives one whole transformation: output shell, root dispatch and
//! finalization.
use crate::ast::{OutputSettings, Stylesheet};
use crate::config::{DoctypeInjection, TransformConfig};
use crate::context::{OutputKind, TransformContext};
use crate::diagnostics::{Diagnostic, DiagnosticHandler};
use crate::error::TransformError;
use crate::evaluator::SelectEvaluator;
use crate::executor::process_one_node;
use crate::matcher::TemplateMatcher;
use trellis_tree::{Document, TreeError, WriteOptions};

/// The product of a successful run.
#[derive(Debug)]
pub struct Transformation {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
    pub output_kind: OutputKind,
    /// Whether the stylesheet asked for indented output.
    pub indent: bool,
}

impl Transformation {
    /// Serializes the output document.
    pub fn serialize(&self) -> Result<String, TreeError> {
        self.document.to_xml_string_with(WriteOptions {
            indent: self.indent,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Initializing,
    ShellCreated,
    Processing,
    Finalizing,
    Done,
    Failed,
}

fn advance(state: &mut RunState, next: RunState) {
    log::debug!("Transformation state {:?} -> {:?}", state, next);
    *state = next;
}

/// Applies a compiled stylesheet to source documents.
///
/// ```ignore
/// let result = Processor::new(&stylesheet)
///     .with_config(TransformConfig { strict: true, ..Default::default() })
///     .apply(&source)?;
/// ```
pub struct Processor<'a> {
    stylesheet: &'a Stylesheet,
    matcher: &'a dyn TemplateMatcher,
    evaluator: Option<&'a dyn SelectEvaluator>,
    handler: Option<&'a DiagnosticHandler<'a>>,
    config: TransformConfig,
}

impl<'a> Processor<'a> {
    pub fn new(stylesheet: &'a Stylesheet) -> Self {
        Processor {
            stylesheet,
            matcher: stylesheet,
            evaluator: None,
            handler: None,
            config: TransformConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces template resolution. The matcher must return templates of
    /// this processor's stylesheet.
    pub fn with_matcher(mut self, matcher: &'a dyn TemplateMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_evaluator(mut self, evaluator: &'a dyn SelectEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_diagnostic_handler(mut self, handler: &'a DiagnosticHandler<'a>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Runs the transformation. On error no output document is returned.
    pub fn apply(&self, source: &Document) -> Result<Transformation, TransformError> {
        log::info!(
            "Applying stylesheet with {} template(s)",
            self.stylesheet.templates().len()
        );
        let mut state = RunState::Initializing;
        let result = self.run(source, &mut state);
        match &result {
            Ok(t) => {
                advance(&mut state, RunState::Done);
                log::info!(
                    "Transformation finished with {} diagnostic(s)",
                    t.diagnostics.len()
                );
            }
            Err(e) => {
                advance(&mut state, RunState::Failed);
                log::error!("Transformation failed: {}", e);
            }
        }
        result
    }

    fn run(&self, source: &Document, state: &mut RunState) -> Result<Transformation, TransformError> {
        let settings = self.stylesheet.output();
        let (output_kind, mut output) = create_output_shell(settings)?;
        output.set_node_limit(self.config.max_output_nodes);
        advance(state, RunState::ShellCreated);

        let root = source.root_element().ok_or(TransformError::NoRootElement)?;
        let mut ctx = TransformContext::new(self.stylesheet, source, output_kind, output)
            .with_matcher(self.matcher)
            .with_evaluator(self.evaluator)
            .with_diagnostic_handler(self.handler);
        ctx.seed(root);
        advance(state, RunState::Processing);
        let processed = process_one_node(&mut ctx, root);
        ctx.recover(processed)?;

        advance(state, RunState::Finalizing);
        let (mut document, diagnostics) = ctx.finish();
        let inject = match self.config.doctype_injection {
            DoctypeInjection::XmlOnly => output_kind == OutputKind::Xml,
            DoctypeInjection::Always => true,
        };
        if inject && settings.has_doctype() {
            inject_doctype(&mut document, settings)?;
        }

        if self.config.strict && !diagnostics.is_empty() {
            return Err(TransformError::Strict(diagnostics));
        }
        Ok(Transformation {
            document,
            diagnostics,
            output_kind,
            indent: settings.indent.unwrap_or(false),
        })
    }
}

/// Applies `stylesheet` to `source` with the default configuration.
pub fn apply_stylesheet(
    stylesheet: &Stylesheet,
    source: &Document,
) -> Result<Transformation, TransformError> {
    Processor::new(stylesheet).apply(source)
}

/// Creates the empty output document for the declared output method.
fn create_output_shell(
    settings: &OutputSettings,
) -> Result<(OutputKind, Document), TransformError> {
    let (kind, mut doc) = match settings.method.as_deref() {
        None | Some("xml") => (
            OutputKind::Xml,
            Document::new_xml(settings.version.as_deref()).map_err(TransformError::from_tree)?,
        ),
        Some("html") => (
            OutputKind::Html,
            Document::new_html(
                settings.doctype_public.as_deref(),
                settings.doctype_system.as_deref(),
            )
            .map_err(TransformError::from_tree)?,
        ),
        Some(other) => return Err(TransformError::UnsupportedOutputMethod(other.to_string())),
    };
    if let Some(encoding) = &settings.encoding {
        doc.set_encoding(encoding);
    }
    Ok((kind, doc))
}

/// Declares a document type named after the output root element.
fn inject_doctype(document: &mut Document, settings: &OutputSettings) -> Result<(), TransformError> {
    let Some(root) = document.root_element() else {
        return Ok(());
    };
    let name = document
        .name(root)
        .map(|n| n.to_string())
        .unwrap_or_default();
    document
        .set_doctype(
            &name,
            settings.doctype_public.as_deref(),
            settings.doctype_system.as_deref(),
        )
        .map_err(TransformError::from_tree)?;
    Ok(())
}
