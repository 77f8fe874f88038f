//! XSLT template processor core.
//!
//! Compiles stylesheets into template rules, resolves the rule that applies
//! to each source node and mirrors template bodies into a fresh output
//! document. `xsl:apply-templates` is the one instruction executed; its
//! `select` expressions go through a pluggable [`SelectEvaluator`].

pub mod ast;
pub mod compiler;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod instruction;
pub mod matcher;
pub mod pattern;
pub mod processor;

mod executor_handlers;

pub use ast::{OutputSettings, Stylesheet, Template, XSLT_NAMESPACE};
pub use config::{DoctypeInjection, TransformConfig};
pub use context::{OutputKind, TransformContext};
pub use diagnostics::{Diagnostic, DiagnosticHandler};
pub use error::{TransformError, XsltError};
pub use evaluator::{EvalContext, EvalError, SelectEvaluator};
pub use executor::{default_process_one_node, process_one_node};
pub use instruction::Instruction;
pub use matcher::TemplateMatcher;
pub use pattern::Pattern;
pub use processor::{Processor, Transformation, apply_stylesheet};
