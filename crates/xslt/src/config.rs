use serde::{Deserialize, Serialize};

/// When a document type declaration is added to the finished output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoctypeInjection {
    /// Only XML output gets a declaration. HTML output already carries one
    /// from its creation.
    #[default]
    XmlOnly,
    /// Every output method gets a declaration, replacing the one an HTML
    /// document was created with.
    Always,
}

/// Run-level options for a transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransformConfig {
    /// Fail the run when any diagnostic was reported.
    pub strict: bool,
    pub doctype_injection: DoctypeInjection,
    /// Caps the number of nodes the output document may hold. Exceeding it
    /// fails the run as an allocation failure.
    pub max_output_nodes: Option<usize>,
}
