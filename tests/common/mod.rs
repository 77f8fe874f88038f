pub mod fixtures;

use trellis::{Document, Processor, Stylesheet, TransformConfig, Transformation, WriteOptions};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Compiles a stylesheet whose top-level elements are `body`.
pub fn stylesheet(body: &str) -> Result<Stylesheet, Box<dyn std::error::Error>> {
    Ok(Stylesheet::parse(&fixtures::wrap_stylesheet(body))?)
}

/// Compiles `body`, parses `source` and runs the transformation.
pub fn transform(body: &str, source: &str) -> Result<Transformation, Box<dyn std::error::Error>> {
    transform_with(body, source, TransformConfig::default())
}

pub fn transform_with(
    body: &str,
    source: &str,
    config: TransformConfig,
) -> Result<Transformation, Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let stylesheet = stylesheet(body)?;
    let source = Document::parse(source)?;
    Ok(Processor::new(&stylesheet).with_config(config).apply(&source)?)
}

/// Serializes a document without the XML declaration.
pub fn markup(doc: &Document) -> String {
    doc.to_xml_string_with(WriteOptions {
        omit_declaration: true,
        ..Default::default()
    })
    .expect("output serializes")
}
