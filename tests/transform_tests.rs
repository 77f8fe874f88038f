mod common;

use common::fixtures::*;
use common::{TestResult, markup, stylesheet, transform, transform_with};
use std::cell::RefCell;
use trellis::{
    Diagnostic, DoctypeInjection, Document, EvalContext, EvalError, NodeId, NodeKind, NodeSet,
    OutputKind, Processor, Stylesheet, TransformConfig, TransformError, apply_stylesheet,
};

// ============================================================================
// Template body mirroring
// ============================================================================

#[test]
fn test_literal_result_shape_is_preserved() -> TestResult {
    let result = transform(
        r#"<xsl:template match="doc">
             <report kind="summary">
               <header><title>Totals</title></header>
               <rows><row n="1"/><row n="2"><cell>x</cell></row></rows>
               <!-- generated -->
             </report>
           </xsl:template>"#,
        "<doc/>",
    )?;
    assert_eq!(
        markup(&result.document),
        r#"<report kind="summary"><header><title>Totals</title></header><rows><row n="1"/><row n="2"><cell>x</cell></row></rows><!-- generated --></report>"#
    );
    assert!(result.diagnostics.is_empty());
    Ok(())
}

#[test]
fn test_no_blank_text_reaches_the_output() -> TestResult {
    let result = transform(
        "<xsl:template match=\"a\">\n\t<x>\r\n  <y> </y>\n</x>\n</xsl:template>",
        "<a>  <b>\n</b>\t</a>",
    )?;
    let doc = &result.document;
    let blank_texts = doc
        .descendants(NodeId::DOCUMENT)
        .filter(|&n| doc.kind(n) == NodeKind::Text && doc.is_blank_node(n))
        .count();
    assert_eq!(blank_texts, 0);
    assert_eq!(markup(doc), "<x><y/></x>");
    Ok(())
}

#[test]
fn test_namespaced_literals_are_declared_in_output() -> TestResult {
    let result = transform(
        r#"<xsl:template match="a" xmlns:h="urn:h"><h:out><h:in/></h:out></xsl:template>"#,
        "<a/>",
    )?;
    assert_eq!(
        markup(&result.document),
        r#"<h:out xmlns:h="urn:h"><h:in/></h:out>"#
    );
    Ok(())
}

// ============================================================================
// Built-in rule
// ============================================================================

#[test]
fn test_no_templates_copies_only_text() -> TestResult {
    let result = transform("", "<a><b/>text<c/></a>")?;
    let doc = &result.document;
    assert_eq!(doc.root_element(), None);
    assert_eq!(markup(doc), "text");
    assert_eq!(result.output_kind, OutputKind::Xml);
    Ok(())
}

#[test]
fn test_literal_templates_reproduce_markup() -> TestResult {
    let result = transform(
        r#"<xsl:template match="a"><a><xsl:apply-templates/></a></xsl:template>
           <xsl:template match="b"><b/></xsl:template>
           <xsl:template match="c"><c/></xsl:template>"#,
        "<a><b/>text<c/></a>",
    )?;
    assert_eq!(markup(&result.document), "<a><b/>text<c/></a>");
    Ok(())
}

#[test]
fn test_spaces_only_text_produces_nothing() -> TestResult {
    let result = transform(r#"<xsl:template match="a"><a><xsl:apply-templates/></a></xsl:template>"#, "<a>   </a>")?;
    let doc = &result.document;
    let a = doc.root_element().ok_or("missing root")?;
    assert!(!doc.has_children(a));
    Ok(())
}

#[test]
fn test_cdata_is_copied_by_builtin_rule() -> TestResult {
    let result = transform("", "<a><![CDATA[raw]]></a>")?;
    assert_eq!(markup(&result.document), "raw");
    Ok(())
}

#[test]
fn test_comments_and_pis_are_reported() -> TestResult {
    let result = transform("", "<a><!-- c --><?target data?>t</a>")?;
    assert_eq!(markup(&result.document), "t");
    assert_eq!(
        result.diagnostics,
        vec![
            Diagnostic::UnhandledNodeKind {
                kind: NodeKind::Comment
            },
            Diagnostic::UnhandledNodeKind {
                kind: NodeKind::ProcessingInstruction
            },
        ]
    );
    Ok(())
}

// ============================================================================
// apply-templates
// ============================================================================

#[test]
fn test_nested_apply_templates_substitutes_in_place() -> TestResult {
    let source = "<doc><p>one</p><p>two</p></doc>";
    let body = r#"<xsl:template match="doc"><outer><inner><xsl:apply-templates/></inner><after/></outer></xsl:template>"#;

    let result = transform(body, source)?;
    assert_eq!(
        markup(&result.document),
        "<outer><inner>onetwo</inner><after/></outer>"
    );

    let result = transform(
        &format!(
            r#"{}<xsl:template match="p"><para><xsl:apply-templates/></para></xsl:template>"#,
            body
        ),
        source,
    )?;
    assert_eq!(
        markup(&result.document),
        "<outer><inner><para>one</para><para>two</para></inner><after/></outer>"
    );
    Ok(())
}

#[test]
fn test_catalogue_to_html() -> TestResult {
    let result = transform(CATALOGUE_HTML, CATALOGUE)?;
    assert_eq!(result.output_kind, OutputKind::Html);
    assert_eq!(
        result.document.to_xml_string()?,
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN"><html><body><ul><li>Dune</li><li>Solaris</li></ul></body></html>"#
    );
    Ok(())
}

#[test]
fn test_select_uses_plugged_evaluator() -> TestResult {
    let stylesheet = stylesheet(
        r#"<xsl:template match="catalogue"><titles><xsl:apply-templates select="book/title"/></titles></xsl:template>
           <xsl:template match="title"><t><xsl:apply-templates/></t></xsl:template>"#,
    )?;
    let source = Document::parse(CATALOGUE)?;

    let calls = RefCell::new(Vec::new());
    let titles = |select: &str, doc: &Document, ctx: &EvalContext| -> Result<NodeSet, EvalError> {
        calls.borrow_mut().push(select.to_string());
        Ok(doc
            .descendants(ctx.node)
            .filter(|&n| doc.local_name(n) == Some("title"))
            .collect())
    };
    let result = Processor::new(&stylesheet)
        .with_evaluator(&titles)
        .apply(&source)?;

    assert_eq!(
        markup(&result.document),
        "<titles><t>Dune</t><t>Solaris</t></titles>"
    );
    assert_eq!(calls.borrow().as_slice(), &["book/title".to_string()]);
    Ok(())
}

#[test]
fn test_select_without_evaluator_is_a_diagnostic() -> TestResult {
    let result = transform(
        r#"<xsl:template match="catalogue"><out><xsl:apply-templates select="book"/></out></xsl:template>"#,
        CATALOGUE,
    )?;
    assert_eq!(markup(&result.document), "<out/>");
    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::UnsupportedSelect {
            select: "book".into()
        }]
    );
    Ok(())
}

#[test]
fn test_diagnostic_handler_sees_every_diagnostic() -> TestResult {
    let stylesheet = stylesheet(
        r#"<xsl:template match="a"><xsl:for-each select="b"/><xsl:value-of select="."/></xsl:template>"#,
    )?;
    let source = Document::parse("<a/>")?;
    let seen = RefCell::new(Vec::new());
    let handler = |d: &Diagnostic| seen.borrow_mut().push(d.to_string());
    let result = Processor::new(&stylesheet)
        .with_diagnostic_handler(&handler)
        .apply(&source)?;

    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(
        seen.borrow().as_slice(),
        &[
            "XSLT instruction not yet implemented: xsl:for-each".to_string(),
            "XSLT instruction not yet implemented: xsl:value-of".to_string(),
        ]
    );
    Ok(())
}

// ============================================================================
// Output shell and finalization
// ============================================================================

#[test]
fn test_xml_output_gets_doctype_for_root_element() -> TestResult {
    let result = transform(
        r#"<xsl:output doctype-system="report.dtd" encoding="ISO-8859-1"/>
           <xsl:template match="a"><report/></xsl:template>"#,
        "<a/>",
    )?;
    assert_eq!(
        result.document.to_xml_string()?,
        r#"<?xml version="1.0" encoding="ISO-8859-1"?><!DOCTYPE report SYSTEM "report.dtd"><report/>"#
    );
    Ok(())
}

#[test]
fn test_doctype_skipped_without_output_root() -> TestResult {
    let result = transform(r#"<xsl:output doctype-system="x.dtd"/>"#, "<a>only text</a>")?;
    assert_eq!(result.document.doctype(), None);
    Ok(())
}

#[test]
fn test_html_default_identifiers() -> TestResult {
    let result = transform(
        r#"<xsl:output method="html"/><xsl:template match="a"><html/></xsl:template>"#,
        "<a/>",
    )?;
    let doc = &result.document;
    let dtd = doc.doctype().ok_or("missing doctype")?;
    let ids = doc.external_id(dtd).ok_or("missing identifiers")?;
    assert_eq!(ids.public.as_deref(), Some("-//W3C//DTD HTML 4.0 Transitional//EN"));
    assert_eq!(
        ids.system.as_deref(),
        Some("http://www.w3.org/TR/REC-html40/loose.dtd")
    );
    Ok(())
}

#[test]
fn test_always_injection_renames_html_doctype() -> TestResult {
    let body = r#"<xsl:output method="html" doctype-system="page.dtd"/>
                  <xsl:template match="a"><page/></xsl:template>"#;

    let xml_only = transform(body, "<a/>")?;
    let dtd = xml_only.document.doctype().ok_or("missing doctype")?;
    assert_eq!(xml_only.document.local_name(dtd), Some("html"));

    let always = transform_with(
        body,
        "<a/>",
        TransformConfig {
            doctype_injection: DoctypeInjection::Always,
            ..Default::default()
        },
    )?;
    let dtd = always.document.doctype().ok_or("missing doctype")?;
    assert_eq!(always.document.local_name(dtd), Some("page"));
    Ok(())
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_empty_source_has_no_root() -> TestResult {
    let stylesheet = stylesheet("")?;
    let source = Document::new_xml(None)?;
    let err = apply_stylesheet(&stylesheet, &source).unwrap_err();
    assert!(matches!(err, TransformError::NoRootElement));
    Ok(())
}

#[test]
fn test_unsupported_methods_fail_before_processing() -> TestResult {
    for method in ["text", "fo"] {
        let stylesheet = stylesheet(&format!(r#"<xsl:output method="{}"/>"#, method))?;
        let source = Document::parse("<a/>")?;
        let err = apply_stylesheet(&stylesheet, &source).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedOutputMethod(ref m) if m == method));
    }
    Ok(())
}

/// Builds a stylesheet whose `a` template holds a document type node, which
/// cannot be copied.
fn stylesheet_with_uncopyable_node(extra: &str) -> Result<Stylesheet, Box<dyn std::error::Error>> {
    let mut doc = Document::parse(&wrap_stylesheet(&format!(
        r#"<xsl:template match="a"><out><before/><after/></out></xsl:template>{}"#,
        extra
    )))?;
    let before = doc
        .descendants(NodeId::DOCUMENT)
        .find(|&n| doc.local_name(n) == Some("before"))
        .ok_or("missing marker")?;
    let dtd = doc.create_doctype("bad", None, Some("bad.dtd"))?;
    let out = doc.parent(before).ok_or("missing parent")?;
    let after = doc.next_sibling(before).ok_or("missing sibling")?;
    doc.insert_before(after, dtd)?;
    assert_eq!(doc.parent(dtd), Some(out));
    Ok(Stylesheet::compile(doc)?)
}

#[test]
fn test_copy_failure_abandons_only_the_current_node() -> TestResult {
    let stylesheet = stylesheet_with_uncopyable_node(
        r#"<xsl:template match="r"><root><xsl:apply-templates/></root></xsl:template>"#,
    )?;
    let source = Document::parse("<r><a/><b>kept</b></r>")?;
    let result = apply_stylesheet(&stylesheet, &source)?;

    assert_eq!(markup(&result.document), "<root><out><before/></out>kept</root>");
    assert!(matches!(
        result.diagnostics.as_slice(),
        [Diagnostic::NodeCopyFailure { .. }]
    ));
    Ok(())
}

#[test]
fn test_copy_failure_is_fatal_in_strict_mode() -> TestResult {
    let stylesheet = stylesheet_with_uncopyable_node("")?;
    let source = Document::parse("<a/>")?;
    let err = Processor::new(&stylesheet)
        .with_config(TransformConfig {
            strict: true,
            ..Default::default()
        })
        .apply(&source)
        .unwrap_err();
    assert!(matches!(err, TransformError::Strict(ref d) if d.len() == 1));
    Ok(())
}

#[test]
fn test_allocation_failure_returns_no_output() -> TestResult {
    let config = TransformConfig {
        max_output_nodes: Some(3),
        ..Default::default()
    };
    let body = r#"<xsl:template match="a"><x><y/><z/></x></xsl:template>"#;

    let err = transform_with(body, "<a/>", config.clone()).unwrap_err();
    let err = err
        .downcast::<TransformError>()
        .map_err(|_| "unexpected error type")?;
    assert!(matches!(*err, TransformError::Allocation(_)));

    let roomy = TransformConfig {
        max_output_nodes: Some(4),
        ..config
    };
    let result = transform_with(body, "<a/>", roomy)?;
    assert_eq!(markup(&result.document), "<x><y/><z/></x>");
    Ok(())
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_output_outlives_inputs() -> TestResult {
    let stylesheet = Stylesheet::parse(&wrap_stylesheet(
        r#"<xsl:template match="a"><copy><xsl:apply-templates/></copy></xsl:template>"#,
    ))?;
    let mut source = Document::parse("<a>payload</a>")?;
    let result = apply_stylesheet(&stylesheet, &source)?;

    let source_root = source.root_element().ok_or("missing source root")?;
    let late = source.create_text("late")?;
    source.append_child(source_root, late)?;
    assert_eq!(markup(&source), "<a>payloadlate</a>");
    assert_eq!(markup(&result.document), "<copy>payload</copy>");
    drop(source);
    drop(stylesheet);

    let mut document = result.document;
    let extra = document.create_comment("added later")?;
    let root = document.root_element().ok_or("missing root")?;
    document.append_child(root, extra)?;
    assert_eq!(markup(&document), "<copy>payload<!--added later--></copy>");
    Ok(())
}

#[test]
fn test_xml_attributes_keep_their_prefix() -> TestResult {
    let result = transform(
        r#"<xsl:template match="doc"><out xml:lang="en"><xsl:apply-templates/></out></xsl:template>
           <xsl:template match="p"><para xml:space="preserve"><xsl:apply-templates/></para></xsl:template>"#,
        r#"<doc><p>one</p></doc>"#,
    )?;
    assert_eq!(
        markup(&result.document),
        r#"<out xml:lang="en"><para xml:space="preserve">one</para></out>"#
    );
    assert!(result.diagnostics.is_empty());
    Ok(())
}

#[test]
fn test_stylesheet_is_reusable_across_runs() -> TestResult {
    let stylesheet = stylesheet(r#"<xsl:template match="a"><hit/></xsl:template>"#)?;
    let first = Document::parse("<a/>")?;
    let second = Document::parse("<b>miss</b>")?;
    assert_eq!(markup(&apply_stylesheet(&stylesheet, &first)?.document), "<hit/>");
    assert_eq!(markup(&apply_stylesheet(&stylesheet, &second)?.document), "miss");
    Ok(())
}
