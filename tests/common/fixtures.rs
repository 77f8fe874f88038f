pub const XSLT_NS: &str = "http://www.w3.org/1999/XSL/Transform";

/// Wraps top-level declarations in an `xsl:stylesheet` element.
pub fn wrap_stylesheet(body: &str) -> String {
    format!(
        r#"<xsl:stylesheet version="1.0" xmlns:xsl="{}">{}</xsl:stylesheet>"#,
        XSLT_NS, body
    )
}

/// A small catalogue used by several tests.
pub const CATALOGUE: &str = r#"<catalogue>
  <book id="b1">
    <title>Dune</title>
    <author>Herbert</author>
  </book>
  <book id="b2">
    <title>Solaris</title>
    <author>Lem</author>
  </book>
</catalogue>"#;

/// Renders books as list items inside an HTML skeleton.
pub const CATALOGUE_HTML: &str = r#"
  <xsl:output method="html" doctype-public="-//W3C//DTD HTML 4.01//EN"/>
  <xsl:template match="catalogue">
    <html>
      <body>
        <ul><xsl:apply-templates/></ul>
      </body>
    </html>
  </xsl:template>
  <xsl:template match="book">
    <li><xsl:apply-templates/></li>
  </xsl:template>
  <xsl:template match="author"/>
"#;
