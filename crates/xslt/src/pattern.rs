//! A dedicated engine for parsing and evaluating XSLT `match` patterns.
use crate::error::XsltError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};
use std::fmt;
use trellis_tree::{Document, NodeId, NodeKind};

/// A node test as it appears in a compiled pattern, with prefixes resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    /// `*`: any element.
    Wildcard,
    /// `prefix:*`: any element in the namespace.
    NamespaceWildcard(String),
    /// `name` or `prefix:name`.
    Name {
        namespace: Option<String>,
        local: String,
    },
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}

/// How a step relates to the step before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    /// `/`
    Child,
    /// `//`
    Descendant,
}

/// Where the first step of a path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Relative,
    /// `/step`, or `/` alone when there are no steps.
    Root,
    /// `//step`
    RootDescendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchStep {
    /// Separator between this step and the previous one. Ignored for the first step.
    separator: Separator,
    node_test: NodeTest,
}

/// A single location path within a pattern, e.g., "/doc/section//para".
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationPathPattern {
    anchor: Anchor,
    steps: Vec<MatchStep>,
}

/// A compiled representation of an XSLT match pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// A pattern can be a union of multiple paths, e.g., "para|note".
    paths: Vec<LocationPathPattern>,
    original_text: String,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original_text)
    }
}

impl Pattern {
    /// Parses a pattern that uses no namespace prefixes.
    pub fn parse(text: &str) -> Result<Pattern, XsltError> {
        Self::parse_with(text, |_| None)
    }

    /// Parses a pattern, resolving each prefix through `resolve`.
    pub fn parse_with(
        text: &str,
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Result<Pattern, XsltError> {
        let raw_paths = match pattern_parser(text.trim()) {
            Ok(("", paths)) => paths,
            Ok((rem, _)) => {
                return Err(XsltError::PatternParse(
                    text.to_string(),
                    format!("Unconsumed input in pattern: {}", rem),
                ));
            }
            Err(e) => return Err(XsltError::PatternParse(text.to_string(), e.to_string())),
        };

        let resolve_prefix = |prefix: &str| {
            resolve(prefix).ok_or_else(|| {
                XsltError::PatternParse(
                    text.to_string(),
                    format!("Undeclared namespace prefix '{}'", prefix),
                )
            })
        };

        let mut paths = Vec::with_capacity(raw_paths.len());
        for raw in raw_paths {
            let mut steps = Vec::with_capacity(raw.steps.len());
            for (separator, test) in raw.steps {
                let node_test = match test {
                    RawTest::Wildcard => NodeTest::Wildcard,
                    RawTest::PrefixWildcard(prefix) => {
                        NodeTest::NamespaceWildcard(resolve_prefix(prefix)?)
                    }
                    RawTest::Name { prefix, local } => NodeTest::Name {
                        namespace: prefix.map(resolve_prefix).transpose()?,
                        local: local.to_string(),
                    },
                    RawTest::NodeType(t) => NodeTest::NodeType(t),
                };
                steps.push(MatchStep {
                    separator,
                    node_test,
                });
            }
            paths.push(LocationPathPattern {
                anchor: raw.anchor,
                steps,
            });
        }

        Ok(Pattern {
            paths,
            original_text: text.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original_text
    }

    /// Evaluates if a given node matches this compiled pattern.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.paths.iter().any(|path| path.matches(doc, node))
    }

    /// The default priority of the highest-priority alternative that
    /// matches `node`, or `None` when no alternative matches.
    pub fn match_priority(&self, doc: &Document, node: NodeId) -> Option<f64> {
        self.paths
            .iter()
            .filter(|path| path.matches(doc, node))
            .map(LocationPathPattern::default_priority)
            .reduce(f64::max)
    }
}

impl LocationPathPattern {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if self.steps.is_empty() {
            // Special case for "/"
            return self.anchor == Anchor::Root && doc.kind(node).is_document();
        }
        self.matches_step(doc, node, self.steps.len() - 1)
    }

    /// Matches `steps[index]` against `node`, then the preceding steps against
    /// its ancestors.
    fn matches_step(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        let step = &self.steps[index];
        if !step.node_test.matches(doc, node) {
            return false;
        }

        if index == 0 {
            return match self.anchor {
                Anchor::Relative => true,
                Anchor::Root => doc
                    .parent(node)
                    .is_some_and(|p| doc.kind(p).is_document()),
                Anchor::RootDescendant => ancestors(doc, node).any(|a| doc.kind(a).is_document()),
            };
        }

        match step.separator {
            Separator::Child => doc
                .parent(node)
                .is_some_and(|p| self.matches_step(doc, p, index - 1)),
            Separator::Descendant => {
                ancestors(doc, node).any(|a| self.matches_step(doc, a, index - 1))
            }
        }
    }

    fn default_priority(&self) -> f64 {
        match (self.anchor, self.steps.as_slice()) {
            (Anchor::Relative, [only]) => match only.node_test {
                NodeTest::Name { .. } => 0.0,
                NodeTest::NamespaceWildcard(_) => -0.25,
                NodeTest::Wildcard | NodeTest::NodeType(_) => -0.5,
            },
            _ => 0.5,
        }
    }
}

fn ancestors(doc: &Document, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(doc.parent(node), move |&n| doc.parent(n))
}

impl NodeTest {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let kind = doc.kind(node);
        match self {
            NodeTest::Wildcard => kind == NodeKind::Element,
            NodeTest::NamespaceWildcard(uri) => {
                kind == NodeKind::Element && doc.namespace(node) == Some(uri.as_str())
            }
            NodeTest::Name { namespace, local } => {
                kind == NodeKind::Element
                    && doc.local_name(node) == Some(local.as_str())
                    && doc.namespace(node) == namespace.as_deref()
            }
            NodeTest::NodeType(ntt) => match ntt {
                NodeTypeTest::Text => matches!(kind, NodeKind::Text | NodeKind::CData),
                NodeTypeTest::Comment => kind == NodeKind::Comment,
                NodeTypeTest::ProcessingInstruction => kind == NodeKind::ProcessingInstruction,
                NodeTypeTest::Node => matches!(
                    kind,
                    NodeKind::Element
                        | NodeKind::Text
                        | NodeKind::CData
                        | NodeKind::Comment
                        | NodeKind::ProcessingInstruction
                ),
            },
        }
    }
}

// --- Parser ---

#[derive(Debug)]
enum RawTest<'a> {
    Wildcard,
    PrefixWildcard(&'a str),
    Name {
        prefix: Option<&'a str>,
        local: &'a str,
    },
    NodeType(NodeTypeTest),
}

#[derive(Debug)]
struct RawPath<'a> {
    anchor: Anchor,
    steps: Vec<(Separator, RawTest<'a>)>,
}

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.'),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, RawTest<'_>> {
    map(
        terminated(
            alt((
                tag("text"),
                tag("node"),
                tag("comment"),
                tag("processing-instruction"),
            )),
            pair(
                delimited(multispace0, char('('), multispace0),
                char(')'),
            ),
        ),
        |node_type: &str| {
            RawTest::NodeType(match node_type {
                "text" => NodeTypeTest::Text,
                "comment" => NodeTypeTest::Comment,
                "processing-instruction" => NodeTypeTest::ProcessingInstruction,
                _ => NodeTypeTest::Node,
            })
        },
    )
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, RawTest<'_>> {
    alt((
        map(tag("*"), |_| RawTest::Wildcard),
        node_type_test,
        map(terminated(nc_name, tag(":*")), RawTest::PrefixWildcard),
        map(
            pair(nc_name, opt(preceded(char(':'), nc_name))),
            |(first, second)| match second {
                Some(local) => RawTest::Name {
                    prefix: Some(first),
                    local,
                },
                None => RawTest::Name {
                    prefix: None,
                    local: first,
                },
            },
        ),
    ))
    .parse(input)
}

fn separator(input: &str) -> IResult<&str, Separator> {
    alt((
        map(tag("//"), |_| Separator::Descendant),
        map(tag("/"), |_| Separator::Child),
    ))
    .parse(input)
}

fn path_parser(input: &str) -> IResult<&str, RawPath<'_>> {
    let (input, lead) = opt(separator).parse(input)?;
    let (input, first) = match lead {
        // An absolute path can be just `/`.
        Some(Separator::Child) => opt(node_test).parse(input)?,
        _ => map(node_test, Some).parse(input)?,
    };
    let anchor = match lead {
        None => Anchor::Relative,
        Some(Separator::Child) => Anchor::Root,
        Some(Separator::Descendant) => Anchor::RootDescendant,
    };
    let Some(first) = first else {
        return Ok((input, RawPath { anchor, steps: Vec::new() }));
    };

    let (input, rest) = many0(pair(separator, node_test)).parse(input)?;
    let mut steps = Vec::with_capacity(rest.len() + 1);
    steps.push((Separator::Child, first));
    steps.extend(rest);
    Ok((input, RawPath { anchor, steps }))
}

fn pattern_parser(input: &str) -> IResult<&str, Vec<RawPath<'_>>> {
    separated_list1(delimited(multispace0, char('|'), multispace0), path_parser).parse(input)
}
