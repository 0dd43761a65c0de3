//! Gemfile.lock grammar
//!
//! ```text
//! Lockfile     <- Source* Platforms Dependencies EndOfInput
//! Source       <- Gem / Git / Svn / Path
//! Gem          <- "GEM" LineEnd Option* Specs LineEnd      (likewise GIT, SVN, PATH)
//! Option       <- Indent2 [a-zA-Z]+ ": " RestOfLine LineEnd
//! Specs        <- Indent2 "specs:" LineEnd Spec+
//! Spec         <- Indent4 GemVersion SpecDep*
//! SpecDep      <- Indent6 GemVersion
//! Platforms    <- "PLATFORMS" LineEnd Platform+ LineEnd
//! Platform     <- Indent2 NotWhitespace+ LineEnd
//! Dependencies <- "DEPENDENCIES" LineEnd Dependency+
//! Dependency   <- Indent2 GemVersion
//! GemVersion   <- GemName Spaces Version? LineEnd
//! Version      <- "(" Constraint (", " Constraint)* ")"
//! Constraint   <- VersionOp? Spaces [0-9]+ ("." [0-9]+)*
//! VersionOp    <- "=" / "!=" / "<=" / "<" / ">=" / ">" / "~>"
//! EndOfInput   <- EndOfLine* !.
//! ```
//!
//! Indentation is structural: `IndentN` is exactly N space characters.
//!
//! Each production returns the [`Node`] it matched. Nothing is recorded
//! anywhere else, so an alternative that is abandoned during backtracking
//! simply drops its nodes.

use super::peg::{Cursor, Failure, Span};

/// Grammar productions that appear in the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Lockfile,
    Gem,
    Git,
    Svn,
    Path,
    OptionLine,
    OptionKey,
    OptionValue,
    Specs,
    Spec,
    SpecDep,
    Platforms,
    Platform,
    PlatformName,
    Dependencies,
    Dependency,
    GemVersion,
    GemName,
    Version,
    Constraint,
    VersionOp,
    VersionNumber,
}

impl Rule {
    /// What a reader should have found when this rule fails.
    pub fn expected(self) -> &'static str {
        match self {
            Rule::Lockfile => "lockfile",
            Rule::Gem => "GEM source block",
            Rule::Git => "GIT source block",
            Rule::Svn => "SVN source block",
            Rule::Path => "PATH source block",
            Rule::OptionLine => "source option (key: value)",
            Rule::OptionKey => "option name",
            Rule::OptionValue => "option value",
            Rule::Specs => "specs: section",
            Rule::Spec => "gem specification line",
            Rule::SpecDep => "spec dependency line",
            Rule::Platforms => "PLATFORMS section",
            Rule::Platform => "platform line",
            Rule::PlatformName => "platform name",
            Rule::Dependencies => "DEPENDENCIES section",
            Rule::Dependency => "dependency line",
            Rule::GemVersion => "gem name and version",
            Rule::GemName => "gem name",
            Rule::Version => "version constraint list",
            Rule::Constraint => "version constraint",
            Rule::VersionOp => "version operator",
            Rule::VersionNumber => "version number",
        }
    }
}

/// A matched production and the span of input it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub rule: Rule,
    pub span: Span,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        self.span.slice(input)
    }

    /// First direct child produced by `rule`.
    pub fn child(&self, rule: Rule) -> Option<&Node> {
        self.children.iter().find(|child| child.rule == rule)
    }

    /// Direct children produced by `rule`, in input order.
    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |child| child.rule == rule)
    }
}

/// Match the whole input against the grammar.
///
/// On failure, returns the farthest point any rule reached and the rules that
/// were expected there.
pub fn parse_tree(input: &str) -> Result<Node, Failure> {
    let mut cursor = Cursor::new(input);
    match lockfile(&mut cursor) {
        Some(tree) => Ok(tree),
        None => Err(cursor.into_failure()),
    }
}

const EOF_LABEL: &str = "end of input";
const EOL_LABEL: &str = "end of line";

fn node(
    c: &mut Cursor<'_>,
    rule: Rule,
    f: impl FnOnce(&mut Cursor<'_>) -> Option<Vec<Node>>,
) -> Option<Node> {
    c.rule(rule.expected(), |c| {
        let start = c.pos();
        let children = f(c)?;
        Some(Node {
            rule,
            span: Span::new(start, c.pos()),
            children,
        })
    })
}

fn leaf<T>(c: &mut Cursor<'_>, rule: Rule, f: impl FnOnce(&mut Cursor<'_>) -> Option<T>) -> Option<Node> {
    node(c, rule, |c| {
        f(c)?;
        Some(Vec::new())
    })
}

fn lockfile(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Lockfile, |c| {
        let mut children = c.zero_or_more(source);
        children.push(platforms(c)?);
        children.push(dependencies(c)?);
        end_of_file(c)?;
        Some(children)
    })
}

const SOURCE_BLOCKS: [fn(&mut Cursor<'_>) -> Option<Node>; 4] = [gem, git, svn, path];

fn source(c: &mut Cursor<'_>) -> Option<Node> {
    c.choice(&SOURCE_BLOCKS)
}

fn gem(c: &mut Cursor<'_>) -> Option<Node> {
    source_block(c, Rule::Gem, "GEM")
}

fn git(c: &mut Cursor<'_>) -> Option<Node> {
    source_block(c, Rule::Git, "GIT")
}

fn svn(c: &mut Cursor<'_>) -> Option<Node> {
    source_block(c, Rule::Svn, "SVN")
}

fn path(c: &mut Cursor<'_>) -> Option<Node> {
    source_block(c, Rule::Path, "PATH")
}

fn source_block(c: &mut Cursor<'_>, rule: Rule, keyword: &str) -> Option<Node> {
    node(c, rule, |c| {
        c.literal(keyword)?;
        line_end(c)?;
        let mut children = c.zero_or_more(option);
        children.push(specs(c)?);
        line_end(c)?;
        Some(children)
    })
}

fn option(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::OptionLine, |c| {
        indent(c, 2)?;
        let key = leaf(c, Rule::OptionKey, |c| {
            c.one_or_more(|c| c.char_if(|ch| ch.is_ascii_alphabetic()))
        })?;
        c.literal(": ")?;
        let value = leaf(c, Rule::OptionValue, |c| Some(rest_of_line(c)))?;
        line_end(c)?;
        Some(vec![key, value])
    })
}

fn specs(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Specs, |c| {
        indent(c, 2)?;
        c.literal("specs:")?;
        line_end(c)?;
        c.one_or_more(spec)
    })
}

fn spec(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Spec, |c| {
        indent(c, 4)?;
        let mut children = vec![gem_version(c)?];
        children.extend(c.zero_or_more(spec_dep));
        Some(children)
    })
}

fn spec_dep(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::SpecDep, |c| {
        indent(c, 6)?;
        Some(vec![gem_version(c)?])
    })
}

fn platforms(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Platforms, |c| {
        c.literal("PLATFORMS")?;
        line_end(c)?;
        let children = c.one_or_more(platform)?;
        line_end(c)?;
        Some(children)
    })
}

fn platform(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Platform, |c| {
        indent(c, 2)?;
        let name = leaf(c, Rule::PlatformName, |c| c.one_or_more(not_whitespace))?;
        line_end(c)?;
        Some(vec![name])
    })
}

fn dependencies(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Dependencies, |c| {
        c.literal("DEPENDENCIES")?;
        line_end(c)?;
        c.one_or_more(dependency)
    })
}

fn dependency(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Dependency, |c| {
        indent(c, 2)?;
        Some(vec![gem_version(c)?])
    })
}

fn gem_version(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::GemVersion, |c| {
        let mut children = vec![gem_name(c)?];
        spaces(c);
        children.extend(c.optional(version));
        line_end(c)?;
        Some(children)
    })
}

fn gem_name(c: &mut Cursor<'_>) -> Option<Node> {
    leaf(c, Rule::GemName, |c| c.one_or_more(|c| c.char_if(is_gem_name_char)))
}

fn is_gem_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '!')
}

fn version(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Version, |c| {
        c.literal("(")?;
        let mut children = vec![constraint(c)?];
        children.extend(c.zero_or_more(|c| {
            c.literal(", ")?;
            constraint(c)
        }));
        c.literal(")")?;
        Some(children)
    })
}

fn constraint(c: &mut Cursor<'_>) -> Option<Node> {
    node(c, Rule::Constraint, |c| {
        let mut children: Vec<Node> = c.optional(version_op).into_iter().collect();
        spaces(c);
        children.push(version_number(c)?);
        Some(children)
    })
}

fn version_op(c: &mut Cursor<'_>) -> Option<Node> {
    leaf(c, Rule::VersionOp, |c| {
        c.one_of(&["=", "!=", "<=", "<", ">=", ">", "~>"])
    })
}

fn version_number(c: &mut Cursor<'_>) -> Option<Node> {
    leaf(c, Rule::VersionNumber, |c| {
        digits(c)?;
        c.zero_or_more(|c| {
            c.literal(".")?;
            digits(c)
        });
        Some(())
    })
}

fn digits(c: &mut Cursor<'_>) -> Option<Vec<char>> {
    c.one_or_more(|c| c.char_if(|ch| ch.is_ascii_digit()))
}

fn indent(c: &mut Cursor<'_>, width: usize) -> Option<Vec<Span>> {
    c.repeat(width, Some(width), |c| c.literal(" "))
}

fn spaces(c: &mut Cursor<'_>) -> Vec<char> {
    c.zero_or_more(|c| c.char_if(|ch| ch == ' ' || ch == '\t'))
}

fn end_of_line(c: &mut Cursor<'_>) -> Option<Span> {
    c.one_of(&["\r\n", "\n", "\r"])
}

/// Optional trailing spaces and a terminator. Failures here are reported as
/// a missing line end rather than against the enclosing rule.
fn line_end(c: &mut Cursor<'_>) -> Option<Span> {
    c.rule(EOL_LABEL, |c| {
        spaces(c);
        end_of_line(c)
    })
}

fn rest_of_line(c: &mut Cursor<'_>) -> Vec<char> {
    c.zero_or_more(|c| {
        c.not_ahead(end_of_line)?;
        c.any_char()
    })
}

fn not_whitespace(c: &mut Cursor<'_>) -> Option<char> {
    c.not_ahead(|c| c.one_of(&[" ", "\t", "\r", "\n"]))?;
    c.any_char()
}

fn end_of_file(c: &mut Cursor<'_>) -> Option<()> {
    c.rule(EOF_LABEL, |c| {
        c.zero_or_more(end_of_line);
        c.end_of_input()
    })
}
