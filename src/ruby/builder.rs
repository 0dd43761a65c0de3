//! Converts a committed parse tree into a [`Lockfile`]
//!
//! The same `GemVersion` shape appears under a spec, under a spec's
//! dependency list, and under the top-level DEPENDENCIES section. Which list
//! a gem lands in is decided by the [`Context`] passed down the walk: a
//! `Spec`, `SpecDep` or `Dependency` node sets it for its own subtree only,
//! and siblings never see each other's context.
//!
//! The walk runs once, in input order, after the grammar has accepted the
//! whole file, so nothing here can observe an abandoned match.

use super::grammar::{Node, Rule};
use super::lockfile::{GemRef, Lockfile, Source, SourceKind, Spec};
use thiserror::Error;

/// Which list a matched gem line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// A line of the top-level DEPENDENCIES section.
    TopLevelDependency,
    /// A resolved spec directly under `specs:`.
    SourceSpec,
    /// A requirement indented under a spec.
    SpecSubDependency,
}

/// A tree that does not have the nesting the grammar guarantees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{found} at offset {offset} is not inside a {missing}")]
pub struct BuildError {
    pub found: &'static str,
    pub missing: &'static str,
    pub offset: usize,
}

/// Build a [`Lockfile`] from the tree returned by
/// [`parse_tree`](super::grammar::parse_tree) for `input`.
pub fn build(tree: &Node, input: &str) -> Result<Lockfile, BuildError> {
    let mut builder = Builder {
        input,
        lockfile: Lockfile::default(),
    };
    builder.visit(tree, Context::TopLevelDependency)?;
    Ok(builder.lockfile)
}

struct Builder<'a> {
    input: &'a str,
    lockfile: Lockfile,
}

impl Builder<'_> {
    fn visit(&mut self, node: &Node, context: Context) -> Result<(), BuildError> {
        match node.rule {
            Rule::Gem => self.open_source(SourceKind::RubyGems),
            Rule::Git => self.open_source(SourceKind::Git),
            Rule::Svn => self.open_source(SourceKind::Svn),
            Rule::Path => self.open_source(SourceKind::Path),
            Rule::OptionLine => return self.add_option(node),
            Rule::PlatformName => {
                self.lockfile.platforms.push(node.text(self.input).to_string());
                return Ok(());
            }
            Rule::Spec => return self.visit_children(node, Context::SourceSpec),
            Rule::SpecDep => return self.visit_children(node, Context::SpecSubDependency),
            Rule::Dependency => return self.visit_children(node, Context::TopLevelDependency),
            Rule::GemName => return self.add_gem(context, node),
            Rule::Version => return self.set_version(context, node),
            _ => {}
        }
        self.visit_children(node, context)
    }

    fn visit_children(&mut self, node: &Node, context: Context) -> Result<(), BuildError> {
        for child in &node.children {
            self.visit(child, context)?;
        }
        Ok(())
    }

    fn open_source(&mut self, kind: SourceKind) {
        self.lockfile.sources.push(Source::new(kind));
    }

    fn add_option(&mut self, node: &Node) -> Result<(), BuildError> {
        let key = node.child(Rule::OptionKey).map(|n| n.text(self.input));
        let value = node.child(Rule::OptionValue).map(|n| n.text(self.input));
        let source = self.current_source(node)?;
        if let (Some(key), Some(value)) = (key, value) {
            source.options.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn add_gem(&mut self, context: Context, node: &Node) -> Result<(), BuildError> {
        let name = node.text(self.input).to_string();
        match context {
            Context::SourceSpec => {
                self.current_source(node)?.specs.push(Spec::new(name));
            }
            Context::SpecSubDependency => {
                self.current_spec(node)?.dependencies.push(GemRef::new(name));
            }
            Context::TopLevelDependency => {
                self.lockfile.dependencies.push(GemRef::new(name));
            }
        }
        Ok(())
    }

    /// Attach version text to whatever `add_gem` appended last in `context`.
    fn set_version(&mut self, context: Context, node: &Node) -> Result<(), BuildError> {
        let version = node.text(self.input).to_string();
        match context {
            Context::SourceSpec => {
                self.current_spec(node)?.version = version;
            }
            Context::SpecSubDependency => {
                let spec = self.current_spec(node)?;
                let dep = spec
                    .dependencies
                    .last_mut()
                    .ok_or_else(|| orphan(node, "spec dependency"))?;
                dep.version = Some(version);
            }
            Context::TopLevelDependency => {
                let dep = self
                    .lockfile
                    .dependencies
                    .last_mut()
                    .ok_or_else(|| orphan(node, "dependency"))?;
                dep.version = Some(version);
            }
        }
        Ok(())
    }

    fn current_source(&mut self, node: &Node) -> Result<&mut Source, BuildError> {
        self.lockfile
            .sources
            .last_mut()
            .ok_or_else(|| orphan(node, "source block"))
    }

    fn current_spec(&mut self, node: &Node) -> Result<&mut Spec, BuildError> {
        self.current_source(node)?
            .specs
            .last_mut()
            .ok_or_else(|| orphan(node, "spec"))
    }
}

fn orphan(node: &Node, missing: &'static str) -> BuildError {
    BuildError {
        found: node.rule.expected(),
        missing,
        offset: node.span.start,
    }
}
