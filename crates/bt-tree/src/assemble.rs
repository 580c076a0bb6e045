//! Turns a [`NodeDeclaration`] tree into a [`TreeRegistry`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{CompositeKind, DecoratorKind, LeafKind, NodeCategory, NodeKind, RuntimeNode};
use crate::declaration::NodeDeclaration;
use crate::error::{TreeError, TreeResult};
use crate::registry::{DeclaredNode, TreeEntry, TreeRegistry};

/// Slug the top-level declaration must carry.
pub const ROOT_SLUG: &str = "root";

/// Build the runtime registry for a whole tree. Fails without returning a partial tree.
pub fn assemble(declaration: &NodeDeclaration) -> TreeResult<TreeRegistry> {
    if declaration.slug != ROOT_SLUG {
        return Err(TreeError::malformed(
            &declaration.slug,
            format!("top-level node must have slug {ROOT_SLUG:?}"),
        ));
    }

    let mut assembler = Assembler::default();
    assembler.visit(declaration, None)?;

    let registry = TreeRegistry::from_parts(assembler.entries, assembler.index);
    if !registry.root().declaration().kind.is_decorator() {
        return Err(TreeError::malformed(
            ROOT_SLUG,
            format!(
                "root must be a decorator, found {}",
                registry.root().declaration().kind
            ),
        ));
    }

    debug!(nodes = registry.len(), "assembled behavior tree");
    Ok(registry)
}

#[derive(Default)]
struct Assembler {
    entries: Vec<TreeEntry>,
    index: BTreeMap<String, usize>,
}

impl Assembler {
    fn visit(&mut self, decl: &NodeDeclaration, parent: Option<NodeKind>) -> TreeResult<usize> {
        let kind = NodeKind::from_name(&decl.kind).ok_or_else(|| TreeError::UnknownNodeType {
            slug: decl.slug.clone(),
            kind: decl.kind.clone(),
        })?;

        if self.index.contains_key(&decl.slug) {
            return Err(TreeError::DuplicateSlug(decl.slug.clone()));
        }

        check_shape(decl, kind)?;
        if parent == Some(NodeKind::Composite(CompositeKind::ProbabilitySelector)) {
            check_weight(decl)?;
        }

        let idx = self.entries.len();
        self.entries.push(TreeEntry {
            declaration: DeclaredNode {
                slug: decl.slug.clone(),
                kind,
                children: decl.children.iter().map(|c| c.slug.clone()).collect(),
                weight: decl.weight,
                limit: decl.limit,
                selector_handler: decl.selector_handler.clone(),
                action_handler: decl.action_handler.clone(),
                condition_handler: decl.condition_handler.clone(),
                name: decl.name.clone(),
                description: decl.description.clone(),
            },
            node: RuntimeNode::new(kind),
            children: Vec::with_capacity(decl.children.len()),
        });
        self.index.insert(decl.slug.clone(), idx);

        for child in &decl.children {
            let child_idx = self.visit(child, Some(kind))?;
            self.entries[idx].children.push(child_idx);
        }

        Ok(idx)
    }
}

fn check_shape(decl: &NodeDeclaration, kind: NodeKind) -> TreeResult<()> {
    let n = decl.children.len();
    match kind.category() {
        NodeCategory::Composite if n == 0 => {
            return Err(TreeError::malformed(
                &decl.slug,
                format!("{kind} needs at least one child"),
            ));
        }
        NodeCategory::Decorator if n != 1 => {
            return Err(TreeError::malformed(
                &decl.slug,
                format!("{kind} needs exactly one child, found {n}"),
            ));
        }
        NodeCategory::Leaf if n != 0 => {
            return Err(TreeError::malformed(
                &decl.slug,
                format!("{kind} cannot have children, found {n}"),
            ));
        }
        _ => {}
    }

    match kind {
        NodeKind::Decorator(DecoratorKind::LimitTries | DecoratorKind::LimitTime) => {
            match decl.limit {
                Some(limit) if limit.is_finite() && limit > 0.0 => {}
                _ => {
                    return Err(TreeError::malformed(
                        &decl.slug,
                        format!("{kind} requires a positive `limit`"),
                    ))
                }
            }
        }
        NodeKind::Composite(CompositeKind::Selector) => {
            require_key(decl, kind, decl.selector_handler.as_deref(), "selectorHandler")?
        }
        NodeKind::Leaf(LeafKind::Action) => {
            require_key(decl, kind, decl.action_handler.as_deref(), "actionHandler")?
        }
        NodeKind::Leaf(LeafKind::Condition) => {
            require_key(decl, kind, decl.condition_handler.as_deref(), "conditionHandler")?
        }
        _ => {}
    }

    Ok(())
}

fn require_key(
    decl: &NodeDeclaration,
    kind: NodeKind,
    key: Option<&str>,
    field: &str,
) -> TreeResult<()> {
    match key {
        Some(k) if !k.is_empty() => Ok(()),
        _ => Err(TreeError::malformed(
            &decl.slug,
            format!("{kind} requires `{field}`"),
        )),
    }
}

fn check_weight(decl: &NodeDeclaration) -> TreeResult<()> {
    match decl.weight {
        Some(w) if w.is_finite() && w >= 0.0 => Ok(()),
        Some(w) => Err(TreeError::malformed(
            &decl.slug,
            format!("weight must be a non-negative number, found {w}"),
        )),
        None => Err(TreeError::malformed(
            &decl.slug,
            "child of a ProbabilitySelector requires a `weight`",
        )),
    }
}
