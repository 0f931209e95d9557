//! Abstract syntax tree for game definitions.
//!
//! The tree has three node kinds: a single [`NodeKind::Root`], whose children
//! are [`NodeKind::Operation`] nodes, whose children are [`NodeKind::Value`]
//! leaves holding positional arguments as raw text.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Forward references
//! are resolved by rewriting a value node in place, which is a plain index
//! write into the arena.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::opcode::{Opcode, Target};

/// Index of a node in an [`Ast`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The kind of an AST node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    /// The tree root.
    Root,
    /// An operation with its opcode.
    Operation(Opcode),
    /// A positional argument.
    Value,
}

/// A single node in the arena.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    /// What kind of node this is.
    pub kind: NodeKind,
    /// The node's text. Empty for the root, the opcode name for operations.
    pub value: String,
    /// 1-based source line, or 0 for the root.
    pub line: usize,
    /// Child node ids, in positional order.
    pub children: Vec<NodeId>,
}

/// A game-definition AST.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    /// The root node's id.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates an AST containing only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                value: String::new(),
                line: 0,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the node with the given id.
    ///
    /// Ids are only handed out by this arena, so an id from a different
    /// `Ast` may point anywhere.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Returns the number of operations under the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes[0].children.len()
    }

    /// Returns true if the AST has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an operation with the given arguments to the root.
    pub fn push_operation(&mut self, opcode: Opcode, args: &[&str], line: usize) -> NodeId {
        let children = args.iter().map(|arg| self.alloc_value(arg, line)).collect();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Operation(opcode),
            value: opcode.name().to_string(),
            line,
            children,
        });
        self.nodes[0].children.push(id);
        id
    }

    /// Overwrites the text of an operation's positional argument.
    ///
    /// Returns false if the operation has no argument at `index`.
    pub fn set_argument(&mut self, operation: NodeId, index: usize, value: &str) -> bool {
        let Some(&child) = self.nodes[operation.0].children.get(index) else {
            return false;
        };
        value.clone_into(&mut self.nodes[child.0].value);
        true
    }

    /// Appends a positional argument to an existing operation.
    pub fn push_argument(&mut self, operation: NodeId, value: &str) {
        let line = self.nodes[operation.0].line;
        let child = self.alloc_value(value, line);
        self.nodes[operation.0].children.push(child);
    }

    /// Iterates over the root's operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.nodes[0].children.iter().filter_map(|&id| {
            let node = &self.nodes[id.0];
            let NodeKind::Operation(opcode) = node.kind else {
                return None;
            };
            Some(OperationRef {
                id,
                opcode,
                line: node.line,
                args: node
                    .children
                    .iter()
                    .map(|child| self.nodes[child.0].value.as_str())
                    .collect(),
            })
        })
    }

    fn alloc_value(&mut self, value: &str, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Value,
            value: value.to_string(),
            line,
            children: Vec::new(),
        });
        id
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed view of one operation and its argument text.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRef<'a> {
    /// The operation node's id.
    pub id: NodeId,
    /// The operation's opcode.
    pub opcode: Opcode,
    /// The operation's source line.
    pub line: usize,
    /// Positional argument text.
    pub args: Vec<&'a str>,
}

impl OperationRef<'_> {
    /// Returns the target discriminator, if this opcode takes one and the
    /// first argument names a valid target.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        if self.opcode.targets().is_empty() {
            return None;
        }
        self.args.first().and_then(|t| Target::from_name(t))
    }

    /// Returns the argument at `index`, or the empty string if absent.
    #[must_use]
    pub fn arg(&self, index: usize) -> &str {
        self.args.get(index).copied().unwrap_or("")
    }

    /// Returns the arguments after the target discriminator and, for named
    /// targets, the entity or class name.
    #[must_use]
    pub fn payload(&self) -> &[&str] {
        let skip = match self.target() {
            Some(target) if target.is_named() => 2,
            Some(_) => 1,
            None => 0,
        };
        self.args.get(skip..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_in_order() {
        let mut ast = Ast::new();
        ast.push_operation(Opcode::DefineDirection, &["up"], 1);
        ast.push_operation(Opcode::DefineDirectionSynonym, &["up", "u"], 2);

        let ops: Vec<_> = ast.operations().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].opcode, Opcode::DefineDirection);
        assert_eq!(ops[1].args, vec!["up", "u"]);
        assert_eq!(ops[1].line, 2);
    }

    #[test]
    fn patch_argument_in_place() {
        let mut ast = Ast::new();
        let op = ast.push_operation(Opcode::DefineEntity, &["cave", "room", "room"], 3);
        assert!(ast.set_argument(op, 2, "grotto"));
        assert!(!ast.set_argument(op, 7, "nope"));
        ast.push_argument(op, "caves");

        let view = ast.operations().next().unwrap();
        assert_eq!(view.args, vec!["cave", "room", "grotto", "caves"]);
    }

    #[test]
    fn payload_skips_target() {
        let mut ast = Ast::new();
        ast.push_operation(Opcode::SetProperty, &["entity", "candle", "weight", "5"], 1);
        ast.push_operation(Opcode::SetProperty, &["game", "introduction.text", "hi"], 2);
        let ops: Vec<_> = ast.operations().collect();
        assert_eq!(ops[0].target(), Some(Target::Entity));
        assert_eq!(ops[0].payload(), &["weight", "5"]);
        assert_eq!(ops[1].payload(), &["introduction.text", "hi"]);
    }

    #[test]
    fn root_holds_only_operations() {
        let mut ast = Ast::new();
        ast.push_operation(Opcode::SetTimerPeriod, &["100"], 1);
        for &child in &ast.node(Ast::ROOT).children {
            assert!(matches!(ast.node(child).kind, NodeKind::Operation(_)));
        }
    }
}
