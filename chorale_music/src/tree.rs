// The composition tree: every rule-valid continuation of a bass line.
//
// Each node holds a chord and its 1-based depth (the root, i.e. the caller's
// starting chord, is depth 1). A `Node` may have children; a `Leaf` is a
// final cadence chord; `Empty` is a placeholder that counts for nothing.
// A `Node` with no children is a dead branch: some transition below it had no
// valid chord.
//
// Trees are built bottom-up and never mutated afterwards, so the leaf count
// and maximum depth of every subtree are computed once in the constructors.
// That keeps `level()` and `total_depth()` O(1), which the path selectors
// rely on when they compare siblings at every step.

use std::fmt::Write as _;

use crate::chord::Chord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeKind {
    Node(Vec<ChordTree>),
    Leaf,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordTree {
    chord: Chord,
    depth: usize,
    kind: TreeKind,
    leaves: u64,
    max_depth: usize,
}

impl ChordTree {
    pub fn node(chord: Chord, depth: usize, children: Vec<ChordTree>) -> Self {
        let leaves = children.iter().map(|c| c.leaves).sum();
        let max_depth = children
            .iter()
            .map(|c| c.max_depth)
            .fold(depth, usize::max);
        ChordTree {
            chord,
            depth,
            kind: TreeKind::Node(children),
            leaves,
            max_depth,
        }
    }

    pub fn leaf(chord: Chord, depth: usize) -> Self {
        ChordTree {
            chord,
            depth,
            kind: TreeKind::Leaf,
            leaves: 1,
            max_depth: depth,
        }
    }

    pub fn empty(depth: usize) -> Self {
        ChordTree {
            chord: Chord::EMPTY,
            depth,
            kind: TreeKind::Empty,
            leaves: 0,
            max_depth: depth,
        }
    }

    pub fn chord(&self) -> Chord {
        self.chord
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn kind(&self) -> &TreeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TreeKind::Leaf)
    }

    /// Children of a `Node`; empty for leaves and placeholders.
    pub fn children(&self) -> &[ChordTree] {
        match &self.kind {
            TreeKind::Node(children) => children,
            TreeKind::Leaf | TreeKind::Empty => &[],
        }
    }

    /// Number of leaves below, i.e. complete harmonizations.
    pub fn level(&self) -> u64 {
        self.leaves
    }

    /// Deepest depth in this subtree (own depth if childless).
    pub fn total_depth(&self) -> usize {
        self.max_depth
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(t) = stack.pop() {
            count += 1;
            stack.extend(t.children());
        }
        count
    }

    /// One line per node, indented by depth, with the chord's note names.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(t) = stack.pop() {
            let indent = "  ".repeat(t.depth.saturating_sub(1));
            let tag = match t.kind {
                TreeKind::Node(_) => "node",
                TreeKind::Leaf => "leaf",
                TreeKind::Empty => "empty",
            };
            if t.chord.is_empty() {
                let _ = writeln!(out, "{indent}{tag} {}", t.depth);
            } else {
                let _ = writeln!(out, "{indent}{tag} {} [{}]", t.depth, t.chord.note_names());
            }
            stack.extend(t.children().iter().rev());
        }
        out
    }
}

impl Drop for ChordTree {
    // Flatten before dropping so deep trees do not recurse.
    fn drop(&mut self) {
        let TreeKind::Node(children) = &mut self.kind else {
            return;
        };
        let mut stack = std::mem::take(children);
        while let Some(mut t) = stack.pop() {
            if let TreeKind::Node(grandchildren) = &mut t.kind {
                stack.append(grandchildren);
            }
        }
    }
}
