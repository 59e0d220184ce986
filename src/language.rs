use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHasher;

// ============================================================================
// Operator Kinds
// ============================================================================

/// The four binary set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Union,
    Intersection,
    Complement,
    Product,
}

impl OpKind {
    /// The single-character symbol used in source text and display.
    pub fn sign(self) -> char {
        match self {
            OpKind::Union => 'u',
            OpKind::Intersection => 'n',
            OpKind::Complement => '\\',
            OpKind::Product => 'x',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<OpKind> {
        match symbol {
            'u' => Some(OpKind::Union),
            'n' => Some(OpKind::Intersection),
            '\\' => Some(OpKind::Complement),
            'x' => Some(OpKind::Product),
            _ => None,
        }
    }

    /// Apply the operator to two fully reduced element sets.
    pub fn apply(self, left: &ElementSet, right: &ElementSet) -> Expr {
        match self {
            OpKind::Union => Expr::Set(left.union(right)),
            OpKind::Intersection => Expr::Set(left.intersection(right)),
            OpKind::Complement => Expr::Set(left.difference(right)),
            OpKind::Product => {
                // Pairs reuse the set-literal representation, so a pair of
                // equal elements collapses to a singleton: {1} x {1} is {{1}}.
                let mut pairs = ElementSet::new();
                for l in left.iter() {
                    for r in right.iter() {
                        let pair: ElementSet = [l.clone(), r.clone()].into_iter().collect();
                        pairs.insert(Expr::Set(pair));
                    }
                }
                Expr::Set(pairs)
            }
        }
    }

    /// The identity applied when both operands evaluate to the same
    /// expression but not to sets.
    pub fn apply_to_equal(self, arg: Expr) -> Expr {
        match self {
            OpKind::Union | OpKind::Intersection => arg,
            OpKind::Complement => Expr::Set(ElementSet::new()),
            // Stays symbolic; there is no set to expand.
            OpKind::Product => Expr::op(OpKind::Product, arg.clone(), arg),
        }
    }
}

// ============================================================================
// Element Sets
// ============================================================================

/// The element collection of a set literal.
///
/// Elements are deduplicated by structural equality and kept in first
/// insertion order so display stays deterministic. Order carries no meaning:
/// equality and hashing ignore it.
#[derive(Debug, Clone, Default, Eq)]
pub struct ElementSet {
    elements: Vec<Expr>,
}

impl ElementSet {
    pub fn new() -> Self {
        ElementSet {
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.elements.iter().any(|e| e == expr)
    }

    /// Add an element unless an equal one is already present. Returns
    /// whether the set grew.
    pub fn insert(&mut self, expr: Expr) -> bool {
        if self.contains(&expr) {
            false
        } else {
            self.elements.push(expr);
            true
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.elements.iter()
    }

    pub fn union(&self, other: &ElementSet) -> ElementSet {
        let mut out = self.clone();
        for e in other.iter() {
            out.insert(e.clone());
        }
        out
    }

    pub fn intersection(&self, other: &ElementSet) -> ElementSet {
        self.elements
            .iter()
            .filter(|e| other.contains(e))
            .cloned()
            .collect()
    }

    pub fn difference(&self, other: &ElementSet) -> ElementSet {
        self.elements
            .iter()
            .filter(|e| !other.contains(e))
            .cloned()
            .collect()
    }
}

impl PartialEq for ElementSet {
    fn eq(&self, other: &Self) -> bool {
        // Both sides are deduplicated, so equal length plus containment one
        // way is enough.
        self.elements.len() == other.elements.len()
            && self.elements.iter().all(|e| other.contains(e))
    }
}

impl Hash for ElementSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: xor-fold the elements' standalone hashes.
        let mut acc = 0u64;
        for element in &self.elements {
            let mut hasher = FxHasher::default();
            element.hash(&mut hasher);
            acc ^= hasher.finish();
        }
        state.write_u64(acc);
    }
}

impl FromIterator<Expr> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        let mut set = ElementSet::new();
        for expr in iter {
            set.insert(expr);
        }
        set
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{element}")?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A parsed set-algebra expression.
///
/// Immutable after construction; operand subtrees sit behind `Rc` and are
/// never mutated, so the same node may be shared between several bindings
/// and a transient parse result at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Set literal: `{1 2 {3}}`.
    Set(ElementSet),
    /// Reference to a bound (or free) name: `ABC`.
    Variable(String),
    /// Integer element tag: `42`.
    Constant(i64),
    /// Binary operation. Operand order is part of the syntax: equality of
    /// two `Op` nodes never implies commutative equivalence.
    Op {
        kind: OpKind,
        left: Rc<Expr>,
        right: Rc<Expr>,
    },
}

impl Expr {
    pub fn op(kind: OpKind, left: Expr, right: Expr) -> Expr {
        Expr::Op {
            kind,
            left: Rc::new(left),
            right: Rc::new(right),
        }
    }

    pub fn set(elements: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Set(elements.into_iter().collect())
    }

    pub fn variable(name: impl Into<String>) -> Expr {
        Expr::Variable(name.into())
    }

    pub fn empty_set() -> Expr {
        Expr::Set(ElementSet::new())
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Expr::Set(_))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Set(elements) => write!(f, "{elements}"),
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Op { kind, left, right } => write!(f, "({left} {} {right})", kind.sign()),
        }
    }
}
