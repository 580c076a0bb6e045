//! The closed set of node kinds and their runtime state.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Composite,
    Decorator,
    Leaf,
}

/// Nodes with one or more children that decide which of them run, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Sequence,
    Parallel,
    Selector,
    RandomSelector,
    ProbabilitySelector,
    RandomSequence,
}

/// Nodes with exactly one child. Only decorators may stop the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    RepeatAlways,
    RepeatUntilFail,
    RepeatUntilSuccess,
    Inverter,
    LimitTries,
    LimitTime,
    /// Recognized but not evaluable.
    LimitSemaphore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Action,
    Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Composite(CompositeKind),
    Decorator(DecoratorKind),
    Leaf(LeafKind),
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Composite(CompositeKind::Sequence),
        NodeKind::Composite(CompositeKind::Parallel),
        NodeKind::Composite(CompositeKind::Selector),
        NodeKind::Composite(CompositeKind::RandomSelector),
        NodeKind::Composite(CompositeKind::ProbabilitySelector),
        NodeKind::Composite(CompositeKind::RandomSequence),
        NodeKind::Decorator(DecoratorKind::RepeatAlways),
        NodeKind::Decorator(DecoratorKind::RepeatUntilFail),
        NodeKind::Decorator(DecoratorKind::RepeatUntilSuccess),
        NodeKind::Decorator(DecoratorKind::Inverter),
        NodeKind::Decorator(DecoratorKind::LimitTries),
        NodeKind::Decorator(DecoratorKind::LimitTime),
        NodeKind::Decorator(DecoratorKind::LimitSemaphore),
        NodeKind::Leaf(LeafKind::Action),
        NodeKind::Leaf(LeafKind::Condition),
    ];

    /// Resolve a declaration's `type` name. The mapping is fixed; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Sequence" => Self::Composite(CompositeKind::Sequence),
            "Parallel" => Self::Composite(CompositeKind::Parallel),
            "Selector" => Self::Composite(CompositeKind::Selector),
            "RandomSelector" => Self::Composite(CompositeKind::RandomSelector),
            "ProbabilitySelector" => Self::Composite(CompositeKind::ProbabilitySelector),
            "RandomSequence" => Self::Composite(CompositeKind::RandomSequence),
            "RepeatAlways" => Self::Decorator(DecoratorKind::RepeatAlways),
            "RepeatUntilFail" => Self::Decorator(DecoratorKind::RepeatUntilFail),
            "RepeatUntilSuccess" => Self::Decorator(DecoratorKind::RepeatUntilSuccess),
            "Inverter" => Self::Decorator(DecoratorKind::Inverter),
            "LimitTries" => Self::Decorator(DecoratorKind::LimitTries),
            "LimitTime" => Self::Decorator(DecoratorKind::LimitTime),
            "LimitSemaphore" => Self::Decorator(DecoratorKind::LimitSemaphore),
            "Action" => Self::Leaf(LeafKind::Action),
            "Condition" => Self::Leaf(LeafKind::Condition),
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Composite(CompositeKind::Sequence) => "Sequence",
            Self::Composite(CompositeKind::Parallel) => "Parallel",
            Self::Composite(CompositeKind::Selector) => "Selector",
            Self::Composite(CompositeKind::RandomSelector) => "RandomSelector",
            Self::Composite(CompositeKind::ProbabilitySelector) => "ProbabilitySelector",
            Self::Composite(CompositeKind::RandomSequence) => "RandomSequence",
            Self::Decorator(DecoratorKind::RepeatAlways) => "RepeatAlways",
            Self::Decorator(DecoratorKind::RepeatUntilFail) => "RepeatUntilFail",
            Self::Decorator(DecoratorKind::RepeatUntilSuccess) => "RepeatUntilSuccess",
            Self::Decorator(DecoratorKind::Inverter) => "Inverter",
            Self::Decorator(DecoratorKind::LimitTries) => "LimitTries",
            Self::Decorator(DecoratorKind::LimitTime) => "LimitTime",
            Self::Decorator(DecoratorKind::LimitSemaphore) => "LimitSemaphore",
            Self::Leaf(LeafKind::Action) => "Action",
            Self::Leaf(LeafKind::Condition) => "Condition",
        }
    }

    pub fn category(self) -> NodeCategory {
        match self {
            Self::Composite(_) => NodeCategory::Composite,
            Self::Decorator(_) => NodeCategory::Decorator,
            Self::Leaf(_) => NodeCategory::Leaf,
        }
    }

    pub fn is_decorator(self) -> bool {
        matches!(self, Self::Decorator(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific mutable state. Limits are cached from the declaration on first use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecoratorState {
    None,
    Tries {
        tries: u32,
        tries_limit: Option<f64>,
    },
    Time {
        started_at: Option<Duration>,
        time_limit: Option<Duration>,
    },
}

/// Mutable execution state paired with one declared node.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeNode {
    kind: NodeKind,
    run_count: u64,
    run_path_count: u64,
    pub(crate) state: DecoratorState,
}

impl RuntimeNode {
    pub fn new(kind: NodeKind) -> Self {
        let state = match kind {
            NodeKind::Decorator(DecoratorKind::LimitTries) => DecoratorState::Tries {
                tries: 0,
                tries_limit: None,
            },
            NodeKind::Decorator(DecoratorKind::LimitTime) => DecoratorState::Time {
                started_at: None,
                time_limit: None,
            },
            _ => DecoratorState::None,
        };
        Self {
            kind,
            run_count: 0,
            run_path_count: 0,
            state,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Number of times this node has been evaluated.
    pub fn run_count(&self) -> u64 {
        self.run_count
    }

    /// Root evaluation count at the moment this node last ran.
    pub fn run_path_count(&self) -> u64 {
        self.run_path_count
    }

    pub fn state(&self) -> &DecoratorState {
        &self.state
    }

    pub fn tries(&self) -> Option<u32> {
        match self.state {
            DecoratorState::Tries { tries, .. } => Some(tries),
            _ => None,
        }
    }

    pub fn started_at(&self) -> Option<Duration> {
        match self.state {
            DecoratorState::Time { started_at, .. } => started_at,
            _ => None,
        }
    }

    pub(crate) fn mark_run(&mut self, pass: u64) {
        self.run_count = self.run_count.saturating_add(1);
        self.run_path_count = pass;
    }
}
