use std::sync::Arc;

use bt_core::{entropy_seed, Blackboard, Clock, MonotonicClock, SplitMix64};
use bt_tools::{emit as trace_emit, TraceEvent, TraceLog, TRACE_LOG, TRACE_SINK};
use tracing::{debug, info};

use crate::assemble::assemble;
use crate::catalog::{NodeKind, RuntimeNode};
use crate::config::TreeConfig;
use crate::declaration::NodeDeclaration;
use crate::error::{TreeError, TreeResult};
use crate::handlers::HandlerRegistry;
use crate::registry::TreeRegistry;

/// Tree-wide evaluation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionState {
    stopped: bool,
    shut_down: bool,
    root_evaluation_count: u64,
}

impl ExecutionState {
    /// Set by a decorator; never cleared.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether a tick has observed the stop and run the shutdown action.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn root_evaluation_count(&self) -> u64 {
        self.root_evaluation_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The root was evaluated with this result.
    Ticked(bool),
    /// The tree is stopped; nothing was evaluated and no further ticks should be scheduled.
    Stopped,
}

/// An assembled tree together with everything one evaluation pass touches.
pub struct BehaviorTree {
    pub(crate) registry: TreeRegistry,
    pub(crate) state: ExecutionState,
    pub(crate) blackboard: Blackboard,
    pub(crate) handlers: Arc<HandlerRegistry>,
    pub(crate) rng: SplitMix64,
    pub(crate) clock: Arc<dyn Clock>,
}

impl BehaviorTree {
    pub fn new(declaration: &NodeDeclaration, handlers: Arc<HandlerRegistry>) -> TreeResult<Self> {
        let registry = assemble(declaration)?;
        Ok(Self {
            registry,
            state: ExecutionState::default(),
            blackboard: Blackboard::new(),
            handlers,
            rng: SplitMix64::new(entropy_seed()),
            clock: Arc::new(MonotonicClock::new()),
        })
    }

    pub fn from_json(json: &str, handlers: Arc<HandlerRegistry>) -> TreeResult<Self> {
        let declaration = NodeDeclaration::from_json(json)?;
        Self::new(&declaration, handlers)
    }

    /// Reseed the generator used by the random composites.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SplitMix64::new(seed);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_config(mut self, config: &TreeConfig) -> Self {
        if let Some(seed) = config.seed {
            self = self.with_seed(seed);
        }
        if config.trace && !self.blackboard.contains(TRACE_LOG) {
            let log = config
                .trace_capacity
                .map_or_else(TraceLog::default, TraceLog::bounded);
            self.blackboard.store(TRACE_LOG, log);
        }
        self
    }

    pub fn registry(&self) -> &TreeRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped
    }

    pub fn root_evaluation_count(&self) -> u64 {
        self.state.root_evaluation_count
    }

    pub fn node(&self, slug: &str) -> Option<&RuntimeNode> {
        self.registry.node(slug)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Evaluate the root once, unless the tree has been stopped.
    pub fn tick(&mut self) -> TreeResult<TickOutcome> {
        if self.state.stopped {
            if !self.state.shut_down {
                self.state.shut_down = true;
                info!(
                    passes = self.state.root_evaluation_count,
                    "behavior tree stopped, no further ticks"
                );
            }
            return Ok(TickOutcome::Stopped);
        }

        let root = self.registry.root().slug().to_string();
        self.evaluate(&root).map(TickOutcome::Ticked)
    }

    /// Tick until the tree stops or `max_ticks` root evaluations have run. Returns the number of
    /// evaluations performed.
    pub fn run_ticks(&mut self, max_ticks: u64) -> TreeResult<u64> {
        let mut ticks = 0;
        while ticks < max_ticks {
            match self.tick()? {
                TickOutcome::Ticked(_) => ticks += 1,
                TickOutcome::Stopped => break,
            }
        }
        Ok(ticks)
    }

    /// Evaluate one node and its subtree. Does not consult the stop flag.
    pub fn evaluate(&mut self, slug: &str) -> TreeResult<bool> {
        let idx = self
            .registry
            .index_of(slug)
            .ok_or_else(|| TreeError::UnknownSlug(slug.to_string()))?;
        self.evaluate_index(idx)
    }

    pub(crate) fn evaluate_index(&mut self, idx: usize) -> TreeResult<bool> {
        if idx == 0 {
            self.state.root_evaluation_count += 1;
        }
        let pass = self.state.root_evaluation_count;

        let entry = self.registry.entry_mut(idx);
        entry.node.mark_run(pass);
        let kind = entry.declaration.kind;

        let success = match kind {
            NodeKind::Composite(kind) => self.evaluate_composite(idx, kind)?,
            NodeKind::Decorator(kind) => self.evaluate_decorator(idx, kind)?,
            NodeKind::Leaf(kind) => self.evaluate_leaf(idx, kind)?,
        };

        let entry = self.registry.entry(idx);
        debug!(
            slug = entry.slug(),
            kind = %kind,
            success,
            pass,
            run_count = entry.node.run_count(),
            "evaluated node"
        );
        let run_count = entry.node.run_count();
        self.trace(idx, if success { "bt.node.success" } else { "bt.node.failure" }, run_count);

        Ok(success)
    }

    /// Raise the stop flag on behalf of the decorator at `idx`.
    pub(crate) fn stop_tree(&mut self, idx: usize) {
        if self.state.stopped {
            return;
        }
        self.state.stopped = true;
        info!(
            by = self.registry.entry(idx).slug(),
            pass = self.state.root_evaluation_count,
            "behavior tree stop requested"
        );
        self.trace(idx, "bt.tree.stopped", 0);
    }

    fn trace(&mut self, idx: usize, tag: &'static str, a: u64) {
        if !self.blackboard.contains(TRACE_LOG) && !self.blackboard.contains(TRACE_SINK) {
            return;
        }
        let event = TraceEvent::new(self.state.root_evaluation_count, tag)
            .with_slug(self.registry.entry(idx).slug())
            .with_a(a);
        trace_emit(&mut self.blackboard, event);
    }
}

impl std::fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("nodes", &self.registry.len())
            .field("state", &self.state)
            .field("blackboard", &self.blackboard)
            .field("handlers", &self.handlers)
            .finish()
    }
}
