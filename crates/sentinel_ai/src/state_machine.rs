//! Generic finite state machine
//!
//! Transitions are plain predicates over a per-update context. At most one
//! transition fires per [`StateMachine::update`], so a state is always held
//! for at least one full tick.

use std::collections::HashMap;
use std::hash::Hash;

/// Marker for types usable as machine states
pub trait State: Clone + Eq + Hash + std::fmt::Debug {}

/// Boxed transition predicate
pub type TransitionCondition<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// Edge to `to`, taken when `condition` holds
pub struct Transition<S, C> {
    pub to: S,
    pub condition: TransitionCondition<C>,
    /// Larger values are tried first
    pub priority: i32,
}

impl<S, C> Transition<S, C> {
    pub fn new<F>(to: S, condition: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self {
            to,
            condition: Box::new(condition),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Evaluate the predicate against `context`
    pub fn fires(&self, context: &C) -> bool {
        (self.condition)(context)
    }
}

/// A transition that fired during an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange<S> {
    pub from: S,
    pub to: S,
}

/// State machine over states `S`, driven by context `C`
pub struct StateMachine<S, C>
where
    S: State,
{
    current: S,
    previous: Option<S>,
    /// Outgoing edges per state, sorted by descending priority
    edges: HashMap<S, Vec<Transition<S, C>>>,
    /// Edges valid from any state, tried in insertion order
    any_state: Vec<Transition<S, C>>,
}

impl<S, C> StateMachine<S, C>
where
    S: State,
{
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            edges: HashMap::new(),
            any_state: Vec::new(),
        }
    }

    /// Edge `from -> to` with priority 0
    pub fn add_transition<F>(&mut self, from: S, to: S, condition: F)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.add_transition_priority(from, to, condition, 0);
    }

    /// Edge `from -> to`; higher priorities are tried first
    pub fn add_transition_priority<F>(&mut self, from: S, to: S, condition: F, priority: i32)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        let list = self.edges.entry(from).or_default();
        list.push(Transition::new(to, condition).with_priority(priority));
        // Stable: equal priorities keep insertion order
        list.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Edge into `to` from any other state, tried before per-state edges
    pub fn add_global_transition<F>(&mut self, to: S, condition: F)
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.any_state.push(Transition::new(to, condition));
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn previous(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    /// Jump to `to` unconditionally
    pub fn force_transition(&mut self, to: S) -> StateChange<S> {
        let from = std::mem::replace(&mut self.current, to.clone());
        self.previous = Some(from.clone());
        StateChange { from, to }
    }

    /// Evaluate edges once; returns the change if one fired
    pub fn update(&mut self, context: &C) -> Option<StateChange<S>> {
        // Global edges never re-enter the current state
        let global = self
            .any_state
            .iter()
            .find(|t| self.current != t.to && t.fires(context))
            .map(|t| t.to.clone());
        if let Some(to) = global {
            return Some(self.force_transition(to));
        }

        let local = self
            .edges
            .get(&self.current)
            .and_then(|list| list.iter().find(|t| t.fires(context)))
            .map(|t| t.to.clone());
        local.map(|to| self.force_transition(to))
    }

    pub fn is_in(&self, state: &S) -> bool {
        self.current == *state
    }
}
