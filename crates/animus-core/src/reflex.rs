//! Reflex path: priority-ordered rule selection producing an immediate
//! action. Evaluation is pure and must stay inside the tick budget; it never
//! touches I/O or the strategic backend.

use crate::action::Vec3;

/// An action the reflex path can produce synchronously.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReflexAction {
    Idle,
    MoveTo(Vec3),
    Dodge(Vec3),
    LookAt(Vec3),
}

/// One candidate reflex rule. Returns `Some` when the rule fires.
pub trait ReflexRule<S>: Send {
    fn name(&self) -> &'static str;
    fn evaluate(&self, snapshot: &S) -> Option<ReflexAction>;
}

/// Priority-ordered selector: the first matching rule wins; the default rule
/// is idle.
pub struct ReflexSelector<S> {
    rules: Vec<Box<dyn ReflexRule<S>>>,
}

impl<S> ReflexSelector<S> {
    pub fn new(rules: Vec<Box<dyn ReflexRule<S>>>) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, snapshot: &S) -> ReflexAction {
        for rule in &self.rules {
            if let Some(action) = rule.evaluate(snapshot) {
                return action;
            }
        }
        ReflexAction::Idle
    }

    /// Name of the first rule that fires, for diagnostics.
    pub fn matching_rule(&self, snapshot: &S) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| r.evaluate(snapshot).is_some())
            .map(|r| r.name())
    }
}

impl<S> Default for ReflexSelector<S> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

/// Convenience rule built from a closure.
pub struct FnRule<S> {
    name: &'static str,
    eval: Box<dyn Fn(&S) -> Option<ReflexAction> + Send>,
}

impl<S> FnRule<S> {
    pub fn new(
        name: &'static str,
        eval: impl Fn(&S) -> Option<ReflexAction> + Send + 'static,
    ) -> Self {
        Self {
            name,
            eval: Box::new(eval),
        }
    }
}

impl<S> ReflexRule<S> for FnRule<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn evaluate(&self, snapshot: &S) -> Option<ReflexAction> {
        (self.eval)(snapshot)
    }
}
