//! Per-call render context: the recursion guard and the helper handed to
//! strategies.
//!
//! A context lives for exactly one top-level [`render`](crate::render) call.
//! It tracks which identities are currently being rendered (an ordered stack
//! with a repeat counter per identity) plus the nesting depth, so
//! self-referential values unroll a bounded number of times and deep
//! non-cyclic nesting collapses instead of exhausting the stack. Nothing in
//! here is shared between threads - each call owns its context.

use alloc::string::String;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{renderer::Renderer, value::Identity, value::Value};

pub(crate) struct Context {
    stack: IndexMap<Identity, u32, FxBuildHasher>,
    depth: usize,
}

/// Outcome of checking an identity against the active stack.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Entered {
    /// Identity was not on the stack; it has been pushed.
    First,
    /// Identity was already on the stack; its repeat count was bumped.
    Repeat,
    /// Identity has hit the repeat limit; rendering must not re-enter.
    Blocked,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self {
            stack: IndexMap::with_hasher(FxBuildHasher),
            depth: 0,
        }
    }

    /// Current nesting depth (number of active frames).
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self, identity: Identity, repeat_limit: usize) -> Entered {
        match self.stack.entry(identity) {
            indexmap::map::Entry::Occupied(mut entry) => {
                let repeats = entry.get_mut();
                if (*repeats as usize) + 1 >= repeat_limit {
                    return Entered::Blocked;
                }
                *repeats += 1;
                self.depth += 1;
                Entered::Repeat
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(0);
                self.depth += 1;
                Entered::First
            }
        }
    }

    pub(crate) fn leave(&mut self, identity: Identity, entered: Entered) {
        match entered {
            Entered::First => {
                let popped = self.stack.pop();
                debug_assert_eq!(popped.map(|(id, _)| id), Some(identity));
                self.depth -= 1;
            }
            Entered::Repeat => {
                if let Some(repeats) = self.stack.get_mut(&identity) {
                    *repeats -= 1;
                }
                self.depth -= 1;
            }
            Entered::Blocked => {}
        }
    }

    /// Snapshot of the stack for unwinding after a contained strategy
    /// panic. Frames pushed after the mark are discarded wholesale; repeat
    /// counts bumped on older frames are not restored.
    pub(crate) fn mark(&self) -> (usize, usize) {
        (self.stack.len(), self.depth)
    }

    pub(crate) fn rewind(&mut self, mark: (usize, usize)) {
        self.stack.truncate(mark.0);
        self.depth = mark.1;
    }
}

/// Handle bound to the active render context, passed to every strategy.
///
/// Rendering a nested element through [`Helper::render`] extends the calling
/// context, which is what keeps cycle detection, depth bounding, and
/// suppression working across nesting levels. Strategies must not call the
/// crate-level [`render`](crate::render) for nested elements - that would
/// start a fresh context.
pub struct Helper<'a> {
    renderer: &'a Renderer,
    context: &'a mut Context,
}

impl<'a> Helper<'a> {
    pub(crate) fn new(renderer: &'a Renderer, context: &'a mut Context) -> Self {
        Self { renderer, context }
    }

    /// Renders a nested element within the current context.
    pub fn render(&mut self, value: &dyn Value) -> String {
        self.renderer.render_with(value, self.context)
    }

    /// The renderer this context belongs to.
    pub fn renderer(&self) -> &'a Renderer {
        self.renderer
    }

    /// Current nesting depth, counting the frame being rendered.
    pub fn depth(&self) -> usize {
        self.context.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> Identity {
        // Distinct static locations give distinct, stable identities.
        static SLOTS: [u8; 8] = [0; 8];
        Identity::of(&SLOTS[n])
    }

    #[test]
    fn test_enter_pushes_and_leave_pops() {
        let mut context = Context::new();
        let id = identity(0);
        let entered = context.enter(id, 3);
        assert!(matches!(entered, Entered::First));
        assert_eq!(context.depth(), 1);
        context.leave(id, entered);
        assert_eq!(context.depth(), 0);
        // fully popped: entering again is First, not Repeat
        assert!(matches!(context.enter(id, 3), Entered::First));
    }

    #[test]
    fn test_repeat_blocks_at_limit() {
        let mut context = Context::new();
        let id = identity(1);
        assert!(matches!(context.enter(id, 3), Entered::First));
        assert!(matches!(context.enter(id, 3), Entered::Repeat));
        assert!(matches!(context.enter(id, 3), Entered::Repeat));
        assert!(matches!(context.enter(id, 3), Entered::Blocked));
        assert_eq!(context.depth(), 3);
    }

    #[test]
    fn test_sibling_renders_do_not_accumulate() {
        let mut context = Context::new();
        let id = identity(2);
        for _ in 0..10 {
            let entered = context.enter(id, 3);
            assert!(matches!(entered, Entered::First));
            context.leave(id, entered);
        }
    }

    #[test]
    fn test_rewind_discards_frames_past_mark() {
        let mut context = Context::new();
        let outer = identity(3);
        let entered = context.enter(outer, 3);
        let mark = context.mark();
        context.enter(identity(4), 3);
        context.enter(identity(5), 3);
        context.rewind(mark);
        assert_eq!(context.depth(), 1);
        context.leave(outer, entered);
        assert_eq!(context.depth(), 0);
    }
}
