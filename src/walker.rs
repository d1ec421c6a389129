//! The traversal and reconstruction core: two walkers that produce a fully
//! independent copy of a possibly cyclic value graph.
//!
//! Both walkers follow the same contract. Primitives pass through unchanged,
//! callables pass through by reference (the one documented exception to full
//! independence), and every other value gets a fresh container of the same
//! kind. A container is kept in the [`Memory`] table *before* its children
//! are walked, so a reference back to an ancestor resolves to the ancestor's
//! in-progress clone, and a subgraph reachable along several paths comes out
//! cloned exactly once.
//!
//! [`clone_recursive`] is the simpler reference implementation, bounded by
//! native call depth. [`clone_iterative`] replaces the call stack with an
//! explicit worklist and is the variant to prefer for graphs of unknown
//! depth. Neither guesses at values it cannot classify: an opaque host value
//! fails the whole clone with [`MimeoError::UnsupportedType`], and no
//! partial result is returned.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::construct::{IdentityHasher, Key, Value};
use crate::error::{MimeoError, Result};

// ------------- Memory -------------
/// Identity keyed table from an original container's address to its clone.
///
/// Scoped to a single top-level clone call. The table must hold a container
/// before any of that container's children are walked; cycle resolution
/// rests on this order.
pub struct Memory {
    kept: HashMap<usize, Value, IdentityHasher>,
}
impl Memory {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
        }
    }
    pub fn keep(&mut self, original: &Value, clone: Value) {
        if let Some(address) = original.address() {
            self.kept.insert(address, clone);
        }
    }
    pub fn recall(&self, original: &Value) -> Option<Value> {
        original
            .address()
            .and_then(|address| self.kept.get(&address).cloned())
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
}
impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- shells -------------
/// Allocates the empty clone for a value, of the same kind as the original.
///
/// Sequence, record, dictionary and unique set shells start empty, with a
/// record shell carrying the original's template reference. Moments and
/// patterns come back already complete, since they hold no children. Opaque
/// values cannot be walked and refuse the clone.
fn empty_clone(original: &Value) -> Result<Value> {
    match original {
        Value::Moment(moment) => Ok(Value::Moment(Rc::new((**moment).clone()))),
        Value::Pattern(pattern) => Ok(Value::Pattern(Rc::new((**pattern).clone()))),
        Value::Sequence(_) => Ok(Value::sequence()),
        Value::Record(cell) => Ok(match cell.borrow().template() {
            Some(template) => Value::record_with(template),
            None => Value::record(),
        }),
        Value::Dictionary(_) => Ok(Value::dictionary()),
        Value::UniqueSet(_) => Ok(Value::unique_set()),
        other => Err(MimeoError::UnsupportedType(other.kind().name())),
    }
}

// ------------- recursive walker -------------
/// Deep clone by depth-first recursion on the native call stack.
///
/// One [`Memory`] is created per call and threaded through the whole walk,
/// then discarded. Bounded by call depth; prefer [`clone_iterative`] for
/// graphs of unknown depth.
pub fn clone_recursive(value: &Value) -> Result<Value> {
    let mut memory = Memory::new();
    let clone = walk(value, &mut memory)?;
    trace!(kept = memory.len(), "recursive clone complete");
    Ok(clone)
}

fn walk(value: &Value, memory: &mut Memory) -> Result<Value> {
    if value.is_primitive() || value.is_callable() {
        return Ok(value.clone());
    }
    if let Some(kept) = memory.recall(value) {
        return Ok(kept);
    }
    let clone = empty_clone(value)?;
    memory.keep(value, clone.clone());
    match (value, &clone) {
        (Value::Sequence(original), Value::Sequence(shell)) => {
            let items: Vec<Value> = original.borrow().items().to_vec();
            for item in items {
                let cloned = walk(&item, memory)?;
                shell.borrow_mut().push(cloned);
            }
        }
        (Value::Record(original), Value::Record(shell)) => {
            let entries: Vec<(Key, Value)> = original.borrow().entries().to_vec();
            for (key, item) in entries {
                let cloned = walk(&item, memory)?;
                shell.borrow_mut().set(key, cloned);
            }
        }
        (Value::Dictionary(original), Value::Dictionary(shell)) => {
            let entries: Vec<(Value, Value)> = original.borrow().entries().to_vec();
            for (key, item) in entries {
                let cloned_key = walk(&key, memory)?;
                let cloned_item = walk(&item, memory)?;
                shell.borrow_mut().set(cloned_key, cloned_item);
            }
        }
        (Value::UniqueSet(original), Value::UniqueSet(shell)) => {
            let members: Vec<Value> = original.borrow().members().to_vec();
            for member in members {
                let cloned = walk(&member, memory)?;
                shell.borrow_mut().insert(cloned);
            }
        }
        // moments and patterns are complete at allocation
        _ => {}
    }
    Ok(clone)
}

// ------------- iterative walker -------------
/// Deep clone driven by an explicit worklist instead of the call stack.
///
/// The worklist holds `(original, shell)` pairs of containers whose contents
/// are still to be filled, popped in LIFO order. A child's shell is inserted
/// into its parent at discovery time, before the shell itself is populated;
/// the handle stays stable for the shell's whole lifetime, which is what
/// lets a cycle discovered later still resolve to it.
pub fn clone_iterative(value: &Value) -> Result<Value> {
    if value.is_primitive() || value.is_callable() {
        return Ok(value.clone());
    }
    let mut memory = Memory::new();
    let mut worklist: Vec<(Value, Value)> = Vec::new();
    let root = empty_clone(value)?;
    memory.keep(value, root.clone());
    if value.kind().has_children() {
        worklist.push((value.clone(), root.clone()));
    }
    while let Some((original, clone)) = worklist.pop() {
        match (&original, &clone) {
            (Value::Sequence(from), Value::Sequence(into)) => {
                let items: Vec<Value> = from.borrow().items().to_vec();
                for item in items {
                    let adopted = adopt(&item, &mut memory, &mut worklist)?;
                    into.borrow_mut().push(adopted);
                }
            }
            (Value::Record(from), Value::Record(into)) => {
                let entries: Vec<(Key, Value)> = from.borrow().entries().to_vec();
                for (key, item) in entries {
                    let adopted = adopt(&item, &mut memory, &mut worklist)?;
                    into.borrow_mut().set(key, adopted);
                }
            }
            (Value::Dictionary(from), Value::Dictionary(into)) => {
                let entries: Vec<(Value, Value)> = from.borrow().entries().to_vec();
                for (key, item) in entries {
                    let adopted_key = adopt(&key, &mut memory, &mut worklist)?;
                    let adopted_item = adopt(&item, &mut memory, &mut worklist)?;
                    into.borrow_mut().set(adopted_key, adopted_item);
                }
            }
            (Value::UniqueSet(from), Value::UniqueSet(into)) => {
                let members: Vec<Value> = from.borrow().members().to_vec();
                for member in members {
                    let adopted = adopt(&member, &mut memory, &mut worklist)?;
                    into.borrow_mut().insert(adopted);
                }
            }
            // only kinds with children are ever pushed
            _ => {}
        }
    }
    trace!(kept = memory.len(), "iterative clone complete");
    Ok(root)
}

/// Resolves one child at discovery time: primitives and callables pass
/// through, an already seen container resolves to its known clone without
/// requeueing, and a new container gets an empty shell which is kept,
/// queued, and handed to the parent immediately.
fn adopt(child: &Value, memory: &mut Memory, worklist: &mut Vec<(Value, Value)>) -> Result<Value> {
    if child.is_primitive() || child.is_callable() {
        return Ok(child.clone());
    }
    if let Some(kept) = memory.recall(child) {
        return Ok(kept);
    }
    let shell = empty_clone(child)?;
    memory.keep(child, shell.clone());
    if child.kind().has_children() {
        worklist.push((child.clone(), shell.clone()));
    }
    Ok(shell)
}
