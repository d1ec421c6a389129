//! Mimeo – structural deep copy of possibly cyclic in-memory value graphs.
//!
//! Mimeo centers on the *clone* of a [`construct::Value`]: given the root of
//! an arbitrarily shaped graph, produce a new, fully independent graph that
//! is structurally and semantically equivalent to the original, sharing no
//! mutable container with it, while self-reference and mutual-reference
//! cycles resolve correctly and subgraphs reachable along several paths stay
//! shared in the output.
//!
//! * A [`construct::Value`] is a tagged union over primitives (null,
//!   booleans, numbers, text, interned symbols), immutable identity-bearing
//!   leaves ([`datatype::Moment`], [`datatype::Pattern`]), and mutable
//!   containers (sequences, keyed records, dictionaries, unique sets) held
//!   through shared handles that carry identity.
//! * A [`construct::Record`] may link to a [`construct::Template`], a shared
//!   bundle of named methods; the link is copied by reference so a cloned
//!   record dispatches through the very same template and methods see the
//!   clone's own state.
//! * A [`walker::Memory`] maps each original container's identity to its
//!   clone within one clone call, populated before children are walked;
//!   this is the whole trick behind cycle resolution.
//!
//! ## Modules
//! * [`construct`] – The value model: `Value`, its containers, keys,
//!   symbols and the keeper guaranteeing one token per symbol name,
//!   identity and structural equivalence.
//! * [`datatype`] – Leaf data types: moments (instants with millisecond
//!   precision) and patterns (textual pattern plus matching-mode flags).
//! * [`walker`] – The two clone entry points: [`walker::clone_recursive`],
//!   a depth-first reference implementation on the native call stack, and
//!   [`walker::clone_iterative`], the worklist-driven variant that is safe
//!   for graphs of unknown depth.
//! * [`error`] – The error taxonomy. Both walkers are strict: a value they
//!   cannot classify fails the whole clone with
//!   [`error::MimeoError::UnsupportedType`] rather than returning a
//!   partially cloned graph.
//!
//! ## Callables
//! Host functions found inside a graph are passed through by reference,
//! never duplicated. This is a deliberate, documented exception to full
//! independence.
//!
//! ## Quick Start
//! ```
//! use mimeo::construct::{Key, Value};
//! use mimeo::walker::clone_iterative;
//! let original = Value::record();
//! {
//!     let cell = original.as_record().unwrap();
//!     cell.borrow_mut().set(Key::text("a"), Value::number(1.0));
//!     cell.borrow_mut().set(
//!         Key::text("b"),
//!         Value::sequence_of(vec![Value::number(1.0), Value::number(2.0), Value::number(3.0)]),
//!     );
//! }
//! let copy = clone_iterative(&original).unwrap();
//! assert!(copy.equivalent(&original));
//! assert!(!copy.is_identical(&original));
//! ```

pub mod construct;
pub mod datatype;
pub mod error;
pub mod walker;
