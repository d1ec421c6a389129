use std::sync::Mutex;

// used to keep the one-to-one mapping between symbol names and their tokens
use bimap::BiMap;

// containers use HashMap or HashSet with a fast hasher
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hash, Hasher};
use seahash::SeaHasher;

// container handles carry identity through shared mutable cells
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

// used to print out readable forms of a construct
use std::fmt;

use lazy_static::lazy_static;

// our own stuff that we need
use crate::datatype::{Moment, Pattern};

pub type KeyHasher = BuildHasherDefault<SeaHasher>;
pub type IdentityHasher = BuildHasherDefault<SeaHasher>;

// ------------- Symbol -------------
/// An interned symbolic token. Two symbols with the same name are the same
/// token, so symbols compare and hash as cheaply as integers.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct Symbol(u64);

impl Symbol {
    /// The token for the given name, minted on first use.
    pub fn named(name: &str) -> Symbol {
        SYMBOLS.lock().unwrap().keep(name).0
    }
    pub fn name(&self) -> String {
        SYMBOLS.lock().unwrap().name(*self).unwrap_or_default()
    }
}
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.name())
    }
}

#[derive(Debug)]
pub struct SymbolKeeper {
    kept: BiMap<String, Symbol>,
    lower_bound: u64,
}
impl SymbolKeeper {
    pub fn new() -> Self {
        Self {
            kept: BiMap::new(),
            lower_bound: 0,
        }
    }
    pub fn keep(&mut self, name: &str) -> (Symbol, bool) {
        if let Some(symbol) = self.kept.get_by_left(name) {
            return (*symbol, true);
        }
        self.lower_bound += 1;
        let symbol = Symbol(self.lower_bound);
        self.kept.insert(name.to_owned(), symbol);
        (symbol, false)
    }
    pub fn name(&self, symbol: Symbol) -> Option<String> {
        self.kept.get_by_right(&symbol).cloned()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
}

lazy_static! {
    /// The process wide symbol keeper. All symbol construction funnels
    /// through it, which is what guarantees one token per name.
    pub static ref SYMBOLS: Mutex<SymbolKeeper> = Mutex::new(SymbolKeeper::new());
}

// ------------- Key -------------
/// A record key, either text or a symbolic token.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Key {
    Text(Rc<str>),
    Symbol(Symbol),
}
impl Key {
    pub fn text(name: &str) -> Key {
        Key::Text(Rc::from(name))
    }
    pub fn symbol(name: &str) -> Key {
        Key::Symbol(Symbol::named(name))
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Text(name) => write!(f, "{}", name),
            Key::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

// ------------- Template -------------
/// A behavior that can be attached to a template. The receiver is the record
/// the method was invoked on, so state lookups resolve against that record.
pub type Method = Rc<dyn Fn(&Value, &[Value]) -> Value>;

/// A shared behavior template for records, holding named methods.
///
/// Templates are referenced, never duplicated: every record built from a
/// template, and every clone of such a record, dispatches through the very
/// same template.
pub struct Template {
    name: String,
    methods: Vec<(Rc<str>, Method)>,
}
impl Template {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            methods: Vec::new(),
        }
    }
    pub fn with_method(
        mut self,
        name: &str,
        body: impl Fn(&Value, &[Value]) -> Value + 'static,
    ) -> Self {
        self.methods.push((Rc::from(name), Rc::new(body)));
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods
            .iter()
            .find(|(kept, _)| kept.as_ref() == name)
            .map(|(_, method)| Rc::clone(method))
    }
}
impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<template {} with {} methods>", self.name, self.methods.len())
    }
}

// ------------- Callable -------------
/// An opaque host function. Callables flow through value graphs by
/// reference and are never duplicated.
pub struct Callable {
    name: String,
    body: Box<dyn Fn(&[Value]) -> Value>,
}
impl Callable {
    pub fn new(name: &str, body: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            name: name.to_owned(),
            body: Box::new(body),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn invoke(&self, arguments: &[Value]) -> Value {
        (self.body)(arguments)
    }
}
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<callable {}>", self.name)
    }
}

// ------------- Sequence -------------
/// An ordered, index addressed, mutable list of values.
#[derive(Debug, Default)]
pub struct Sequence {
    items: Vec<Value>,
}
impl Sequence {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.get(index).cloned()
    }
    pub fn items(&self) -> &[Value] {
        &self.items
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ------------- Record -------------
/// A keyed record: an insertion ordered mapping from keys to values with an
/// optional behavior template attached.
///
/// The entry vector is the order of first insertion; the index gives O(1)
/// access into it, in the shape of an index kept next to its backing store.
#[derive(Debug, Default)]
pub struct Record {
    template: Option<Rc<Template>>,
    entries: Vec<(Key, Value)>,
    index: HashMap<Key, usize, KeyHasher>,
}
impl Record {
    pub fn new() -> Self {
        Self {
            template: None,
            entries: Vec::new(),
            index: HashMap::default(),
        }
    }
    pub fn with_template(template: Rc<Template>) -> Self {
        Self {
            template: Some(template),
            entries: Vec::new(),
            index: HashMap::default(),
        }
    }
    pub fn template(&self) -> Option<Rc<Template>> {
        self.template.as_ref().map(Rc::clone)
    }
    /// Assigns under the key, keeping the position of an already present key.
    pub fn set(&mut self, key: Key, value: Value) {
        match self.index.entry(key.clone()) {
            Entry::Occupied(e) => {
                self.entries[*e.get()].1 = value;
            }
            Entry::Vacant(e) => {
                e.insert(self.entries.len());
                self.entries.push((key, value));
            }
        }
    }
    pub fn get(&self, key: &Key) -> Option<Value> {
        self.index.get(key).map(|&at| self.entries[at].1.clone())
    }
    pub fn entries(&self) -> &[(Key, Value)] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ------------- Dictionary -------------
/// An associative container from values to values, insertion order
/// preserved. Keys follow the same-value rules: primitives by content,
/// everything else by identity.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<(Value, Value)>,
    index: HashMap<IdentityKey, usize, IdentityHasher>,
}
impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::default(),
        }
    }
    pub fn set(&mut self, key: Value, value: Value) {
        match self.index.entry(IdentityKey(key.clone())) {
            Entry::Occupied(e) => {
                self.entries[*e.get()].1 = value;
            }
            Entry::Vacant(e) => {
                e.insert(self.entries.len());
                self.entries.push((key, value));
            }
        }
    }
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.index
            .get(&IdentityKey(key.clone()))
            .map(|&at| self.entries[at].1.clone())
    }
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ------------- UniqueSet -------------
/// A collection of unique values, insertion order preserved, deduplicated by
/// the same-value rules.
#[derive(Debug, Default)]
pub struct UniqueSet {
    members: Vec<Value>,
    index: HashSet<IdentityKey, IdentityHasher>,
}
impl UniqueSet {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            index: HashSet::default(),
        }
    }
    /// Inserts the value, reporting whether it was newly added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.index.insert(IdentityKey(value.clone())) {
            self.members.push(value);
            true
        } else {
            false
        }
    }
    pub fn contains(&self, value: &Value) -> bool {
        self.index.contains(&IdentityKey(value.clone()))
    }
    pub fn members(&self) -> &[Value] {
        &self.members
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ------------- Kind -------------
/// Precise runtime classification of a value, one tag per variant.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Kind {
    Null,
    Bool,
    Number,
    Text,
    Symbol,
    Moment,
    Pattern,
    Sequence,
    Record,
    Dictionary,
    UniqueSet,
    Callable,
    Opaque,
}
impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "boolean",
            Kind::Number => "number",
            Kind::Text => "text",
            Kind::Symbol => "symbol",
            Kind::Moment => "moment",
            Kind::Pattern => "pattern",
            Kind::Sequence => "sequence",
            Kind::Record => "record",
            Kind::Dictionary => "dictionary",
            Kind::UniqueSet => "unique set",
            Kind::Callable => "callable",
            Kind::Opaque => "opaque",
        }
    }
    /// Primitives are copied by value (or shared immutably) and can take no
    /// part in cycles.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Kind::Null | Kind::Bool | Kind::Number | Kind::Text | Kind::Symbol
        )
    }
    /// The kinds whose contents must be walked: everything a worklist entry
    /// can be made of.
    pub fn has_children(&self) -> bool {
        matches!(
            self,
            Kind::Sequence | Kind::Record | Kind::Dictionary | Kind::UniqueSet
        )
    }
}
impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------- Value -------------
/// Any datum flowing through the system.
///
/// Containers are handles: cloning a `Value` clones the handle, not the
/// container, so a `Value` is cheap to pass around and identity is carried
/// by the underlying allocation.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(Rc<str>),
    Symbol(Symbol),
    Moment(Rc<Moment>),
    Pattern(Rc<Pattern>),
    Sequence(Rc<RefCell<Sequence>>),
    Record(Rc<RefCell<Record>>),
    Dictionary(Rc<RefCell<Dictionary>>),
    UniqueSet(Rc<RefCell<UniqueSet>>),
    Callable(Rc<Callable>),
    Opaque(Rc<dyn Any>),
}

impl Value {
    // constructors
    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }
    pub fn text(s: &str) -> Value {
        Value::Text(Rc::from(s))
    }
    pub fn symbol(name: &str) -> Value {
        Value::Symbol(Symbol::named(name))
    }
    pub fn moment(moment: Moment) -> Value {
        Value::Moment(Rc::new(moment))
    }
    pub fn pattern(pattern: Pattern) -> Value {
        Value::Pattern(Rc::new(pattern))
    }
    pub fn sequence() -> Value {
        Value::Sequence(Rc::new(RefCell::new(Sequence::new())))
    }
    pub fn sequence_of(items: Vec<Value>) -> Value {
        Value::Sequence(Rc::new(RefCell::new(Sequence { items })))
    }
    pub fn record() -> Value {
        Value::Record(Rc::new(RefCell::new(Record::new())))
    }
    pub fn record_with(template: Rc<Template>) -> Value {
        Value::Record(Rc::new(RefCell::new(Record::with_template(template))))
    }
    pub fn dictionary() -> Value {
        Value::Dictionary(Rc::new(RefCell::new(Dictionary::new())))
    }
    pub fn unique_set() -> Value {
        Value::UniqueSet(Rc::new(RefCell::new(UniqueSet::new())))
    }
    pub fn callable(callable: Callable) -> Value {
        Value::Callable(Rc::new(callable))
    }
    pub fn opaque(payload: Rc<dyn Any>) -> Value {
        Value::Opaque(payload)
    }

    // accessors
    pub fn as_sequence(&self) -> Option<&Rc<RefCell<Sequence>>> {
        match self {
            Value::Sequence(cell) => Some(cell),
            _ => None,
        }
    }
    pub fn as_record(&self) -> Option<&Rc<RefCell<Record>>> {
        match self {
            Value::Record(cell) => Some(cell),
            _ => None,
        }
    }
    pub fn as_dictionary(&self) -> Option<&Rc<RefCell<Dictionary>>> {
        match self {
            Value::Dictionary(cell) => Some(cell),
            _ => None,
        }
    }
    pub fn as_unique_set(&self) -> Option<&Rc<RefCell<UniqueSet>>> {
        match self {
            Value::UniqueSet(cell) => Some(cell),
            _ => None,
        }
    }
    pub fn as_moment(&self) -> Option<&Rc<Moment>> {
        match self {
            Value::Moment(moment) => Some(moment),
            _ => None,
        }
    }
    pub fn as_pattern(&self) -> Option<&Rc<Pattern>> {
        match self {
            Value::Pattern(pattern) => Some(pattern),
            _ => None,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::Text(_) => Kind::Text,
            Value::Symbol(_) => Kind::Symbol,
            Value::Moment(_) => Kind::Moment,
            Value::Pattern(_) => Kind::Pattern,
            Value::Sequence(_) => Kind::Sequence,
            Value::Record(_) => Kind::Record,
            Value::Dictionary(_) => Kind::Dictionary,
            Value::UniqueSet(_) => Kind::UniqueSet,
            Value::Callable(_) => Kind::Callable,
            Value::Opaque(_) => Kind::Opaque,
        }
    }
    pub fn is_primitive(&self) -> bool {
        self.kind().is_primitive()
    }
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// Stable address of the underlying allocation for identity bearing
    /// values. Primitives have no identity of their own and yield None.
    pub fn address(&self) -> Option<usize> {
        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) => None,
            Value::Text(_) | Value::Symbol(_) => None,
            Value::Moment(moment) => Some(Rc::as_ptr(moment) as usize),
            Value::Pattern(pattern) => Some(Rc::as_ptr(pattern) as usize),
            Value::Sequence(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::Record(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::Dictionary(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::UniqueSet(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::Callable(callable) => Some(Rc::as_ptr(callable) as usize),
            Value::Opaque(payload) => Some(Rc::as_ptr(payload) as *const () as usize),
        }
    }

    /// Same-value comparison: primitives by content (NaN equals itself, the
    /// two zero signs collapse), identity bearing values by address.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            _ => match (self.address(), other.address()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Invokes a template method on a record, with the record itself as the
    /// receiver. None when the value is not a record or the template does
    /// not carry the method.
    pub fn call(&self, method: &str, arguments: &[Value]) -> Option<Value> {
        if let Value::Record(cell) = self {
            let found = cell.borrow().template().and_then(|t| t.method(method))?;
            Some(found(self, arguments))
        } else {
            None
        }
    }

    /// Structural deep equality, cycle safe. Container pairs already assumed
    /// equal higher up the walk compare as equal, which is what lets two
    /// isomorphic cyclic graphs be compared in finite time. Dictionary and
    /// unique set comparison is insertion order significant.
    pub fn equivalent(&self, other: &Value) -> bool {
        let mut assumed = HashSet::<(usize, usize), IdentityHasher>::default();
        equivalent_inner(self, other, &mut assumed)
    }
}

fn equivalent_inner(
    a: &Value,
    b: &Value,
    assumed: &mut HashSet<(usize, usize), IdentityHasher>,
) -> bool {
    match (a, b) {
        (Value::Moment(ma), Value::Moment(mb)) => ma == mb,
        (Value::Pattern(pa), Value::Pattern(pb)) => pa == pb,
        (Value::Sequence(sa), Value::Sequence(sb)) => {
            if !note_pair(a, b, assumed) {
                return true;
            }
            let (sa, sb) = (sa.borrow(), sb.borrow());
            sa.len() == sb.len()
                && sa
                    .items()
                    .iter()
                    .zip(sb.items())
                    .all(|(x, y)| equivalent_inner(x, y, assumed))
        }
        (Value::Record(ra), Value::Record(rb)) => {
            if !note_pair(a, b, assumed) {
                return true;
            }
            let (ra, rb) = (ra.borrow(), rb.borrow());
            let templates_shared = match (ra.template(), rb.template()) {
                (None, None) => true,
                (Some(ta), Some(tb)) => Rc::ptr_eq(&ta, &tb),
                _ => false,
            };
            templates_shared
                && ra.len() == rb.len()
                && ra.entries().iter().all(|(key, value)| match rb.get(key) {
                    Some(counterpart) => equivalent_inner(value, &counterpart, assumed),
                    None => false,
                })
        }
        (Value::Dictionary(da), Value::Dictionary(db)) => {
            if !note_pair(a, b, assumed) {
                return true;
            }
            let (da, db) = (da.borrow(), db.borrow());
            da.len() == db.len()
                && da
                    .entries()
                    .iter()
                    .zip(db.entries())
                    .all(|((ka, va), (kb, vb))| {
                        equivalent_inner(ka, kb, assumed) && equivalent_inner(va, vb, assumed)
                    })
        }
        (Value::UniqueSet(ua), Value::UniqueSet(ub)) => {
            if !note_pair(a, b, assumed) {
                return true;
            }
            let (ua, ub) = (ua.borrow(), ub.borrow());
            ua.len() == ub.len()
                && ua
                    .members()
                    .iter()
                    .zip(ub.members())
                    .all(|(x, y)| equivalent_inner(x, y, assumed))
        }
        (Value::Callable(_), Value::Callable(_)) | (Value::Opaque(_), Value::Opaque(_)) => {
            a.is_identical(b)
        }
        _ => a.is_identical(b),
    }
}

// False when the pair was already assumed, so the caller short-circuits.
fn note_pair(a: &Value, b: &Value, assumed: &mut HashSet<(usize, usize), IdentityHasher>) -> bool {
    match (a.address(), b.address()) {
        (Some(at_a), Some(at_b)) => assumed.insert((at_a, at_b)),
        _ => true,
    }
}

// Debug mirrors Display: an opaque payload has nothing to show, and a
// field-by-field rendering would never terminate on a cyclic graph.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Value {
    // Leaves print their content. Containers print a bounded summary, since
    // a cyclic graph has no finite literal form.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::Moment(moment) => write!(f, "{}", moment),
            Value::Pattern(pattern) => write!(f, "{}", pattern),
            Value::Sequence(cell) => write!(f, "<sequence of {}>", cell.borrow().len()),
            Value::Record(cell) => write!(f, "<record of {}>", cell.borrow().len()),
            Value::Dictionary(cell) => write!(f, "<dictionary of {}>", cell.borrow().len()),
            Value::UniqueSet(cell) => write!(f, "<unique set of {}>", cell.borrow().len()),
            Value::Callable(callable) => write!(f, "<callable {}>", callable.name()),
            Value::Opaque(_) => write!(f, "<opaque>"),
        }
    }
}

// ------------- IdentityKey -------------
/// Hash and equality wrapper around a value, following the same-value rules
/// of [`Value::is_identical`]. This is what lets dictionaries and unique
/// sets key arbitrary values.
#[derive(Debug, Clone)]
pub struct IdentityKey(pub Value);

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
    }
}
impl Eq for IdentityKey {}
impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // discriminant for kind safety
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => {
                // hashed consistently with the same-value rules: one NaN,
                // one zero
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            Value::Text(s) => s.hash(state),
            Value::Symbol(symbol) => symbol.hash(state),
            identified => identified.address().hash(state),
        }
    }
}
