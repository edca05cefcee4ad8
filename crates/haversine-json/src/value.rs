//! The parsed tree.
//!
//! [`Value`], [`JsonObject`] and [`JsonArray`] are plain `Copy` handles into
//! a [`TreeArena`]; they own nothing and are dropped with the arena. Reading
//! a tree goes through the borrowed views [`ValueRef`], [`ObjectRef`] and
//! [`ArrayRef`], which resolve handles against the arenas of a
//! [`Document`](crate::Document).
//!
//! Containers start with [`INITIAL_CAPACITY`] slots and double when full.
//! Growing takes a fresh region from the same arena and copies the live
//! elements over; the old region is never reclaimed, so appends are O(1)
//! amortized at the price of dead space that lives until the arena goes.

use core::fmt;

use bstr::BStr;
use log::trace;

use crate::arena::{Arena, ArenaError, ArenaUsage, Buffer, Region};

/// Slots given to every object and array when it is created.
pub const INITIAL_CAPACITY: usize = 10;

/// A JSON value of the restricted grammar: no `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    /// Raw bytes between the quotes, in the literal arena.
    String(Buffer),
    Object(JsonObject),
    Array(JsonArray),
}

impl Default for Value {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

/// Object members as two parallel regions. Insertion order is kept and
/// duplicate keys are stored side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonObject {
    keys: Region<Buffer>,
    values: Region<Value>,
    count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonArray {
    values: Region<Value>,
    count: u32,
}

/// Storage for parsed containers: one pool of object keys, one of values.
///
/// Both pools share the slot capacity given at creation.
#[derive(Debug)]
pub struct TreeArena {
    pub(crate) keys: Arena<Buffer>,
    pub(crate) values: Arena<Value>,
}

impl TreeArena {
    #[must_use]
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            keys: Arena::with_capacity("keys", slots),
            values: Arena::with_capacity("values", slots),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &Arena<Buffer> {
        &self.keys
    }

    #[must_use]
    pub fn values(&self) -> &Arena<Value> {
        &self.values
    }

    #[must_use]
    pub fn usage(&self) -> [ArenaUsage; 2] {
        [self.keys.usage(), self.values.usage()]
    }
}

fn grown_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        INITIAL_CAPACITY
    } else {
        capacity << 1
    }
}

impl JsonObject {
    /// An empty object with [`INITIAL_CAPACITY`] slots.
    ///
    /// # Errors
    ///
    /// If either pool of `tree` cannot spare the slots.
    pub fn with_initial_capacity(tree: &mut TreeArena) -> Result<Self, ArenaError> {
        Ok(Self {
            keys: tree.keys.alloc(INITIAL_CAPACITY)?,
            values: tree.values.alloc(INITIAL_CAPACITY)?,
            count: 0,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Appends a member, doubling the storage first when it is full.
    ///
    /// # Errors
    ///
    /// If `tree` cannot hold the doubled storage. The object is unchanged.
    pub fn push(&mut self, tree: &mut TreeArena, key: Buffer, value: Value) -> Result<(), ArenaError> {
        let slot = self.len();
        if slot == self.capacity() {
            self.grow(tree)?;
        }
        tree.keys.get_mut(self.keys)[slot] = key;
        tree.values.get_mut(self.values)[slot] = value;
        self.count += 1;
        Ok(())
    }

    fn grow(&mut self, tree: &mut TreeArena) -> Result<(), ArenaError> {
        let capacity = grown_capacity(self.capacity());
        let keys = tree.keys.alloc(capacity)?;
        let values = tree.values.alloc(capacity)?;
        tree.keys.copy_within(self.keys, keys, self.len());
        tree.values.copy_within(self.values, values, self.len());
        trace!("object storage grew from {} to {capacity} slots", self.capacity());
        self.keys = keys;
        self.values = values;
        Ok(())
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys<'t>(&self, tree: &'t TreeArena) -> &'t [Buffer] {
        &tree.keys.get(self.keys)[..self.len()]
    }

    /// Values in insertion order, parallel to [`JsonObject::keys`].
    #[must_use]
    pub fn values<'t>(&self, tree: &'t TreeArena) -> &'t [Value] {
        &tree.values.get(self.values)[..self.len()]
    }
}

impl JsonArray {
    /// An empty array with [`INITIAL_CAPACITY`] slots.
    ///
    /// # Errors
    ///
    /// If the value pool of `tree` cannot spare the slots.
    pub fn with_initial_capacity(tree: &mut TreeArena) -> Result<Self, ArenaError> {
        Ok(Self {
            values: tree.values.alloc(INITIAL_CAPACITY)?,
            count: 0,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Appends an element, doubling the storage first when it is full.
    ///
    /// # Errors
    ///
    /// If `tree` cannot hold the doubled storage. The array is unchanged.
    pub fn push(&mut self, tree: &mut TreeArena, value: Value) -> Result<(), ArenaError> {
        let slot = self.len();
        if slot == self.capacity() {
            let capacity = grown_capacity(self.capacity());
            let values = tree.values.alloc(capacity)?;
            tree.values.copy_within(self.values, values, slot);
            trace!("array storage grew from {} to {capacity} slots", self.capacity());
            self.values = values;
        }
        tree.values.get_mut(self.values)[slot] = value;
        self.count += 1;
        Ok(())
    }

    #[must_use]
    pub fn values<'t>(&self, tree: &'t TreeArena) -> &'t [Value] {
        &tree.values.get(self.values)[..self.len()]
    }
}

// ------------------------------------------------------------------------------------------------
// Borrowed views
// ------------------------------------------------------------------------------------------------

/// The arenas a tree resolves against.
#[derive(Clone, Copy)]
pub(crate) struct Store<'a> {
    pub(crate) literals: &'a Arena<u8>,
    pub(crate) tree: &'a TreeArena,
}

impl<'a> Store<'a> {
    pub(crate) fn object(self, object: JsonObject) -> ObjectRef<'a> {
        ObjectRef { object, store: self }
    }

    fn view(self, value: Value) -> ValueRef<'a> {
        match value {
            Value::Number(n) => ValueRef::Number(n),
            Value::String(buffer) => ValueRef::String(self.literals.bytes(buffer)),
            Value::Object(object) => ValueRef::Object(self.object(object)),
            Value::Array(array) => ValueRef::Array(ArrayRef { array, store: self }),
        }
    }
}

/// A value read out of a [`Document`](crate::Document).
#[derive(Debug, Clone, Copy)]
pub enum ValueRef<'a> {
    Number(f64),
    String(&'a BStr),
    Object(ObjectRef<'a>),
    Array(ArrayRef<'a>),
}

impl<'a> ValueRef<'a> {
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self {
            ValueRef::Number(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string(self) -> Option<&'a BStr> {
        match self {
            ValueRef::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(self) -> Option<ObjectRef<'a>> {
        match self {
            ValueRef::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(self) -> Option<ArrayRef<'a>> {
        match self {
            ValueRef::Array(array) => Some(array),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_number(self) -> bool {
        matches!(self, Self::Number(..))
    }

    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(self, Self::String(..))
    }

    #[must_use]
    pub fn is_object(self) -> bool {
        matches!(self, Self::Object(..))
    }

    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(self, Self::Array(..))
    }
}

#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    object: JsonObject,
    store: Store<'a>,
}

impl<'a> ObjectRef<'a> {
    #[must_use]
    pub fn len(self) -> usize {
        self.object.len()
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.object.is_empty()
    }

    /// Allocated slots, counting the ones not yet used.
    #[must_use]
    pub fn capacity(self) -> usize {
        self.object.capacity()
    }

    /// The value of the first member named `key`. Linear in the number of
    /// members.
    #[must_use]
    pub fn get(self, key: impl AsRef<[u8]>) -> Option<ValueRef<'a>> {
        let key = key.as_ref();
        self.iter()
            .find(|(name, _)| {
                let name: &[u8] = name;
                name == key
            })
            .map(|(_, value)| value)
    }

    /// Members in insertion order, duplicates included.
    pub fn iter(self) -> impl Iterator<Item = (&'a BStr, ValueRef<'a>)> {
        self.keys().zip(self.values())
    }

    pub fn keys(self) -> impl Iterator<Item = &'a BStr> {
        let literals = self.store.literals;
        self.object
            .keys(self.store.tree)
            .iter()
            .map(move |&key| literals.bytes(key))
    }

    pub fn values(self) -> impl Iterator<Item = ValueRef<'a>> {
        let store = self.store;
        self.object
            .values(store.tree)
            .iter()
            .map(move |&value| store.view(value))
    }

    /// The underlying handle.
    #[must_use]
    pub fn raw(self) -> JsonObject {
        self.object
    }
}

impl fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[derive(Clone, Copy)]
pub struct ArrayRef<'a> {
    array: JsonArray,
    store: Store<'a>,
}

impl<'a> ArrayRef<'a> {
    #[must_use]
    pub fn len(self) -> usize {
        self.array.len()
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.array.is_empty()
    }

    /// Allocated slots, counting the ones not yet used.
    #[must_use]
    pub fn capacity(self) -> usize {
        self.array.capacity()
    }

    #[must_use]
    pub fn get(self, index: usize) -> Option<ValueRef<'a>> {
        let store = self.store;
        self.array
            .values(store.tree)
            .get(index)
            .map(|&value| store.view(value))
    }

    pub fn iter(self) -> impl Iterator<Item = ValueRef<'a>> {
        let store = self.store;
        self.array
            .values(store.tree)
            .iter()
            .map(move |&value| store.view(value))
    }

    /// The underlying handle.
    #[must_use]
    pub fn raw(self) -> JsonArray {
        self.array
    }
}

impl fmt::Debug for ArrayRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
