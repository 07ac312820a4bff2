//! Entity handles and identity tokens.
//!
//! The write path never owns domain objects. Callers keep ownership and hand
//! the core cheap-to-clone [`EntityHandle`]s; every handle cloned from the
//! same object resolves to the same [`EntityToken`], which is what the
//! pending registry and the unit of work key on.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Stable opaque identity token for a tracked entity.
///
/// Tokens are derived from the identity of the shared allocation behind a
/// handle, never from a business key: a freshly constructed entity whose
/// identifier columns are still unset has a token like any other. Two handles
/// compare equal exactly when they refer to the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityToken(usize);

/// Shared handle over a caller-owned domain object.
///
/// Handles type-erase the object behind `Rc<RefCell<dyn Any>>`; field values
/// are read back out through the typed accessor tables in [`crate::meta`].
/// `Rc` keeps the handle single-threaded on purpose: the whole write path is
/// synchronous and serialized per unit of work.
#[derive(Clone)]
pub struct EntityHandle {
    /// Metadata lookup key for this object's entity type.
    entity_type: &'static str,
    /// The erased object.
    object: Rc<RefCell<dyn Any>>,
}

impl EntityHandle {
    /// Wrap a domain object in a shared handle.
    pub fn new<T: Any>(entity_type: &'static str, object: T) -> Self {
        Self {
            entity_type,
            object: Rc::new(RefCell::new(object)),
        }
    }

    /// The entity-type name used for metadata lookup.
    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    /// The identity token for this handle's object.
    pub fn token(&self) -> EntityToken {
        EntityToken(Rc::as_ptr(&self.object) as *const () as usize)
    }

    /// Immutably borrow the erased object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed, as `RefCell` does.
    pub fn borrow(&self) -> Ref<'_, dyn Any> {
        self.object.borrow()
    }

    /// Mutably borrow the erased object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed, as `RefCell` does.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Any> {
        self.object.borrow_mut()
    }

    /// Run a closure against the concrete object, if it has type `T`.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.object.borrow();
        guard.downcast_ref::<T>().map(f)
    }

    /// Run a closure against the concrete object mutably, if it has type `T`.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.object.borrow_mut();
        guard.downcast_mut::<T>().map(f)
    }
}

impl PartialEq for EntityHandle {
    fn eq(&self, other: &Self) -> bool {
        self.token() == other.token()
    }
}

impl Eq for EntityHandle {}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("entity_type", &self.entity_type)
            .field("token", &self.token())
            .finish()
    }
}
