//! Typed request-scoped values.
//!
//! A value is bound to a [`Key`] type rather than to a string, so the type
//! stored under a key is fixed at compile time and a lookup can only ever
//! return that type, or nothing.
//!
//! ```
//! use strand_context::{Context, Key};
//!
//! struct UserId;
//!
//! impl Key for UserId {
//!     type Value = u64;
//!     const NAME: &'static str = "user_id";
//! }
//!
//! let ctx = Context::background().with_value::<UserId>(1225);
//! assert_eq!(ctx.value::<UserId>(), Some(&1225));
//! ```

use core::any::{Any, TypeId};
use std::sync::Arc;

/// A marker type naming one request-scoped value.
///
/// Implement this on a private zero-sized type to get a key nobody else can
/// collide with.
pub trait Key: 'static {
    /// The type of value bound under this key.
    type Value: Send + Sync + 'static;

    /// A human-readable name, used only for diagnostics.
    const NAME: &'static str;
}

/// One link in the immutable chain of value bindings.
///
/// Child contexts prepend a new link and share the rest, so a binding is never
/// modified once created.
pub(crate) struct Binding {
    key: TypeId,
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Binding>>,
}

impl Binding {
    pub(crate) fn new<K: Key>(value: K::Value, parent: Option<Arc<Binding>>) -> Arc<Self> {
        Arc::new(Self {
            key: TypeId::of::<K>(),
            name: K::NAME,
            value: Box::new(value),
            parent,
        })
    }

    /// Finds the nearest binding for `K`, walking toward the root.
    pub(crate) fn lookup<K: Key>(mut binding: Option<&Binding>) -> Option<&K::Value> {
        let key = TypeId::of::<K>();
        while let Some(b) = binding {
            if b.key == key {
                return b.value.downcast_ref::<K::Value>();
            }
            binding = b.parent.as_deref();
        }
        None
    }

    /// Names of every binding visible from here, nearest first.
    pub(crate) fn names(mut binding: Option<&Binding>) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Some(b) = binding {
            names.push(b.name);
            binding = b.parent.as_deref();
        }
        names
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        // Unwind long chains iteratively rather than one stack frame per link
        let mut parent = self.parent.take();
        while let Some(binding) = parent {
            match Arc::into_inner(binding) {
                Some(mut binding) => parent = binding.parent.take(),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Name;
    impl Key for Name {
        type Value = String;
        const NAME: &'static str = "name";
    }

    struct Count;
    impl Key for Count {
        type Value = u32;
        const NAME: &'static str = "count";
    }

    #[test]
    fn lookup_walks_chain() {
        let root = Binding::new::<Name>("root".into(), None);
        let child = Binding::new::<Count>(3, Some(root));

        assert_eq!(Binding::lookup::<Count>(Some(&child)), Some(&3));
        assert_eq!(
            Binding::lookup::<Name>(Some(&child)).map(String::as_str),
            Some("root")
        );
    }

    #[test]
    fn nearest_binding_shadows() {
        let root = Binding::new::<Count>(1, None);
        let child = Binding::new::<Count>(2, Some(root.clone()));

        assert_eq!(Binding::lookup::<Count>(Some(&child)), Some(&2));
        assert_eq!(Binding::lookup::<Count>(Some(&root)), Some(&1));
        assert_eq!(Binding::names(Some(&child)), ["count", "count"]);
    }

    #[test]
    fn deep_chain_lookup_and_drop() {
        let mut binding = Binding::new::<Name>("root".into(), None);
        for n in 0..200_000 {
            binding = Binding::new::<Count>(n, Some(binding));
        }

        assert_eq!(
            Binding::lookup::<Name>(Some(&binding)).map(String::as_str),
            Some("root")
        );
        assert_eq!(Binding::lookup::<Count>(Some(&binding)), Some(&199_999));
        drop(binding);
    }

    #[test]
    fn shared_tail_survives_drop() {
        let root = Binding::new::<Count>(1, None);
        let child = Binding::new::<Count>(2, Some(root.clone()));
        drop(child);
        assert_eq!(Binding::lookup::<Count>(Some(&root)), Some(&1));
    }

    #[test]
    fn missing_key_is_none() {
        let root = Binding::new::<Count>(1, None);
        assert!(Binding::lookup::<Name>(Some(&root)).is_none());
        assert!(Binding::lookup::<Name>(None).is_none());
    }
}
