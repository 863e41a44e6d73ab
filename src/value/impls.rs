//! Built-in [`Value`] implementations for scalars, text, and the common
//! `alloc`/`std` containers.
//!
//! Third-party container types beyond the ones here are expected to
//! implement [`Value`] themselves and declare a lineage through the tokens
//! in [`crate::kinds`].

use alloc::{
    boxed::Box,
    collections::{BTreeMap, BTreeSet, VecDeque},
    format,
    rc::Rc,
    string::String,
    sync::Arc,
    vec::Vec,
};

use crate::{
    kinds,
    value::{Identity, Items, Lineage, ReprError, RoutineId, Value},
};

macro_rules! impl_scalar_value {
    ($($ty:ty),* $(,)?) => {$(
        impl Value for $ty {
            fn lineage(&self) -> Lineage {
                Lineage::of::<$ty>()
            }

            fn native_repr(&self) -> Result<String, ReprError> {
                Ok(format!("{self:?}"))
            }
        }
    )*};
}

impl_scalar_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl Value for str {
    fn lineage(&self) -> Lineage {
        Lineage::of::<str>().base::<kinds::Text>()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        Ok(format!("{self:?}"))
    }

    fn items(&self) -> Items<'_> {
        Items::Text(self)
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

impl Value for String {
    fn lineage(&self) -> Lineage {
        Lineage::of::<String>().base::<kinds::Text>()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        Ok(format!("{self:?}"))
    }

    fn items(&self) -> Items<'_> {
        Items::Text(self)
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

impl Value for bytes::Bytes {
    fn lineage(&self) -> Lineage {
        Lineage::of::<bytes::Bytes>().base::<kinds::Bytes>()
    }

    fn items(&self) -> Items<'_> {
        Items::Bytes(self)
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Value> Value for Vec<T> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Sequence>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Value> Value for [T] {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Sequence>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Value, const N: usize> Value for [T; N] {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Sequence>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(N)
    }
}

impl<T: Value> Value for VecDeque<T> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>()
            .base::<kinds::TaggedSequence>()
            .base::<kinds::Sequence>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Value for () {
    fn lineage(&self) -> Lineage {
        Lineage::of::<()>().base::<kinds::Tuple>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(core::iter::empty()))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(0)
    }
}

macro_rules! impl_tuple_value {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Value),+> Value for ($($name,)+) {
            fn lineage(&self) -> Lineage {
                Lineage::of::<Self>().base::<kinds::Tuple>()
            }

            fn items(&self) -> Items<'_> {
                Items::Sequence(Box::new([$(&self.$idx as &dyn Value),+].into_iter()))
            }

            fn len_hint(&self) -> Option<usize> {
                Some([$(stringify!($name)),+].len())
            }
        }
    };
}

impl_tuple_value!(A: 0);
impl_tuple_value!(A: 0, B: 1);
impl_tuple_value!(A: 0, B: 1, C: 2);
impl_tuple_value!(A: 0, B: 1, C: 2, D: 3);

impl<T: Value> Value for BTreeSet<T> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Set>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Value, S: 'static> Value for hashbrown::HashSet<T, S> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Set>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

#[cfg(feature = "std")]
impl<T: Value, S: 'static> Value for std::collections::HashSet<T, S> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Set>()
    }

    fn items(&self) -> Items<'_> {
        Items::Sequence(Box::new(self.iter().map(|item| item as &dyn Value)))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<K: Value, V: Value> Value for BTreeMap<K, V> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Mapping>()
    }

    fn items(&self) -> Items<'_> {
        Items::Pairs(Box::new(
            self.iter().map(|(k, v)| (k as &dyn Value, v as &dyn Value)),
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<K: Value, V: Value, S: 'static> Value for hashbrown::HashMap<K, V, S> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Mapping>()
    }

    fn items(&self) -> Items<'_> {
        Items::Pairs(Box::new(
            self.iter().map(|(k, v)| (k as &dyn Value, v as &dyn Value)),
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

#[cfg(feature = "std")]
impl<K: Value, V: Value, S: 'static> Value for std::collections::HashMap<K, V, S> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Mapping>()
    }

    fn items(&self) -> Items<'_> {
        Items::Pairs(Box::new(
            self.iter().map(|(k, v)| (k as &dyn Value, v as &dyn Value)),
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<K: Value, V: Value, S: 'static> Value for indexmap::IndexMap<K, V, S> {
    fn lineage(&self) -> Lineage {
        Lineage::of::<Self>().base::<kinds::Mapping>()
    }

    fn items(&self) -> Items<'_> {
        Items::Pairs(Box::new(
            self.iter().map(|(k, v)| (k as &dyn Value, v as &dyn Value)),
        ))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Value + ?Sized> Value for Box<T> {
    fn lineage(&self) -> Lineage {
        (**self).lineage()
    }

    fn type_label(&self) -> &'static str {
        (**self).type_label()
    }

    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn repr_routine(&self) -> RoutineId {
        (**self).repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        (**self).native_repr()
    }

    fn items(&self) -> Items<'_> {
        (**self).items()
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

impl<T: Value + ?Sized> Value for Rc<T> {
    fn lineage(&self) -> Lineage {
        (**self).lineage()
    }

    fn type_label(&self) -> &'static str {
        (**self).type_label()
    }

    // All clones of one Rc share the pointee's identity, which is what lets
    // the recursion guard recognize a cycle through separate handles.
    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn repr_routine(&self) -> RoutineId {
        (**self).repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        (**self).native_repr()
    }

    fn items(&self) -> Items<'_> {
        (**self).items()
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

impl<T: Value + ?Sized> Value for Arc<T> {
    fn lineage(&self) -> Lineage {
        (**self).lineage()
    }

    fn type_label(&self) -> &'static str {
        (**self).type_label()
    }

    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn repr_routine(&self) -> RoutineId {
        (**self).repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        (**self).native_repr()
    }

    fn items(&self) -> Items<'_> {
        (**self).items()
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

impl<T: Value + ?Sized> Value for &'static T {
    fn lineage(&self) -> Lineage {
        (**self).lineage()
    }

    fn type_label(&self) -> &'static str {
        (**self).type_label()
    }

    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn repr_routine(&self) -> RoutineId {
        (**self).repr_routine()
    }

    fn native_repr(&self) -> Result<String, ReprError> {
        (**self).native_repr()
    }

    fn items(&self) -> Items<'_> {
        (**self).items()
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}
