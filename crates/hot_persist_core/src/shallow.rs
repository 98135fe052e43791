//! Dependency values and shallow sequence comparison.
//!
//! A dependency sequence decides whether a persisted value is still valid
//! after a reload. Sequences are compared one level deep: two sequences are
//! equal when they have the same length and every pair of elements is
//! strictly equal. [`Dependency`] defines strict equality for the values a
//! caller can put into a sequence: scalars and strings compare by value,
//! shared references compare by pointer identity.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// A single element of a dependency sequence.
///
/// # Equality
///
/// `PartialEq` implements strict equality rather than structural equality:
///
/// - scalars and strings compare by value (`Float` uses IEEE comparison, so
///   `NaN` never equals itself);
/// - [`Dependency::Ref`] compares by pointer identity, so two structurally
///   identical objects in different allocations are *not* equal.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::Dependency;
///
/// let shared = Arc::new(String::from("config"));
///
/// assert_eq!(Dependency::of(&shared), Dependency::of(&shared));
/// assert_ne!(
///     Dependency::of(&Arc::new(String::from("config"))),
///     Dependency::of(&Arc::new(String::from("config"))),
/// );
/// assert_eq!(Dependency::from(3), Dependency::from(3));
/// assert_eq!(Dependency::from("a"), Dependency::from(String::from("a")));
/// ```
#[derive(Clone)]
pub enum Dependency {
    /// The unit value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A string, compared by value.
    Str(Arc<str>),
    /// A shared reference, compared by identity.
    Ref(Arc<dyn Any + Send + Sync>),
}

impl Dependency {
    /// Creates an identity dependency on a shared value.
    ///
    /// The resulting dependency equals another one only if both point to the
    /// same allocation.
    #[must_use]
    pub fn of<T: Any + Send + Sync>(value: &Arc<T>) -> Self {
        let erased: Arc<dyn Any + Send + Sync> = value.clone();
        Self::Ref(erased)
    }

    /// Creates an identity dependency from an already type-erased value.
    #[must_use]
    pub fn erased(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self::Ref(value)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            // Compare data pointers only; vtable pointers for the same type
            // are not guaranteed to be unique.
            (Self::Ref(a), Self::Ref(b)) => {
                core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Ref(v) => f
                .debug_tuple("Ref")
                .field(&Arc::as_ptr(v).cast::<()>())
                .finish(),
        }
    }
}

impl From<()> for Dependency {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Dependency {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Dependency {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64);
impl_from_int!(UInt as u64: u8, u16, u32, u64);

impl From<usize> for Dependency {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl From<f32> for Dependency {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Dependency {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Dependency {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Dependency {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for Dependency {
    fn from(value: Arc<str>) -> Self {
        Self::Str(value)
    }
}

impl<T: Any + Send + Sync> From<&Arc<T>> for Dependency {
    fn from(value: &Arc<T>) -> Self {
        Self::of(value)
    }
}

/// Builds a `Vec<Dependency>` from a list of values.
///
/// Every element goes through `Dependency::from`, so scalars, strings and
/// `&Arc<T>` references can be mixed freely.
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{deps, Dependency};
///
/// let pool = Arc::new(42_u32);
/// let list = deps![1, "name", &pool];
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[2], Dependency::of(&pool));
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        ::std::vec::Vec::<$crate::Dependency>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Dependency::from($value)),+]
    };
}

/// Compares two optional sequences one level deep.
///
/// - Identical sequences (same slice, or both absent) are equal.
/// - A present sequence never equals an absent one.
/// - Sequences of different lengths are not equal.
/// - Otherwise elements are compared pairwise with `==`, stopping at the
///   first mismatch.
///
/// ```
/// use hot_persist_core::shallow_equal_arrays;
///
/// let empty: [i32; 0] = [];
/// assert!(!shallow_equal_arrays(None, Some(&empty[..])));
/// assert!(shallow_equal_arrays(Some(&[1, 2, 3][..]), Some(&[1, 2, 3][..])));
/// assert!(!shallow_equal_arrays(Some(&[1, 2][..]), Some(&[1, 2, 3][..])));
/// ```
#[must_use]
pub fn shallow_equal_arrays<T: PartialEq>(a: Option<&[T]>, b: Option<&[T]>) -> bool {
    let (a, b) = match (a, b) {
        (None, None) => return true,
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    if core::ptr::eq(a, b) {
        return true;
    }

    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).all(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tag(#[expect(dead_code, reason = "only the allocation matters")] &'static str);

    #[test]
    fn absent_first_is_not_equal() {
        let empty: Vec<Dependency> = Vec::new();
        assert!(!shallow_equal_arrays(None, Some(empty.as_slice())));
    }

    #[test]
    fn absent_second_is_not_equal() {
        let empty: Vec<Dependency> = Vec::new();
        assert!(!shallow_equal_arrays(Some(empty.as_slice()), None));
    }

    #[test]
    fn both_absent_is_equal() {
        assert!(shallow_equal_arrays::<Dependency>(None, None));
    }

    #[test]
    fn same_sequence_is_equal() {
        let list = deps![Tag("a").into_dep(), 1];
        assert!(shallow_equal_arrays(Some(list.as_slice()), Some(list.as_slice())));
    }

    #[test]
    fn distinct_empty_sequences_are_equal() {
        let a: Vec<Dependency> = Vec::new();
        let b: Vec<Dependency> = Vec::new();
        assert!(shallow_equal_arrays(Some(a.as_slice()), Some(b.as_slice())));
    }

    #[test]
    fn different_lengths_are_not_equal() {
        assert!(!shallow_equal_arrays(
            Some(deps![1, 2].as_slice()),
            Some(deps![1, 2, 3].as_slice())
        ));
    }

    #[test]
    fn equal_primitives_are_equal() {
        assert!(shallow_equal_arrays(
            Some(deps![1, 2, 3].as_slice()),
            Some(deps![1, 2, 3].as_slice())
        ));
    }

    #[test]
    fn shared_references_are_equal() {
        let game = Arc::new(Tag("chess"));
        let company = Arc::new(Tag("facebook"));
        let tech = Arc::new(Tag("react"));

        assert!(shallow_equal_arrays(
            Some(deps![&game, &company, &tech].as_slice()),
            Some(deps![&game, &company, &tech].as_slice())
        ));
    }

    #[test]
    fn structurally_equal_references_are_not_equal() {
        let game = Arc::new(Tag("chess"));
        let company = Arc::new(Tag("facebook"));
        let tech = Arc::new(Tag("react"));
        let other_tech = Arc::new(Tag("react"));

        assert!(!shallow_equal_arrays(
            Some(deps![&game, &company, &tech].as_slice()),
            Some(deps![&game, &company, &other_tech].as_slice())
        ));
    }

    #[test]
    fn nan_is_not_strictly_equal() {
        assert_ne!(Dependency::from(f64::NAN), Dependency::from(f64::NAN));
    }

    #[test]
    fn variants_never_cross_compare() {
        assert_ne!(Dependency::from(1_i32), Dependency::from(1_u32));
        assert_ne!(Dependency::from("1"), Dependency::from(1));
        assert_ne!(Dependency::Unit, Dependency::from(false));
    }

    impl Tag {
        fn into_dep(self) -> Dependency {
            Dependency::of(&Arc::new(self))
        }
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_reflexive(values in prop::collection::vec(any::<i64>(), 0..16)) {
                let a: Vec<Dependency> = values.iter().copied().map(Dependency::from).collect();
                let b: Vec<Dependency> = values.iter().copied().map(Dependency::from).collect();
                prop_assert!(shallow_equal_arrays(Some(a.as_slice()), Some(b.as_slice())));
            }

            #[test]
            fn prop_symmetric(
                a in prop::collection::vec(0_i64..4, 0..6),
                b in prop::collection::vec(0_i64..4, 0..6),
            ) {
                prop_assert_eq!(
                    shallow_equal_arrays(Some(a.as_slice()), Some(b.as_slice())),
                    shallow_equal_arrays(Some(b.as_slice()), Some(a.as_slice()))
                );
            }

            #[test]
            fn prop_single_change_breaks_equality(
                values in prop::collection::vec(any::<i64>(), 1..16),
                index in any::<prop::sample::Index>(),
            ) {
                let a: Vec<Dependency> = values.iter().copied().map(Dependency::from).collect();
                let mut b = a.clone();
                let i = index.index(b.len());
                b[i] = Dependency::of(&Arc::new(values[i]));
                prop_assert!(!shallow_equal_arrays(Some(a.as_slice()), Some(b.as_slice())));
            }
        }
    }
}
