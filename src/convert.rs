//! Conversions between [`Variant`] and native Rust types
//!
//! Host → native conversions are strict: a value of the wrong host type is
//! a [`Error::TypeMismatch`] and a number that does not fit the target type
//! exactly is an [`Error::OutOfRange`]. Nothing is truncated, rounded or
//! coerced on the way in.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::value::{ValueType, Variant};

/// Native → host conversion
pub trait IntoVariant {
    fn into_variant(self) -> Variant;
}

/// Host → native conversion
pub trait FromVariant: Sized {
    fn from_variant(value: Variant) -> Result<Self>;
}

/// Extraction of a complete argument list
pub trait FromArgs: Sized {
    fn from_args(args: Vec<Variant>) -> Result<Self>;
}

impl IntoVariant for Variant {
    fn into_variant(self) -> Variant {
        self
    }
}

impl FromVariant for Variant {
    fn from_variant(value: Variant) -> Result<Self> {
        Ok(value)
    }
}

impl IntoVariant for () {
    fn into_variant(self) -> Variant {
        Variant::Undefined
    }
}

impl FromVariant for () {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::Undefined | Variant::Null => Ok(()),
            other => Err(Error::type_mismatch(ValueType::Undefined, other.value_type())),
        }
    }
}

impl IntoVariant for bool {
    fn into_variant(self) -> Variant {
        Variant::Bool(self)
    }
}

impl FromVariant for bool {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::Bool(b) => Ok(b),
            other => Err(Error::type_mismatch(ValueType::Boolean, other.value_type())),
        }
    }
}

impl IntoVariant for String {
    fn into_variant(self) -> Variant {
        Variant::String(self)
    }
}

impl<'a> IntoVariant for &'a str {
    fn into_variant(self) -> Variant {
        Variant::String(self.to_string())
    }
}

impl FromVariant for String {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::String(s) => Ok(s),
            other => Err(Error::type_mismatch(ValueType::String, other.value_type())),
        }
    }
}

/// Integral value of a number, or the reason it has none
fn integral(value: &Variant, target: &'static str) -> Result<i128> {
    match *value {
        Variant::Int64(i) => Ok(i128::from(i)),
        Variant::UInt64(u) => Ok(i128::from(u)),
        Variant::Float64(f) => {
            // 2^127 bounds every integer width we convert into
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7014118346046923e38 {
                Ok(f as i128)
            } else {
                Err(Error::out_of_range(target, f))
            }
        }
        ref other => Err(Error::type_mismatch(ValueType::Number, other.value_type())),
    }
}

macro_rules! impl_integer_conversions {
    ($($t:ty => $variant:ident as $wide:ty),* $(,)?) => {
        $(
            impl IntoVariant for $t {
                fn into_variant(self) -> Variant {
                    Variant::$variant(<$wide>::from(self))
                }
            }

            impl FromVariant for $t {
                fn from_variant(value: Variant) -> Result<Self> {
                    let n = integral(&value, stringify!($t))?;
                    <$t>::try_from(n).map_err(|_| Error::out_of_range(stringify!($t), n))
                }
            }
        )*
    };
}

impl_integer_conversions!(
    i8 => Int64 as i64,
    i16 => Int64 as i64,
    i32 => Int64 as i64,
    i64 => Int64 as i64,
    u8 => UInt64 as u64,
    u16 => UInt64 as u64,
    u32 => UInt64 as u64,
    u64 => UInt64 as u64,
);

/// Exact `f64` form of a number
///
/// Integers a double cannot hold exactly are rejected rather than rounded.
pub fn to_host_number(value: &Variant) -> Result<f64> {
    match *value {
        Variant::Float64(f) => Ok(f),
        Variant::Int64(_) | Variant::UInt64(_) => {
            let n = integral(value, "f64")?;
            let f = n as f64;
            if f as i128 == n {
                Ok(f)
            } else {
                Err(Error::out_of_range("f64", n))
            }
        }
        ref other => Err(Error::type_mismatch(ValueType::Number, other.value_type())),
    }
}

impl IntoVariant for f64 {
    fn into_variant(self) -> Variant {
        Variant::Float64(self)
    }
}

impl FromVariant for f64 {
    fn from_variant(value: Variant) -> Result<Self> {
        to_host_number(&value)
    }
}

impl IntoVariant for f32 {
    fn into_variant(self) -> Variant {
        Variant::Float64(f64::from(self))
    }
}

impl FromVariant for f32 {
    fn from_variant(value: Variant) -> Result<Self> {
        let wide = to_host_number(&value)?;
        let narrow = wide as f32;
        if f64::from(narrow) == wide || wide.is_nan() {
            Ok(narrow)
        } else {
            Err(Error::out_of_range("f32", wide))
        }
    }
}

impl<T: IntoVariant> IntoVariant for Vec<T> {
    fn into_variant(self) -> Variant {
        Variant::Array(self.into_iter().map(IntoVariant::into_variant).collect())
    }
}

impl<'a, T> IntoVariant for &'a [T]
where
    T: IntoVariant + Clone,
{
    fn into_variant(self) -> Variant {
        Variant::Array(self.iter().cloned().map(IntoVariant::into_variant).collect())
    }
}

impl<T: FromVariant> FromVariant for Vec<T> {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::Array(items) => items.into_iter().map(T::from_variant).collect(),
            other => Err(Error::type_mismatch(ValueType::Array, other.value_type())),
        }
    }
}

impl<T: IntoVariant> IntoVariant for Option<T> {
    fn into_variant(self) -> Variant {
        match self {
            Some(value) => value.into_variant(),
            None => Variant::Null,
        }
    }
}

impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::Undefined | Variant::Null => Ok(None),
            other => T::from_variant(other).map(Some),
        }
    }
}

impl<T: IntoVariant> IntoVariant for BTreeMap<String, T> {
    fn into_variant(self) -> Variant {
        Variant::Object(self.into_iter().map(|(k, v)| (k, v.into_variant())).collect())
    }
}

impl<T: FromVariant> FromVariant for BTreeMap<String, T> {
    fn from_variant(value: Variant) -> Result<Self> {
        match value {
            Variant::Object(map) => map
                .into_iter()
                .map(|(k, v)| T::from_variant(v).map(|v| (k, v)))
                .collect(),
            other => Err(Error::type_mismatch(ValueType::Object, other.value_type())),
        }
    }
}

impl<T: IntoVariant> IntoVariant for HashMap<String, T> {
    fn into_variant(self) -> Variant {
        Variant::Object(self.into_iter().map(|(k, v)| (k, v.into_variant())).collect())
    }
}

impl<T: FromVariant> FromVariant for HashMap<String, T> {
    fn from_variant(value: Variant) -> Result<Self> {
        BTreeMap::<String, T>::from_variant(value).map(|map| map.into_iter().collect())
    }
}

macro_rules! impl_from_for_variant {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Variant {
                fn from(value: $t) -> Self {
                    value.into_variant()
                }
            }
        )*
    };
}

impl_from_for_variant!(bool, String, &str, i32, i64, u32, u64, f64);

fn check_args_length(args: &[Variant], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::ArgumentCount {
            expected,
            actual: args.len(),
        })
    }
}

impl FromArgs for () {
    fn from_args(args: Vec<Variant>) -> Result<Self> {
        check_args_length(&args, 0)
    }
}

macro_rules! impl_from_args {
    ($len:expr; $($name:ident),+) => {
        impl<$($name: FromVariant),+> FromArgs for ($($name,)+) {
            fn from_args(args: Vec<Variant>) -> Result<Self> {
                check_args_length(&args, $len)?;
                let mut args = args.into_iter();
                Ok(($($name::from_variant(args.next().unwrap_or_default())?,)+))
            }
        }
    };
}

impl_from_args!(1; A);
impl_from_args!(2; A, B);
impl_from_args!(3; A, B, C);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_extremes() {
        for n in [0, -42, i64::MIN, i64::MAX] {
            assert_eq!(i64::from_variant(n.into_variant()).unwrap(), n);
        }
        // -2^63 is exactly representable as a double
        assert_eq!(i64::from_variant(Variant::Float64(-9_223_372_036_854_775_808.0)).unwrap(), i64::MIN);
    }

    #[test]
    fn test_signed_range_violations() {
        assert!(matches!(
            i64::from_variant(Variant::UInt64(u64::MAX)),
            Err(Error::OutOfRange { target: "i64", .. })
        ));
        assert!(matches!(
            i64::from_variant(Variant::Float64(9_223_372_036_854_775_808.0)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(i64::from_variant(Variant::Float64(1.5)), Err(Error::OutOfRange { .. })));
        assert!(matches!(i64::from_variant(Variant::Float64(f64::NAN)), Err(Error::OutOfRange { .. })));
        assert!(matches!(i8::from_variant(Variant::Int64(200)), Err(Error::OutOfRange { target: "i8", .. })));
    }

    #[test]
    fn test_unsigned_extremes_and_violations() {
        assert_eq!(u64::from_variant(Variant::UInt64(u64::MAX)).unwrap(), u64::MAX);
        assert_eq!(u64::from_variant(Variant::Float64(123.0)).unwrap(), 123);
        assert!(matches!(u64::from_variant(Variant::Int64(-1)), Err(Error::OutOfRange { target: "u64", .. })));
        assert!(matches!(
            u64::from_variant(Variant::Float64(18_446_744_073_709_551_616.0)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(u32::from_variant(Variant::UInt64(1 << 40)), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_numbers_reject_other_types() {
        let err = u64::from_variant(Variant::from("123")).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { expected: ValueType::Number, found: ValueType::String }
        ));
        assert!(f64::from_variant(Variant::Bool(true)).is_err());
    }

    #[test]
    fn test_host_number_is_exact() {
        assert_eq!(to_host_number(&Variant::Int64(-42)).unwrap(), -42.0);
        assert_eq!(to_host_number(&Variant::UInt64(1 << 60)).unwrap(), 1_152_921_504_606_846_976.0);
        assert_eq!(to_host_number(&Variant::Float64(1.1)).unwrap().to_bits(), 1.1f64.to_bits());
        assert!(matches!(to_host_number(&Variant::UInt64(u64::MAX)), Err(Error::OutOfRange { .. })));
        assert!(matches!(to_host_number(&Variant::Int64(i64::MAX)), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            to_host_number(&Variant::Int64((1 << 53) + 1)),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_f32_requires_exact_value() {
        assert_eq!(f32::from_variant(Variant::Float64(0.5)).unwrap(), 0.5);
        assert!(f32::from_variant(Variant::Float64(1.1)).is_err());
    }

    #[test]
    fn test_collections() {
        let arr = vec!["one", "two", "three"].into_variant();
        let back = Vec::<String>::from_variant(arr).unwrap();
        assert_eq!(back, vec!["one", "two", "three"]);

        let mixed = Variant::Array(vec![Variant::from("one"), Variant::UInt64(2)]);
        assert!(Vec::<String>::from_variant(mixed).is_err());

        let mut map = HashMap::new();
        map.insert("bar".to_string(), 42u64);
        let obj = map.clone().into_variant();
        assert_eq!(HashMap::<String, u64>::from_variant(obj).unwrap(), map);
    }

    #[test]
    fn test_option_and_unit() {
        assert_eq!(Option::<bool>::from_variant(Variant::Null).unwrap(), None);
        assert_eq!(Option::<bool>::from_variant(Variant::Bool(true)).unwrap(), Some(true));
        assert_eq!(None::<u8>.into_variant(), Variant::Null);
        assert!(<()>::from_variant(Variant::Undefined).is_ok());
        assert!(<()>::from_variant(Variant::UInt64(0)).is_err());
    }

    #[test]
    fn test_from_args_checks_arity() {
        let (s,) = <(String,)>::from_args(vec![Variant::from("x")]).unwrap();
        assert_eq!(s, "x");

        let err = <(String,)>::from_args(vec![]).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { expected: 1, actual: 0 }));

        let err = <()>::from_args(vec![Variant::Null]).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { expected: 0, actual: 1 }));

        let (a, b) = <(i64, bool)>::from_args(vec![Variant::Int64(-1), Variant::Bool(false)]).unwrap();
        assert_eq!((a, b), (-1, false));
    }
}
