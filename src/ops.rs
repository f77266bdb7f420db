//! The operations exposed across the boundary
//!
//! Every `receives_*` operation decodes its argument into the declared native
//! type and encodes it straight back, so the result is the argument itself
//! under deep equality or a typed error. Nothing is coerced.

use std::collections::BTreeMap;

use crate::completion::Completion;
use crate::config::WorkerConfig;
use crate::convert::{FromVariant, IntoVariant};
use crate::error::Result;
use crate::executor;
use crate::value::Variant;

/// Native struct handed back by [`returns_objects`]
#[derive(Clone, Debug, PartialEq)]
pub struct Greeting {
    pub foo: String,
    pub bar: u64,
}

impl Default for Greeting {
    fn default() -> Self {
        Self {
            foo: "hello".to_string(),
            bar: 42,
        }
    }
}

impl IntoVariant for Greeting {
    fn into_variant(self) -> Variant {
        Variant::object([("foo", self.foo.into_variant()), ("bar", self.bar.into_variant())])
    }
}

pub fn returns_objects() -> Variant {
    Greeting::default().into_variant()
}

pub fn returns_strings() -> Variant {
    "returned_string".into_variant()
}

pub fn returns_numbers() -> Variant {
    42u64.into_variant()
}

pub fn returns_booleans() -> Variant {
    true.into_variant()
}

pub fn returns_arrays() -> Variant {
    vec!["one", "two", "three"].into_variant()
}

/// A void completion settled from a worker thread
pub fn returns_promises(config: &WorkerConfig) -> Completion<()> {
    executor::spawn_fn(config, || {
        log::debug!("returns_promises: completing on worker");
        Ok(())
    })
}

fn passthrough<T>(name: &str, value: Variant) -> Result<Variant>
where
    T: FromVariant + IntoVariant,
{
    match T::from_variant(value) {
        Ok(native) => Ok(native.into_variant()),
        Err(err) => {
            log::warn!("{} rejected its argument: {}", name, err);
            Err(err)
        }
    }
}

pub fn receives_objects(value: Variant) -> Result<Variant> {
    passthrough::<BTreeMap<String, Variant>>("receives_objects", value)
}

pub fn receives_strings(value: Variant) -> Result<Variant> {
    passthrough::<String>("receives_strings", value)
}

pub fn receives_booleans(value: Variant) -> Result<Variant> {
    passthrough::<bool>("receives_booleans", value)
}

pub fn receives_f64(value: Variant) -> Result<Variant> {
    passthrough::<f64>("receives_f64", value)
}

pub fn receives_u64(value: Variant) -> Result<Variant> {
    passthrough::<u64>("receives_u64", value)
}

pub fn receives_i64(value: Variant) -> Result<Variant> {
    passthrough::<i64>("receives_i64", value)
}

pub fn receives_arrays(value: Variant) -> Result<Variant> {
    passthrough::<Vec<Variant>>("receives_arrays", value)
}
