use std::collections::BTreeMap;

use napi::bindgen_prelude::*;
use node_api::{to_host_number, Variant};

use crate::to_napi_error;

/// Deepest nesting walked in either direction; cyclic objects stop here
const MAX_DEPTH: u32 = 128;

/// A JS value read into a [`Variant`] member by member
///
/// Numbers keep their exact double (including `-0`) and object members
/// holding `undefined` are kept as [`Variant::Undefined`].
pub struct HostValue(pub Variant);

fn too_deep() -> Error {
  Error::new(
    Status::InvalidArg,
    format!("value is nested deeper than {} levels", MAX_DEPTH),
  )
}

unsafe fn read(env: sys::napi_env, value: Unknown<'_>, depth: u32) -> Result<Variant> {
  let raw = value.raw();
  let variant = match value.get_type()? {
    ValueType::Undefined => Variant::Undefined,
    ValueType::Null => Variant::Null,
    ValueType::Boolean => Variant::Bool(unsafe { bool::from_napi_value(env, raw)? }),
    ValueType::Number => Variant::Float64(unsafe { f64::from_napi_value(env, raw)? }),
    ValueType::String => Variant::String(unsafe { String::from_napi_value(env, raw)? }),
    ValueType::Object => {
      if depth == 0 {
        return Err(too_deep());
      }

      if value.is_array()? {
        let array = unsafe { Array::from_napi_value(env, raw)? };
        let mut items = Vec::with_capacity(array.len() as usize);
        for index in 0..array.len() {
          let item = match array.get::<Unknown>(index)? {
            Some(item) => unsafe { read(env, item, depth - 1)? },
            None => Variant::Undefined,
          };
          items.push(item);
        }
        Variant::Array(items)
      } else {
        let object = unsafe { Object::from_napi_value(env, raw)? };
        let mut members = BTreeMap::new();
        for key in Object::keys(&object)? {
          // `get` reports an `undefined` member as absent
          let member = match object.get::<Unknown>(&key)? {
            Some(member) => unsafe { read(env, member, depth - 1)? },
            None => Variant::Undefined,
          };
          members.insert(key, member);
        }
        Variant::Object(members)
      }
    }
    other => {
      return Err(Error::new(
        Status::InvalidArg,
        format!("{} values cannot be passed to native code", other),
      ))
    }
  };

  Ok(variant)
}

unsafe fn write(env: sys::napi_env, value: Variant, depth: u32) -> Result<sys::napi_value> {
  match value {
    Variant::Undefined => unsafe { <()>::to_napi_value(env, ()) },
    Variant::Null => unsafe { Null::to_napi_value(env, Null) },
    Variant::Bool(b) => unsafe { bool::to_napi_value(env, b) },
    number @ (Variant::Int64(_) | Variant::UInt64(_) | Variant::Float64(_)) => {
      let n = to_host_number(&number).map_err(to_napi_error)?;
      unsafe { f64::to_napi_value(env, n) }
    }
    Variant::String(s) => unsafe { String::to_napi_value(env, s) },
    Variant::Array(items) => {
      if depth == 0 {
        return Err(too_deep());
      }

      let len = u32::try_from(items.len())
        .map_err(|_| Error::new(Status::InvalidArg, "array is too long".to_owned()))?;
      let handle = Env::from(env);
      let mut array = handle.create_array(len)?;
      for (index, item) in (0..len).zip(items) {
        let raw = unsafe { write(env, item, depth - 1)? };
        array.set(index, raw)?;
      }
      Ok(array.raw())
    }
    Variant::Object(members) => {
      if depth == 0 {
        return Err(too_deep());
      }

      let mut object = Object::new(&Env::from(env))?;
      for (key, member) in members {
        let raw = unsafe { write(env, member, depth - 1)? };
        object.set(key, raw)?;
      }
      Ok(object.raw())
    }
  }
}

impl TypeName for HostValue {
  fn type_name() -> &'static str {
    "unknown"
  }

  fn value_type() -> ValueType {
    ValueType::Unknown
  }
}

impl ValidateNapiValue for HostValue {
  unsafe fn validate(_env: sys::napi_env, _napi_val: sys::napi_value) -> Result<sys::napi_value> {
    Ok(std::ptr::null_mut())
  }
}

impl FromNapiValue for HostValue {
  unsafe fn from_napi_value(env: sys::napi_env, napi_val: sys::napi_value) -> Result<Self> {
    let value = unsafe { Unknown::from_raw_unchecked(env, napi_val) };
    unsafe { read(env, value, MAX_DEPTH) }.map(HostValue)
  }
}

impl ToNapiValue for HostValue {
  unsafe fn to_napi_value(env: sys::napi_env, val: Self) -> Result<sys::napi_value> {
    unsafe { write(env, val.0, MAX_DEPTH) }
  }
}
