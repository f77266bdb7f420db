#![deny(clippy::all)]

mod logging;
mod value;

use std::sync::OnceLock;

use napi::bindgen_prelude::*;
use napi_derive::napi;

use node_api::{
  ops, to_host_number, BindingConfig, ErrorKind, Exports, FromVariant,
  LoggingConfig as RustLoggingConfig, Variant,
};

use crate::value::HostValue;

static CONFIG: OnceLock<BindingConfig> = OnceLock::new();
static EXPORTS: OnceLock<Exports> = OnceLock::new();

fn config() -> &'static BindingConfig {
  CONFIG.get_or_init(|| {
    BindingConfig::from_env().unwrap_or_else(|err| {
      log::warn!("Ignoring invalid binding config: {}", err);
      BindingConfig::default()
    })
  })
}

fn exports() -> &'static Exports {
  EXPORTS.get_or_init(|| Exports::standard(config()))
}

/// Convert a library error into a JS exception with the matching status
pub(crate) fn to_napi_error(err: node_api::Error) -> Error {
  let status = match err.kind() {
    ErrorKind::InvalidArg => Status::InvalidArg,
    ErrorKind::ObjectExpected => Status::ObjectExpected,
    ErrorKind::StringExpected => Status::StringExpected,
    ErrorKind::NumberExpected => Status::NumberExpected,
    ErrorKind::BooleanExpected => Status::BooleanExpected,
    ErrorKind::ArrayExpected => Status::ArrayExpected,
    ErrorKind::GenericFailure => Status::GenericFailure,
    ErrorKind::Cancelled => Status::Cancelled,
  };
  Error::new(status, err.to_string())
}

fn to_number(value: Variant) -> Result<f64> {
  to_host_number(&value).map_err(to_napi_error)
}

fn to_native<T: FromVariant>(value: Variant) -> Result<T> {
  T::from_variant(value).map_err(to_napi_error)
}

#[napi(object)]
pub struct LoggingConfig {
  pub enabled: Option<bool>,
  pub level: Option<String>,
  pub console_output: Option<bool>,
  pub verbose: Option<bool>,
}

/// Convert JS LoggingConfig to Rust LoggingConfig
impl From<LoggingConfig> for RustLoggingConfig {
  fn from(config: LoggingConfig) -> Self {
    let mut result = RustLoggingConfig::default();

    if let Some(enabled) = config.enabled {
      result.enabled = enabled;
    }

    if let Some(level) = config.level {
      result.level = level;
    }

    if let Some(console_output) = config.console_output {
      result.console_output = console_output;
    }

    if let Some(verbose) = config.verbose {
      result.verbose = verbose;
    }

    result
  }
}

#[napi(js_name = "init_logging")]
pub fn init_logging(config: Option<LoggingConfig>) -> Result<()> {
  let rust_config = match config {
    Some(config) => RustLoggingConfig::from(config),
    None => self::config().logging.clone(),
  };

  logging::init(&rust_config).map_err(to_napi_error)
}

#[napi(js_name = "returns_objects")]
pub fn returns_objects() -> HostValue {
  HostValue(ops::returns_objects())
}

#[napi(js_name = "returns_strings")]
pub fn returns_strings() -> Result<String> {
  to_native(ops::returns_strings())
}

#[napi(js_name = "returns_numbers")]
pub fn returns_numbers() -> Result<f64> {
  to_number(ops::returns_numbers())
}

#[napi(js_name = "returns_booleans")]
pub fn returns_booleans() -> Result<bool> {
  to_native(ops::returns_booleans())
}

#[napi(js_name = "returns_arrays")]
pub fn returns_arrays() -> Result<Vec<String>> {
  to_native(ops::returns_arrays())
}

/// Resolves with `undefined` once a worker thread has completed
#[napi(js_name = "returns_promises")]
pub async fn returns_promises() -> Result<()> {
  ops::returns_promises(&config().worker)
    .await
    .map_err(to_napi_error)
}

#[napi(js_name = "receives_objects")]
pub fn receives_objects(object: HostValue) -> Result<HostValue> {
  ops::receives_objects(object.0)
    .map(HostValue)
    .map_err(to_napi_error)
}

#[napi(js_name = "receives_strings")]
pub fn receives_strings(s: String) -> Result<String> {
  let value = ops::receives_strings(Variant::String(s)).map_err(to_napi_error)?;
  to_native(value)
}

#[napi(js_name = "receives_booleans")]
pub fn receives_booleans(b: bool) -> Result<bool> {
  let value = ops::receives_booleans(Variant::Bool(b)).map_err(to_napi_error)?;
  to_native(value)
}

// Integer arguments arrive as JS numbers and must be exact integers in range.

#[napi(js_name = "receives_f64")]
pub fn receives_f64(n: f64) -> Result<f64> {
  let value = ops::receives_f64(Variant::Float64(n)).map_err(to_napi_error)?;
  to_number(value)
}

#[napi(js_name = "receives_u64")]
pub fn receives_u64(n: f64) -> Result<f64> {
  let value = ops::receives_u64(Variant::Float64(n)).map_err(to_napi_error)?;
  to_number(value)
}

#[napi(js_name = "receives_i64")]
pub fn receives_i64(n: f64) -> Result<f64> {
  let value = ops::receives_i64(Variant::Float64(n)).map_err(to_napi_error)?;
  to_number(value)
}

#[napi(js_name = "receives_arrays")]
pub fn receives_arrays(array: HostValue) -> Result<HostValue> {
  ops::receives_arrays(array.0)
    .map(HostValue)
    .map_err(to_napi_error)
}

/// Call any exported operation by name
#[napi]
pub async fn invoke(name: String, args: Vec<HostValue>) -> Result<HostValue> {
  let args = args.into_iter().map(|arg| arg.0).collect();
  exports()
    .call(&name, args)
    .await
    .map(HostValue)
    .map_err(to_napi_error)
}
