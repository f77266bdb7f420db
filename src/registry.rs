//! Named exports and dynamic dispatch
//!
//! [`Exports`] is the native side of a module's `exports` object: a table of
//! operations the host can call by name with a list of arguments.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BindingConfig, WorkerConfig};
use crate::convert::FromArgs;
use crate::error::{Error, Result};
use crate::ops;
use crate::value::Variant;

/// An operation callable from the host
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, args: Vec<Variant>) -> Result<Variant>;
}

/// Information about a single call, used to correlate log lines
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Unique identifier for the call
    pub id: String,

    /// Name the operation was invoked under
    pub operation: String,
}

impl CallContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            id: format!("{}", uuid::Uuid::new_v4()),
            operation: operation.into(),
        }
    }
}

/// Synchronous handler built from a function over typed arguments
pub struct FnHandler<A, F> {
    f: F,
    _args: PhantomData<fn(A)>,
}

/// Wrap `f` as a handler; arguments are checked and decoded through [`FromArgs`]
pub fn sync_fn<A, F>(f: F) -> Arc<dyn Handler>
where
    A: FromArgs + Send + 'static,
    F: Fn(A) -> Result<Variant> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        f,
        _args: PhantomData,
    })
}

#[async_trait]
impl<A, F> Handler for FnHandler<A, F>
where
    A: FromArgs + Send + 'static,
    F: Fn(A) -> Result<Variant> + Send + Sync + 'static,
{
    async fn call(&self, args: Vec<Variant>) -> Result<Variant> {
        let args = A::from_args(args)?;
        (self.f)(args)
    }
}

struct PromiseHandler {
    worker: WorkerConfig,
}

#[async_trait]
impl Handler for PromiseHandler {
    async fn call(&self, args: Vec<Variant>) -> Result<Variant> {
        <()>::from_args(args)?;
        ops::returns_promises(&self.worker).await?;
        Ok(Variant::Undefined)
    }
}

fn nullary(f: fn() -> Variant) -> Arc<dyn Handler> {
    sync_fn(move |(): ()| Ok(f()))
}

fn unary(f: fn(Variant) -> Result<Variant>) -> Arc<dyn Handler> {
    sync_fn(move |(value,): (Variant,)| f(value))
}

/// Table of operations exported to the host
#[derive(Default)]
pub struct Exports {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl Exports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every boundary operation, registered under its exported name
    pub fn standard(config: &BindingConfig) -> Self {
        let mut exports = Self::new();
        exports
            .register("returns_objects", nullary(ops::returns_objects))
            .register("returns_strings", nullary(ops::returns_strings))
            .register("returns_numbers", nullary(ops::returns_numbers))
            .register("returns_booleans", nullary(ops::returns_booleans))
            .register("returns_arrays", nullary(ops::returns_arrays))
            .register(
                "returns_promises",
                Arc::new(PromiseHandler {
                    worker: config.worker.clone(),
                }),
            )
            .register("receives_objects", unary(ops::receives_objects))
            .register("receives_strings", unary(ops::receives_strings))
            .register("receives_booleans", unary(ops::receives_booleans))
            .register("receives_f64", unary(ops::receives_f64))
            .register("receives_u64", unary(ops::receives_u64))
            .register("receives_i64", unary(ops::receives_i64))
            .register("receives_arrays", unary(ops::receives_arrays));
        exports
    }

    /// Add or replace an operation
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Invoke an operation by name
    pub async fn call(&self, name: &str, args: Vec<Variant>) -> Result<Variant> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;

        let ctx = CallContext::new(name);
        log::debug!("{} called with {} argument(s) (ctx: {})", ctx.operation, args.len(), ctx.id);

        let result = handler.call(args).await;
        match &result {
            Ok(value) => log::debug!("{} returned {} (ctx: {})", ctx.operation, value, ctx.id),
            Err(err) => log::debug!("{} failed: {} (ctx: {})", ctx.operation, err, ctx.id),
        }
        result
    }
}
