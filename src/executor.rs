//! Off-thread execution of native work

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::completion::{self, Completion};
use crate::config::WorkerConfig;
use crate::error::{Error, Result};

/// Run `job` on a dedicated worker thread
///
/// The returned completion settles with the job's result. A job that
/// panics, or a worker that cannot be started, rejects it with
/// [`Error::Worker`].
pub fn spawn_fn<T, F>(config: &WorkerConfig, job: F) -> Completion<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (resolver, completion) = completion::pair();

    let mut builder = thread::Builder::new().name(config.thread_name.clone());
    if let Some(size) = config.stack_size {
        builder = builder.stack_size(size);
    }

    let spawned = builder.spawn(move || {
        log::debug!("worker job started");
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(value)) => resolver.resolve(value),
            Ok(Err(err)) => resolver.reject(err),
            Err(_) => resolver.reject(Error::Worker("worker job panicked".to_string())),
        }
    });

    match spawned {
        Ok(_) => completion,
        Err(err) => {
            log::error!("failed to start worker thread: {}", err);
            Completion::rejected(Error::Worker(format!("failed to start worker thread: {}", err)))
        }
    }
}
