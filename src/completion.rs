//! Single-resolution completion handles
//!
//! A [`Completion`] is a write-once result slot. The paired [`Resolver`] is
//! consumed by settling it, so a completion settles at most once; dropping
//! the resolver without settling rejects the completion instead of leaving
//! it pending forever.
//!
//! The result can be consumed exactly once, either by awaiting the
//! completion or by registering a host continuation with
//! [`Completion::then`].

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use crate::error::{Error, Result};
use crate::host::HostHandle;

type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

enum Waiter<T> {
    Task(Waker),
    Callback(Callback<T>),
}

enum State<T> {
    Pending(Option<Waiter<T>>),
    Settled(Result<T>),
    Consumed,
}

struct Shared<T> {
    state: Mutex<State<T>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Shared<T> {
    fn settle(&self, result: Result<T>) {
        let mut state = lock(&self.state);
        match mem::replace(&mut *state, State::Consumed) {
            State::Pending(Some(Waiter::Callback(callback))) => {
                drop(state);
                callback(result);
            }
            State::Pending(Some(Waiter::Task(waker))) => {
                *state = State::Settled(result);
                drop(state);
                waker.wake();
            }
            State::Pending(None) => *state = State::Settled(result),
            // Unreachable through `Resolver`, which settles once
            settled => *state = settled,
        }
    }
}

/// Write side of a completion
pub struct Resolver<T> {
    shared: Option<Arc<Shared<T>>>,
}

/// Read side of a completion
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

/// Create a pending completion and its resolver
pub fn pair<T>() -> (Resolver<T>, Completion<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending(None)),
    });
    (
        Resolver {
            shared: Some(shared.clone()),
        },
        Completion { shared },
    )
}

impl<T> Resolver<T> {
    pub fn resolve(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Ok(value));
        }
    }

    pub fn reject(mut self, error: Error) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Err(error));
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            log::debug!("resolver dropped before settling; rejecting completion");
            shared.settle(Err(Error::Cancelled(
                "completion dropped before it was settled".to_string(),
            )));
        }
    }
}

impl<T> Completion<T> {
    /// An already resolved completion
    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// An already rejected completion
    pub fn rejected(error: Error) -> Self {
        Self::settled(Err(error))
    }

    fn settled(result: Result<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::Settled(result)),
            }),
        }
    }

    /// Whether a result is waiting to be consumed
    pub fn is_settled(&self) -> bool {
        matches!(*lock(&self.shared.state), State::Settled(_))
    }

    /// Register a continuation to run on the host thread once settled
    ///
    /// The completion may settle on any thread; `callback` is always posted
    /// through `host` and runs exactly once, on the host.
    pub fn then<F>(self, host: &HostHandle, callback: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
        T: Send + 'static,
    {
        let host = host.clone();
        let deliver: Callback<T> = Box::new(move |result| {
            if !host.post(move || callback(result)) {
                log::warn!("host loop is gone; completion callback dropped");
            }
        });

        let mut state = lock(&self.shared.state);
        match mem::replace(&mut *state, State::Consumed) {
            State::Pending(_) => *state = State::Pending(Some(Waiter::Callback(deliver))),
            State::Settled(result) => {
                drop(state);
                deliver(result);
            }
            State::Consumed => {
                drop(state);
                deliver(Err(Error::GenericFailure(
                    "completion result was already consumed".to_string(),
                )));
            }
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = lock(&self.shared.state);
        match mem::replace(&mut *state, State::Consumed) {
            State::Settled(result) => Poll::Ready(result),
            State::Pending(_) => {
                *state = State::Pending(Some(Waiter::Task(cx.waker().clone())));
                Poll::Pending
            }
            State::Consumed => Poll::Ready(Err(Error::GenericFailure(
                "completion polled after its result was consumed".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostLoop;
    use std::thread;
    use tokio_test::{assert_pending, assert_ready};

    #[test]
    fn test_poll_before_and_after_resolution() {
        let (resolver, completion) = pair::<u32>();
        let mut task = tokio_test::task::spawn(completion);

        assert_pending!(task.poll());
        resolver.resolve(7);
        assert!(task.is_woken());
        assert_eq!(assert_ready!(task.poll()).unwrap(), 7);
    }

    #[test]
    fn test_dropped_resolver_rejects() {
        let (resolver, completion) = pair::<()>();
        drop(resolver);
        assert!(completion.is_settled());

        let mut task = tokio_test::task::spawn(completion);
        let result = assert_ready!(task.poll());
        assert!(matches!(result, Err(Error::Cancelled(_))));
    }

    #[test]
    fn test_reject_carries_error() {
        let (resolver, completion) = pair::<()>();
        resolver.reject(Error::Worker("boom".to_string()));
        let mut task = tokio_test::task::spawn(completion);
        assert!(matches!(assert_ready!(task.poll()), Err(Error::Worker(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_await_resolution_from_other_thread() {
        let (resolver, completion) = pair::<String>();
        thread::spawn(move || resolver.resolve("done".to_string()));
        assert_eq!(completion.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_preresolved_completions() {
        assert_eq!(Completion::resolved(3).await.unwrap(), 3);
        let err = Completion::<()>::rejected(Error::Cancelled("x".into())).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[test]
    fn test_then_delivers_on_host_thread_exactly_once() {
        let (mut host, handle) = HostLoop::new();
        let host_thread = thread::current().id();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (resolver, completion) = pair::<u64>();

        {
            let calls = calls.clone();
            completion.then(&handle, move |result| {
                calls.lock().unwrap().push((result.unwrap(), thread::current().id()));
            });
        }

        thread::spawn(move || resolver.resolve(42)).join().unwrap();
        assert!(calls.lock().unwrap().is_empty(), "callback must wait for the host");

        assert_eq!(host.run_pending(), 1);
        assert_eq!(host.run_pending(), 0);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (42, host_thread));
    }

    #[test]
    fn test_then_on_settled_completion() {
        let (mut host, handle) = HostLoop::new();
        let seen = Arc::new(Mutex::new(None));
        {
            let seen = seen.clone();
            Completion::resolved("ready").then(&handle, move |result| {
                *seen.lock().unwrap() = Some(result.unwrap());
            });
        }
        host.run_pending();
        assert_eq!(*seen.lock().unwrap(), Some("ready"));
    }
}
