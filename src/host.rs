//! The host's single logical thread
//!
//! Work that must run on the host (completion callbacks, wake-ups) is posted
//! through a [`HostHandle`] from any thread and executed by whichever thread
//! owns the [`HostLoop`]. Only that thread ever runs host tasks.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::task::{waker, ArcWake};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable, thread-safe handle for posting work to the host
#[derive(Clone)]
pub struct HostHandle {
    sender: UnboundedSender<Task>,
}

impl HostHandle {
    /// Queue a task for the host thread
    ///
    /// Returns `false` when the host loop no longer exists.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Box::new(task)).is_ok()
    }
}

/// Task queue drained on the host thread
pub struct HostLoop {
    receiver: UnboundedReceiver<Task>,
    // Keeps the channel open for as long as the loop exists
    handle: HostHandle,
}

struct HostWaker {
    handle: HostHandle,
    notified: AtomicBool,
}

impl ArcWake for HostWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.notified.store(true, Ordering::Release);
        // Unblocks a host parked in `block_on`
        arc_self.handle.post(|| {});
    }
}

impl HostLoop {
    pub fn new() -> (Self, HostHandle) {
        let (sender, receiver) = unbounded_channel();
        let handle = HostHandle { sender };
        let host = Self {
            receiver,
            handle: handle.clone(),
        };
        (host, handle)
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Run every task queued so far without blocking
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Drive `future` to completion on the host thread
    ///
    /// While the future is suspended the host keeps running posted tasks,
    /// so continuations queued by other completions are not starved. Must
    /// not be called from inside an async runtime.
    pub fn block_on<F: Future>(&mut self, future: F) -> F::Output {
        let mut future = std::pin::pin!(future);
        let wake = Arc::new(HostWaker {
            handle: self.handle.clone(),
            notified: AtomicBool::new(false),
        });
        let waker = waker(wake.clone());
        let mut cx = Context::from_waker(&waker);

        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
            while !wake.notified.swap(false, Ordering::AcqRel) {
                if let Some(task) = self.receiver.blocking_recv() {
                    task();
                }
            }
        }
    }
}
