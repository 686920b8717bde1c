//! Unbounded FIFO channel for joining the results of concurrently running tasks
//!
//! Any number of tasks [`write`](Channel::write) into a shared [`Channel`]; a consumer
//! that knows how many values to expect [`read`](Channel::read)s that many times. A read
//! on an empty channel suspends the task until a value arrives. Suspended readers are
//! served in the order they started waiting.
//!
//! ```
//! use micro_fiber::channel::Channel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let channel = Channel::new();
//! for id in 0..3 {
//!     let channel = channel.clone();
//!     tokio::spawn(async move { channel.write(id) });
//! }
//!
//! let mut ids = vec![channel.read().await, channel.read().await, channel.read().await];
//! ids.sort();
//! assert_eq!(ids, vec![0, 1, 2]);
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use tracing::trace;

/// A multi-producer FIFO queue whose reads suspend while it is empty.
///
/// Clones share the same queue. Writes never block and never fail.
pub struct Channel<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

struct Shared<T> {
    queue: VecDeque<T>,
    // invariant: non-empty only while `queue` is empty
    readers: VecDeque<oneshot::Sender<T>>,
}

impl<T> Shared<T> {
    /// Hands `value` to the oldest reader still waiting, returns it if there is none.
    fn serve_reader(&mut self, mut value: T) -> Option<T> {
        while let Some(reader) = self.readers.pop_front() {
            match reader.send(value) {
                Ok(()) => return None,
                // the reader gave up waiting
                Err(returned) => value = returned,
            }
        }
        Some(value)
    }
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self { shared: Arc::new(Mutex::new(Shared { queue: VecDeque::new(), readers: VecDeque::new() })) }
    }

    /// Appends `value`, waking the reader that has waited longest if there is one.
    pub fn write(&self, value: T) {
        let mut shared = self.lock();
        match shared.serve_reader(value) {
            None => trace!("handed value to waiting reader"),
            Some(value) => shared.queue.push_back(value),
        }
    }

    /// Removes and returns the oldest value, suspending until one is written.
    pub fn read(&self) -> Read<'_, T> {
        Read { channel: self, receiver: None }
    }

    /// Removes and returns the oldest value without suspending.
    pub fn try_read(&self) -> Option<T> {
        self.lock().queue.pop_front()
    }

    /// Number of values written but not read yet.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of reads currently suspended on this channel.
    pub fn pending_readers(&self) -> usize {
        self.lock().readers.iter().filter(|reader| !reader.is_canceled()).count()
    }

    /// Puts back a value that was handed to a reader which went away before taking it.
    fn hand_back(&self, value: T) {
        let mut shared = self.lock();
        if let Some(value) = shared.serve_reader(value) {
            shared.queue.push_front(value);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        // a panic while holding the lock leaves the queue itself consistent
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("Channel").field("len", &shared.queue.len()).field("readers", &shared.readers.len()).finish()
    }
}

/// Future returned by [`Channel::read`].
///
/// Dropping it before completion gives up the read; a value already handed to it goes
/// back to the channel.
#[must_use = "futures do nothing unless polled"]
pub struct Read<'a, T> {
    channel: &'a Channel<T>,
    receiver: Option<oneshot::Receiver<T>>,
}

impl<T> Future for Read<'_, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let channel = this.channel;

        loop {
            if let Some(receiver) = &mut this.receiver {
                match receiver.poll_unpin(cx) {
                    Poll::Ready(Ok(value)) => {
                        this.receiver = None;
                        return Poll::Ready(value);
                    }
                    // sender dropped without a value, wait again
                    Poll::Ready(Err(oneshot::Canceled)) => this.receiver = None,
                    Poll::Pending => return Poll::Pending,
                }
            }

            let mut shared = channel.lock();
            if let Some(value) = shared.queue.pop_front() {
                return Poll::Ready(value);
            }

            let (sender, receiver) = oneshot::channel();
            shared.readers.push_back(sender);
            drop(shared);
            this.receiver = Some(receiver);
        }
    }
}

impl<T> Drop for Read<'_, T> {
    fn drop(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.close();
            if let Ok(Some(value)) = receiver.try_recv() {
                self.channel.hand_back(value);
            }
        }
    }
}

impl<T> fmt::Debug for Read<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Read").field("waiting", &self.receiver.is_some()).finish()
    }
}
