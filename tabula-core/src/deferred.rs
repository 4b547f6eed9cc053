use crate::{Completion, Error, Failure, Result};
use std::{
    future::Future,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    result::Result as StdResult,
    task::{Context, Poll},
};
use tokio::{runtime::Handle, sync::oneshot};

/// Single resolution result of one operation.
///
/// Resolves exactly once. When the producing side goes away without settling it (a
/// driver dropping its completion, a panicking task) the deferred resolves to an error.
#[must_use = "a deferred result does nothing unless awaited"]
pub struct Deferred<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> Deferred<T> {
    /// Returns the deferred together with the sender settling it.
    pub fn channel() -> (oneshot::Sender<Result<T>>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { receiver })
    }

    /// Already settled deferred.
    pub fn ready(result: Result<T>) -> Self {
        let (sender, deferred) = Self::channel();
        let _ = sender.send(result);
        deferred
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|result| {
            result.unwrap_or_else(|_| {
                Err(Error::msg(
                    "The operation was dropped before completing".to_string(),
                ))
            })
        })
    }
}

/// Wraps a completion based primitive: `primitive` is called right away, exactly once,
/// and its completion settles the returned deferred.
pub fn deferred<T, F>(primitive: F) -> Deferred<T>
where
    T: Send + 'static,
    F: FnOnce(Completion<T>),
{
    let (sender, deferred) = Deferred::channel();
    primitive(Box::new(move |result| {
        let _ = sender.send(result);
    }));
    deferred
}

/// Trailing completion handler of an operation, receives the outcome by reference.
pub type Callback<T> = Box<dyn FnOnce(StdResult<&T, &Error>) + Send + 'static>;

/// Boxes a closure into the optional trailing handler.
pub fn callback<T, F>(f: F) -> Option<Callback<T>>
where
    F: FnOnce(StdResult<&T, &Error>) + Send + 'static,
{
    Some(Box::new(f))
}

/// Runs `operation` once on the tokio runtime, reports the outcome to `callback` (if
/// any) and then settles the returned deferred with that same outcome.
///
/// The operation runs to completion even if the deferred is dropped. Outside a tokio
/// runtime the operation is not started, both observers receive an `InvalidCall`.
pub fn with_callback<T, F>(operation: F, callback: Option<Callback<T>>) -> Deferred<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let Ok(handle) = Handle::try_current() else {
        let result = Err(Failure::invalid_call(
            "no tokio runtime is running, the operation was not started",
        ));
        report(callback, &result);
        return Deferred::ready(result);
    };
    let (sender, deferred) = Deferred::channel();
    handle.spawn(async move {
        let result = operation.await;
        report(callback, &result);
        let _ = sender.send(result);
    });
    deferred
}

fn report<T>(callback: Option<Callback<T>>, result: &Result<T>) {
    let Some(callback) = callback else {
        return;
    };
    if panic::catch_unwind(AssertUnwindSafe(|| callback(result.as_ref()))).is_err() {
        log::error!("The completion callback panicked, the result is still delivered");
    }
}
