//! Response bodies that report when they finish.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::Stream;

/// Wraps a stream and runs `on_done` exactly once: when the stream ends,
/// or when it is dropped before ending (client gone, upstream error).
pub struct CompletionStream<S, F: FnOnce()> {
    inner: S,
    on_done: Option<F>,
}

impl<S, F: FnOnce()> CompletionStream<S, F> {
    pub fn new(inner: S, on_done: F) -> Self {
        Self {
            inner,
            on_done: Some(on_done),
        }
    }

    fn finish(&mut self) {
        if let Some(on_done) = self.on_done.take() {
            on_done();
        }
    }
}

impl<S, F> Stream for CompletionStream<S, F>
where
    S: Stream + Unpin,
    F: FnOnce() + Unpin,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let this = self.get_mut();
        let item = ready!(Pin::new(&mut this.inner).poll_next(cx));
        if item.is_none() {
            this.finish();
        }
        Poll::Ready(item)
    }
}

impl<S, F: FnOnce()> Drop for CompletionStream<S, F> {
    fn drop(&mut self) {
        self.finish();
    }
}
