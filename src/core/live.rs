//! Live values and the stream operators the pipeline is built from
//!
//! A [`LiveStream`] is a continuously-updating value: it emits the current
//! state once, then a new state each time the underlying facts change. The
//! operators here are the small set the engine composes everything from.
//!
//! ```text
//! fact store ──watch──▶ WatchStream ──map──▶ distinct ──▶ combine_latest ──▶ ...
//!                                                        ▲
//!                                     switch_map (dispatch re-subscription)
//! ```

use futures::future::ready;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::error::RuleError;

/// A boxed, sendable, continuously-updating stream
pub type LiveStream<T> = BoxStream<'static, T>;

/// A live value that may fail
pub type LiveResult<T> = LiveStream<Result<T, RuleError>>;

/// Expose a watch channel as a live stream (current value first)
pub fn from_watch<T>(rx: watch::Receiver<T>) -> LiveStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    WatchStream::new(rx).boxed()
}

/// A live value that never changes
pub fn once<T: Send + 'static>(value: T) -> LiveStream<T> {
    stream::once(ready(value)).boxed()
}

/// A live value that failed before producing anything
pub fn fail<T: Send + 'static>(error: RuleError) -> LiveResult<T> {
    once(Err(error))
}

/// Drop every item structurally equal to the previously forwarded one
pub fn distinct<T>(source: LiveStream<T>) -> LiveStream<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    let mut last: Option<T> = None;
    source
        .filter_map(move |item| {
            let changed = last.as_ref() != Some(&item);
            if changed {
                last = Some(item.clone());
            }
            ready(changed.then_some(item))
        })
        .boxed()
}

/// Forward items up to and including the first error, then end
pub fn until_error<T: Send + 'static>(source: LiveResult<T>) -> LiveResult<T> {
    let mut failed = false;
    source
        .take_while(move |item| {
            let keep = !failed;
            failed = item.is_err();
            ready(keep)
        })
        .boxed()
}

/// Publishing side of a re-subscribable live value
///
/// Publishing a value equal to the current one is a no-op, so subscribers
/// only wake for content changes.
#[derive(Debug)]
pub struct LivePublisher<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> LivePublisher<T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the value, returning whether subscribers were notified
    pub fn publish(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&value) {
                false
            } else {
                *current = Some(value);
                true
            }
        })
    }

    pub fn subscriber(&self) -> SharedLive<T> {
        SharedLive {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T> Default for LivePublisher<T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A live value any number of consumers can subscribe to
///
/// Each subscription starts from the latest published value. Consumers that
/// need to re-subscribe (dispatch providers switching targets) clone the handle.
#[derive(Debug, Clone)]
pub struct SharedLive<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T> SharedLive<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn subscribe(&self) -> LiveStream<T> {
        WatchStream::new(self.rx.clone()).filter_map(ready).boxed()
    }
}

enum Either<A, B> {
    Left(A),
    Right(B),
}

/// Pair the latest values of two live streams
///
/// Emits once both sides have produced a value, then on every change of
/// either side. Ends when both sides end.
pub fn combine_latest<A, B>(left: LiveStream<A>, right: LiveStream<B>) -> LiveStream<(A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    let tagged = stream::select(left.map(Either::Left), right.map(Either::Right));
    tagged
        .scan((None::<A>, None::<B>), |latest, item| {
            match item {
                Either::Left(a) => latest.0 = Some(a),
                Either::Right(b) => latest.1 = Some(b),
            }
            let pair = match latest {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            };
            ready(Some(pair))
        })
        .filter_map(ready)
        .boxed()
}

/// Collect the latest value of every stream, in input order
///
/// Emits once each input has produced a value. An empty input emits a single
/// empty vector.
pub fn combine_latest_all<T>(sources: Vec<LiveStream<T>>) -> LiveStream<Vec<T>>
where
    T: Clone + Send + 'static,
{
    if sources.is_empty() {
        return once(Vec::new());
    }
    let width = sources.len();
    let tagged = stream::select_all(
        sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| source.map(move |item| (index, item)).boxed()),
    );
    tagged
        .scan(vec![None::<T>; width], |latest, (index, item)| {
            latest[index] = Some(item);
            let all = latest.iter().cloned().collect::<Option<Vec<T>>>();
            ready(Some(all))
        })
        .filter_map(ready)
        .boxed()
}

/// Re-subscribe an inner stream each time the outer stream emits
///
/// The previous inner stream is dropped as soon as a newer outer value
/// arrives. Ends when the outer stream and the current inner stream have both
/// ended.
pub fn switch_map<A, B, F>(outer: LiveStream<A>, project: F) -> LiveStream<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnMut(A) -> LiveStream<B> + Send + Unpin + 'static,
{
    SwitchMap {
        outer: Some(outer),
        inner: None,
        project,
    }
    .boxed()
}

struct SwitchMap<A, B, F> {
    outer: Option<LiveStream<A>>,
    inner: Option<LiveStream<B>>,
    project: F,
}

impl<A, B, F> Stream for SwitchMap<A, B, F>
where
    F: FnMut(A) -> LiveStream<B> + Unpin,
{
    type Item = B;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<B>> {
        let this = self.get_mut();

        // Drain the outer side so only the newest inner stream survives
        while let Some(outer) = this.outer.as_mut() {
            match outer.poll_next_unpin(cx) {
                Poll::Ready(Some(value)) => this.inner = Some((this.project)(value)),
                Poll::Ready(None) => this.outer = None,
                Poll::Pending => break,
            }
        }

        if let Some(inner) = this.inner.as_mut() {
            match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                Poll::Ready(None) => this.inner = None,
                Poll::Pending => return Poll::Pending,
            }
        }

        if this.outer.is_none() && this.inner.is_none() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}
