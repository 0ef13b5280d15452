//! Rule evaluation orchestrator
//!
//! [`CollectionRulesService::watch`] turns one set of [`WatchOptions`] into a
//! live stream of grouped, ordered results. Each subscription runs its own
//! pipeline task:
//!
//! ```text
//! primary clauses ──distinct──▶ intersect ──┐
//!                                            ├──▶ (primary ∪ allow) ∩ extra ──▶ matched
//! extra clauses ───distinct──▶ intersect ───┘                                    │
//!                                                        ┌───────────────────────┤ (deduplicated)
//!                                                        ▼                       ▼
//!                                               order-by provider       group-by provider
//!                                                        │                       │
//!                                                        └──────▶ merge ◀────────┘
//!                                                                   │
//!                                                               throttle ──▶ RuleStream
//! ```
//!
//! The pipeline holds no state outside its task. Dropping the [`RuleStream`]
//! aborts the task, which drops every provider subscription it owns.

use futures::FutureExt;
use futures::stream::{SelectAll, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use uuid::Uuid;

use super::error::RuleError;
use super::live::{self, LivePublisher, LiveResult, LiveStream};
use super::merge::{RuleResult, merge_groups};
use super::params::{FilterParams, WatchOptions};
use super::registry::ProviderRegistry;
use super::set::{DocId, DocIdSet, GroupMap};
use crate::config::EngineConfig;

/// Capacity of the channel between a pipeline task and its consumer
const RESULT_BUFFER: usize = 16;

/// Evaluates collection rules against live workspace facts
#[derive(Clone)]
pub struct CollectionRulesService {
    registry: ProviderRegistry,
    config: EngineConfig,
}

impl CollectionRulesService {
    pub fn new(registry: ProviderRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to the live result of a rule
    ///
    /// Extra-filter, group-by and order-by clauses are system-authored: if the
    /// provider their `type` names is not registered, this returns
    /// [`RuleError::UnsupportedProvider`] instead of a stream. Primary filter
    /// clauses never fail the call; their errors land in `filter_errors`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(&self, options: WatchOptions) -> Result<RuleStream, RuleError> {
        let registry = &self.registry;

        let extra = options
            .active_extra_filters()
            .map(|filters| extra_filters(registry, filters))
            .transpose()?;
        let order_by = options
            .order_by
            .as_ref()
            .map(|params| registry.order_by_provider(&params.kind).map(|p| (p, params)))
            .transpose()?;
        let group_by = options
            .group_by
            .as_ref()
            .map(|params| registry.group_by_provider(&params.kind).map(|p| (p, params)))
            .transpose()?;

        let items = LivePublisher::new();
        let mut signals: SelectAll<LiveStream<Signal>> = SelectAll::new();
        signals.push(primary_filters(registry, &options.filters).map(Signal::Primary).boxed());
        if let Some(extra) = extra {
            signals.push(extra.map(Signal::Extra).boxed());
        }
        if let Some((provider, params)) = &order_by {
            let ordered = provider.order_by(items.subscriber(), params, registry);
            signals.push(live::distinct(ordered).map(Signal::Ordered).boxed());
        }
        if let Some((provider, params)) = &group_by {
            let grouped = provider.group_by(items.subscriber(), params, registry);
            signals.push(live::distinct(grouped).map(Signal::Grouped).boxed());
        }

        let id = Uuid::new_v4();
        let pipeline = Pipeline {
            allow_list: options.extra_allow_list.iter().cloned().collect(),
            expects_extra: options.active_extra_filters().is_some(),
            expects_order: order_by.is_some(),
            expects_group: group_by.is_some(),
            items,
            primary: None,
            extra: None,
            matched: None,
            ordered: None,
            grouped: None,
        };

        tracing::debug!(
            subscription_id = %id,
            filters = options.filters.len(),
            group_by = ?options.group_by.as_ref().map(|g| g.kind.as_str()),
            order_by = ?options.order_by.as_ref().map(|o| o.kind.as_str()),
            "Rule subscription created"
        );

        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let span = tracing::debug_span!("rule_subscription", subscription_id = %id);
        let task = tokio::spawn(
            pipeline
                .run(signals, Throttle::new(self.config.throttle()), tx)
                .instrument(span),
        );

        Ok(RuleStream {
            id,
            results: ReceiverStream::new(rx),
            task: task.abort_handle(),
        })
    }

    /// Evaluate a rule once: the first result `watch()` emits
    pub async fn compute(&self, options: WatchOptions) -> Result<RuleResult, RuleError> {
        let mut stream = self.watch(options)?;
        stream.next().await.unwrap_or(Err(RuleError::Closed))
    }
}

/// Live results of one `watch()` subscription
///
/// Yields `Ok` results until dropped. An `Err` item is only produced when an
/// extra-filter clause fails or an order or group clause names no registered
/// provider, and is always the last item.
pub struct RuleStream {
    id: Uuid,
    results: ReceiverStream<Result<RuleResult, RuleError>>,
    task: AbortHandle,
}

impl RuleStream {
    /// Identifier carried by this subscription's log events
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Stream for RuleStream {
    type Item = Result<RuleResult, RuleError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.results.poll_next_unpin(cx)
    }
}

impl Drop for RuleStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Intersection of the primary clauses plus one error slot per clause
#[derive(Debug, Clone, PartialEq)]
struct FilterOutcome {
    filtered: DocIdSet,
    errors: Vec<Option<RuleError>>,
}

enum Signal {
    Primary(FilterOutcome),
    Extra(Result<DocIdSet, RuleError>),
    Ordered(Result<Vec<DocId>, RuleError>),
    Grouped(Result<GroupMap, RuleError>),
}

/// Evaluate the user-authored clauses
///
/// No clauses match nothing. A failing clause ends its own stream with the
/// error, which then contributes the empty set.
fn primary_filters(registry: &ProviderRegistry, filters: &[FilterParams]) -> LiveStream<FilterOutcome> {
    if filters.is_empty() {
        return live::once(FilterOutcome {
            filtered: DocIdSet::new(),
            errors: Vec::new(),
        });
    }

    let clauses = filters
        .iter()
        .enumerate()
        .map(|(index, params)| {
            let provider = params.kind.clone();
            live::until_error(live::distinct(registry.filter(params)))
                .inspect(move |result| {
                    if let Err(error) = result {
                        tracing::warn!(clause = index, provider = %provider, error = %error, "Filter clause failed");
                    }
                })
                .boxed()
        })
        .collect();

    let combined = live::combine_latest_all(clauses).map(|results| FilterOutcome {
        filtered: intersect_all(results.iter().map(|r| r.as_ref().ok())),
        errors: results.iter().map(|r| r.as_ref().err().cloned()).collect(),
    });
    live::distinct(combined.boxed())
}

/// Evaluate the system-authored clauses; any failure is forwarded
fn extra_filters(registry: &ProviderRegistry, filters: &[FilterParams]) -> Result<LiveResult<DocIdSet>, RuleError> {
    let clauses = filters
        .iter()
        .map(|params| {
            let provider = registry.filter_provider(&params.kind)?;
            Ok(live::distinct(provider.filter(params, registry)))
        })
        .collect::<Result<Vec<_>, RuleError>>()?;

    let combined = live::combine_latest_all(clauses).map(|results| -> Result<DocIdSet, RuleError> {
        let sets = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(intersect_all(sets.iter().map(Some)))
    });
    Ok(live::until_error(live::distinct(combined.boxed())))
}

/// Fold sets by intersection; a missing set (failed clause) empties the result
fn intersect_all<'a>(sets: impl IntoIterator<Item = Option<&'a DocIdSet>>) -> DocIdSet {
    let mut sets = sets.into_iter();
    let Some(Some(first)) = sets.next() else {
        return DocIdSet::new();
    };
    let mut acc = first.clone();
    for set in sets {
        match set {
            Some(set) => acc = acc.intersection(set),
            None => return DocIdSet::new(),
        }
    }
    acc
}

/// Trailing-edge throttle over merged results
///
/// Never releases a result equal to the one it released last.
struct Throttle {
    window: Duration,
    deadline: Option<Instant>,
    pending: Option<RuleResult>,
    last: Option<RuleResult>,
}

impl Throttle {
    fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: None,
            last: None,
        }
    }

    /// Accept a result; returns it straight back when throttling is disabled
    fn offer(&mut self, result: RuleResult) -> Option<RuleResult> {
        if self.window.is_zero() {
            return self.release(result);
        }
        self.pending = Some(result);
        if self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.window);
        }
        None
    }

    /// The window closed: emit the latest pending result and open a new window
    fn close_window(&mut self) -> Option<RuleResult> {
        match self.pending.take() {
            Some(result) => {
                self.deadline = Some(Instant::now() + self.window);
                self.release(result)
            }
            None => {
                self.deadline = None;
                None
            }
        }
    }

    fn flush(&mut self) -> Option<RuleResult> {
        self.deadline = None;
        let result = self.pending.take()?;
        self.release(result)
    }

    fn release(&mut self, result: RuleResult) -> Option<RuleResult> {
        if self.last.as_ref() == Some(&result) {
            return None;
        }
        self.last = Some(result.clone());
        Some(result)
    }
}

/// Per-subscription pipeline state
struct Pipeline {
    allow_list: DocIdSet,
    expects_extra: bool,
    expects_order: bool,
    expects_group: bool,
    items: LivePublisher<DocIdSet>,
    primary: Option<FilterOutcome>,
    extra: Option<DocIdSet>,
    matched: Option<DocIdSet>,
    ordered: Option<Vec<DocId>>,
    grouped: Option<GroupMap>,
}

impl Pipeline {
    async fn run(
        mut self,
        mut signals: SelectAll<LiveStream<Signal>>,
        mut throttle: Throttle,
        tx: mpsc::Sender<Result<RuleResult, RuleError>>,
    ) {
        loop {
            let wake = throttle.deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("Rule subscription dropped by consumer");
                    break;
                }
                signal = signals.next() => {
                    let Some(signal) = signal else {
                        // Every upstream ended; deliver the last state now
                        if let Some(result) = throttle.flush() {
                            let _ = tx.send(Ok(result)).await;
                        }
                        tracing::debug!("Rule subscription upstreams completed");
                        break;
                    };
                    if let Err(error) = self.apply_ready(signal, &mut signals) {
                        tracing::debug!(error = %error, "Rule subscription terminated");
                        let _ = tx.send(Err(error)).await;
                        break;
                    }
                    let ready = self.merged().and_then(|result| throttle.offer(result));
                    if let Some(result) = ready {
                        if tx.send(Ok(result)).await.is_err() {
                            break;
                        }
                    }
                }
                _ = sleep_until(wake), if throttle.deadline.is_some() => {
                    if let Some(result) = throttle.close_window() {
                        if tx.send(Ok(result)).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Fold a signal plus every signal already waiting behind it
    ///
    /// A matched-set change wakes the order and group stages synchronously,
    /// so their answers are ready before the next merge.
    fn apply_ready(
        &mut self,
        signal: Signal,
        signals: &mut SelectAll<LiveStream<Signal>>,
    ) -> Result<(), RuleError> {
        self.apply(signal)?;
        while let Some(Some(signal)) = signals.next().now_or_never() {
            self.apply(signal)?;
        }
        Ok(())
    }

    /// Fold one upstream signal into the state
    ///
    /// Extra-filter failures and unresolvable order or group dispatch are
    /// returned. Any other order or group failure degrades to no ordering
    /// and no grouping.
    fn apply(&mut self, signal: Signal) -> Result<(), RuleError> {
        match signal {
            Signal::Primary(outcome) => {
                self.primary = Some(outcome);
                self.refresh_matched();
            }
            Signal::Extra(result) => {
                self.extra = Some(result?);
                self.refresh_matched();
            }
            Signal::Ordered(Ok(ordered)) => self.ordered = Some(ordered),
            Signal::Ordered(Err(error @ RuleError::UnsupportedProvider { .. })) => return Err(error),
            Signal::Ordered(Err(error)) => {
                tracing::warn!(error = %error, "Order-by failed, falling back to unordered results");
                self.ordered = Some(Vec::new());
            }
            Signal::Grouped(Ok(grouped)) => self.grouped = Some(grouped),
            Signal::Grouped(Err(error @ RuleError::UnsupportedProvider { .. })) => return Err(error),
            Signal::Grouped(Err(error)) => {
                tracing::warn!(error = %error, "Group-by failed, falling back to ungrouped results");
                self.grouped = Some(GroupMap::new());
            }
        }
        Ok(())
    }

    fn refresh_matched(&mut self) {
        let Some(primary) = &self.primary else {
            return;
        };
        let mut matched = primary.filtered.union(&self.allow_list);
        if self.expects_extra {
            let Some(extra) = &self.extra else {
                return;
            };
            matched = matched.intersection(extra);
        }

        if self.items.publish(matched.clone()) {
            tracing::trace!(matched = matched.len(), "Matched set changed");
        }
        self.matched = Some(matched);
    }

    /// The merged result, once every expected stage has produced a value
    fn merged(&self) -> Option<RuleResult> {
        let primary = self.primary.as_ref()?;
        let matched = self.matched.as_ref()?;
        let ordered: &[DocId] = match self.expects_order {
            true => self.ordered.as_deref()?,
            false => &[],
        };
        let ungrouped = GroupMap::new();
        let grouped = match self.expects_group {
            true => self.grouped.as_ref()?,
            false => &ungrouped,
        };

        Some(RuleResult {
            groups: merge_groups(grouped, ordered, matched),
            filter_errors: primary.errors.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProviderFamily;
    use crate::core::params::{GroupByParams, OrderByParams};
    use crate::core::provider::{FilterProvider, GroupByProvider, LiveItems, OrderByProvider};
    use std::sync::Arc;

    /// Filter whose result is fixed at construction
    struct StaticFilter(Result<DocIdSet, RuleError>);

    impl FilterProvider for StaticFilter {
        fn filter(&self, _params: &FilterParams, _registry: &ProviderRegistry) -> LiveResult<DocIdSet> {
            live::once(self.0.clone())
        }
    }

    /// Orders items by a fixed ranking, or fails
    struct StaticOrder(Result<Vec<&'static str>, RuleError>);

    impl OrderByProvider for StaticOrder {
        fn order_by(&self, items: LiveItems, _params: &OrderByParams, _registry: &ProviderRegistry) -> LiveResult<Vec<DocId>> {
            let ranking = self.0.clone();
            items
                .subscribe()
                .map(move |items| -> Result<Vec<DocId>, RuleError> {
                    let ranking = ranking.clone()?;
                    Ok(ranking
                        .iter()
                        .filter(|id| items.contains(id))
                        .map(|id| id.to_string())
                        .collect())
                })
                .take(1)
                .boxed()
        }
    }

    /// Groups by id parity of the trailing digit, or fails
    struct ParityGroup(bool);

    impl GroupByProvider for ParityGroup {
        fn group_by(&self, items: LiveItems, _params: &GroupByParams, _registry: &ProviderRegistry) -> LiveResult<GroupMap> {
            let fail = self.0;
            items
                .subscribe()
                .map(move |items| -> Result<GroupMap, RuleError> {
                    if fail {
                        return Err(RuleError::UnknownProperty("gone".to_string()));
                    }
                    let mut groups = GroupMap::new();
                    for id in &items {
                        let even = id.ends_with(['0', '2', '4', '6', '8']);
                        let key = if even { "even" } else { "odd" };
                        groups.entry(key.to_string()).or_default().insert(id.clone());
                    }
                    Ok(groups)
                })
                .take(1)
                .boxed()
        }
    }

    fn service(builder: crate::core::registry::RegistryBuilder) -> CollectionRulesService {
        CollectionRulesService::new(builder.build(), EngineConfig::default())
    }

    fn set(ids: &[&str]) -> DocIdSet {
        ids.iter().copied().collect()
    }

    fn fixed(ids: &[&str]) -> Arc<StaticFilter> {
        Arc::new(StaticFilter(Ok(set(ids))))
    }

    fn clause(kind: &str) -> FilterParams {
        FilterParams::new(kind, "key", "is")
    }

    #[tokio::test]
    async fn test_no_filters_match_nothing() {
        let svc = service(ProviderRegistry::builder().filter("a", fixed(&["d1"])));
        let result = svc.compute(WatchOptions::new(vec![])).await.unwrap();
        assert!(result.groups.is_empty());
        assert!(result.filter_errors.is_empty());
    }

    #[tokio::test]
    async fn test_no_filters_still_admit_allow_list() {
        let svc = service(ProviderRegistry::builder());
        let options = WatchOptions::new(vec![]).with_allow_list(["d7"]);
        let result = svc.compute(options).await.unwrap();
        assert_eq!(result.all_items().collect::<Vec<_>>(), vec!["d7"]);
    }

    #[tokio::test]
    async fn test_clauses_intersect() {
        let svc = service(
            ProviderRegistry::builder()
                .filter("a", fixed(&["d1", "d2", "d3"]))
                .filter("b", fixed(&["d2", "d3", "d4"])),
        );
        let result = svc
            .compute(WatchOptions::new(vec![clause("a"), clause("b")]))
            .await
            .unwrap();
        assert_eq!(result.all_items().collect::<Vec<_>>(), vec!["d2", "d3"]);
        assert_eq!(result.filter_errors, vec![None, None]);
    }

    #[tokio::test]
    async fn test_failing_clause_is_isolated() {
        let svc = service(ProviderRegistry::builder().filter("a", fixed(&["d1"])));
        let result = svc
            .compute(WatchOptions::new(vec![clause("a"), clause("missing")]))
            .await
            .unwrap();

        assert!(result.groups.is_empty());
        assert_eq!(result.filter_errors[0], None);
        assert_eq!(
            result.filter_errors[1],
            Some(RuleError::unsupported(ProviderFamily::Filter, "missing"))
        );
    }

    #[tokio::test]
    async fn test_extra_filters_apply_after_allow_list() {
        let svc = service(
            ProviderRegistry::builder()
                .filter("a", fixed(&["d1", "d2"]))
                .filter("x", fixed(&["d2", "d9"])),
        );
        let options = WatchOptions::new(vec![clause("a")])
            .with_allow_list(["d9", "d5"])
            .with_extra_filters(vec![clause("x")]);

        let result = svc.compute(options).await.unwrap();
        assert_eq!(result.all_items().collect::<Vec<_>>(), vec!["d2", "d9"]);
    }

    #[tokio::test]
    async fn test_unknown_extra_filter_fails_watch() {
        let svc = service(ProviderRegistry::builder().filter("a", fixed(&["d1"])));
        let options = WatchOptions::new(vec![clause("a")]).with_extra_filters(vec![clause("nope")]);
        assert_eq!(
            svc.watch(options).err(),
            Some(RuleError::unsupported(ProviderFamily::Filter, "nope"))
        );
    }

    #[tokio::test]
    async fn test_extra_filter_runtime_error_ends_stream() {
        let broken = Arc::new(StaticFilter(Err(RuleError::invalid_value("x", None, "bad"))));
        let svc = service(
            ProviderRegistry::builder()
                .filter("a", fixed(&["d1"]))
                .filter("x", broken),
        );
        let options = WatchOptions::new(vec![clause("a")]).with_extra_filters(vec![clause("x")]);

        let mut stream = svc.watch(options).unwrap();
        assert!(matches!(stream.next().await, Some(Err(RuleError::InvalidValue { .. }))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_group_and_order_providers_fail_watch() {
        let svc = service(ProviderRegistry::builder().filter("a", fixed(&["d1"])));

        let grouped = WatchOptions::new(vec![clause("a")]).with_group_by(GroupByParams::new("nope", "k"));
        assert!(matches!(
            svc.watch(grouped).err(),
            Some(RuleError::UnsupportedProvider { family: ProviderFamily::GroupBy, .. })
        ));

        let ordered = WatchOptions::new(vec![clause("a")]).with_order_by(OrderByParams::new("nope", "k"));
        assert!(matches!(
            svc.watch(ordered).err(),
            Some(RuleError::UnsupportedProvider { family: ProviderFamily::OrderBy, .. })
        ));
    }

    #[tokio::test]
    async fn test_order_and_group_compose() {
        let svc = service(
            ProviderRegistry::builder()
                .filter("a", fixed(&["d1", "d2", "d3", "d4"]))
                .order_by("rank", Arc::new(StaticOrder(Ok(vec!["d4", "d3", "d2", "d1"]))))
                .group_by("parity", Arc::new(ParityGroup(false))),
        );
        let options = WatchOptions::new(vec![clause("a")])
            .with_order_by(OrderByParams::new("rank", "k"))
            .with_group_by(GroupByParams::new("parity", "k"));

        let result = svc.compute(options).await.unwrap();
        assert_eq!(result.groups[0].key, "even");
        assert_eq!(result.groups[0].items, vec!["d4", "d2"]);
        assert_eq!(result.groups[1].key, "odd");
        assert_eq!(result.groups[1].items, vec!["d3", "d1"]);
    }

    #[tokio::test]
    async fn test_order_and_group_failures_degrade() {
        let svc = service(
            ProviderRegistry::builder()
                .filter("a", fixed(&["d1", "d2"]))
                .order_by("rank", Arc::new(StaticOrder(Err(RuleError::UnknownProperty("p".into())))))
                .group_by("parity", Arc::new(ParityGroup(true))),
        );
        let options = WatchOptions::new(vec![clause("a")])
            .with_order_by(OrderByParams::new("rank", "k"))
            .with_group_by(GroupByParams::new("parity", "k"));

        let result = svc.compute(options).await.unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].key, "");
        assert_eq!(result.groups[0].items, vec!["d1", "d2"]);
        assert_eq!(result.filter_errors, vec![None]);
    }

    #[test]
    fn test_intersect_all_fails_closed() {
        let a = set(&["d1", "d2"]);
        let b = set(&["d2"]);
        assert_eq!(intersect_all([Some(&a), Some(&b)]), set(&["d2"]));
        assert_eq!(intersect_all([Some(&a), None]), DocIdSet::new());
        assert_eq!(intersect_all([None, Some(&a)]), DocIdSet::new());
        assert_eq!(intersect_all(std::iter::empty()), DocIdSet::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_emits_latest_after_window() {
        let mut throttle = Throttle::new(Duration::from_millis(300));
        let first = RuleResult::default();
        let mut second = RuleResult::default();
        second.filter_errors.push(None);

        assert!(throttle.offer(first).is_none());
        assert!(throttle.offer(second.clone()).is_none());
        let deadline = throttle.deadline.unwrap();

        tokio::time::sleep_until(deadline).await;
        assert_eq!(throttle.close_window(), Some(second));
        // A fresh window opened; closing it empty ends throttling
        assert!(throttle.deadline.is_some());
        assert_eq!(throttle.close_window(), None);
        assert!(throttle.deadline.is_none());
    }

    #[test]
    fn test_zero_window_passes_through() {
        let mut throttle = Throttle::new(Duration::ZERO);
        assert_eq!(throttle.offer(RuleResult::default()), Some(RuleResult::default()));
        assert!(throttle.deadline.is_none());
    }

    #[test]
    fn test_repeated_result_is_not_released_twice() {
        let mut throttle = Throttle::new(Duration::ZERO);
        assert!(throttle.offer(RuleResult::default()).is_some());
        assert!(throttle.offer(RuleResult::default()).is_none());
    }
}
