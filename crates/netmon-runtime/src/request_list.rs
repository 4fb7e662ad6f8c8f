#![forbid(unsafe_code)]

//! Request list controller: owns the records, batches updates, and lays out
//! the waterfall.
//!
//! New requests are appended immediately. Field updates are queued and merged
//! in one batch once the `update-requests` quiescence window elapses; only
//! then is the list re-sorted, re-filtered, and re-laid out. Viewport resizes
//! are batched separately under `resize-events`, so neither stream can starve
//! the other.
//!
//! # Usage
//!
//! ```ignore
//! use netmon_runtime::RequestListController;
//! use netmon_core::{NetworkEvent, WaterfallConfig};
//!
//! let mut list = RequestListController::new(WaterfallConfig::default(), 800.0);
//! for packet in transport {
//!     list.handle_event(NetworkEvent::from_json(&packet)?);
//! }
//! // From the event loop, whenever it is idle:
//! list.tick();
//! println!("{}", list.summary_text());
//! ```
//!
//! # Invariants
//!
//! 1. **Deferred ordering**: `add` never sorts or filters. Sort and filter
//!    are applied on each batch flush, and when they are changed.
//! 2. **Unknown targets**: queued patches whose request was removed are
//!    dropped at flush time without error.
//! 3. **Commutative flushes**: the update flush and the resize flush both end
//!    in the same bounds-to-layout recomputation, so they may run in either
//!    order.
//! 4. **Single background writer**: only [`RequestListController`] drives the
//!    [`TickRasterizer`]; the background is redrawn on a resize flush or a
//!    direction change, never on a data flush.
//! 5. After [`destroy`](RequestListController::destroy) every input is
//!    ignored.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Update for removed id | Dropped, `trace!` |
//! | Duplicate request id | Ignored, `debug!` |
//! | Zero-width viewport | Scale from a zero width; blank background |
//! | No selectable tick step | No labels, blank background |

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use netmon_core::config::WaterfallConfig;
use netmon_core::event_coalescer::{CoalesceKey, KeyedCoalescer};
use netmon_core::format::format_size_kb;
use netmon_core::ingest::{NetworkEvent, RequestCreated};
use netmon_core::mime::display_type;
use netmon_core::record::{RequestId, RequestRecord};
use netmon_core::update::{AppliedEffect, UpdatePatch};
use netmon_core::url_info::UrlCache;
use netmon_render::{
    Direction, DivisionLabel, RowTransforms, Scale, TickImage, TickPolicy, TickRasterizer,
    TimingsBreakdown, WaterfallSegment, available_width, compute_scale_with, division_labels,
};
use tracing::{debug, debug_span, trace};

use crate::filter::Filter;
use crate::sort::{SortDirection, SortKey, SortOrder, insertion_sort_by};
use crate::summary::Summary;
use crate::timeline_model::{TimelineBounds, TimelineModel};

/// Receives layouts and summaries as they change.
pub trait WaterfallSurface {
    /// Draw every visible row over the shared tick background.
    fn present(&mut self, layout: &WaterfallLayout, background: &TickImage);

    /// The footer summary changed.
    fn summary_changed(&mut self, _summary: &Summary) {}
}

/// Called with the selected record, or `None` when the selection clears.
pub type SelectionHook = Box<dyn FnMut(Option<&RequestRecord>)>;

/// Geometry for one visible row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub id: RequestId,
    pub started_delta_millis: i64,
    pub transforms: RowTransforms,
    /// Phase boxes, once event timings have arrived.
    pub segment: Option<WaterfallSegment>,
    /// Type column, e.g. `"js"`. Empty until a MIME type arrives.
    pub type_text: String,
    /// Size column, e.g. `"1.50 KB"`, once the content size is known.
    pub size_text: Option<String>,
}

/// Everything needed to draw the waterfall column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaterfallLayout {
    pub scale: Scale,
    pub available_width: f64,
    pub direction: Direction,
    pub labels: Vec<DivisionLabel>,
    /// Width of the tick background; the full waterfall width.
    pub background_width: u32,
    /// Redraw counter of the background this layout was built against.
    pub background_generation: u64,
    pub rows: Vec<RowLayout>,
}

impl WaterfallLayout {
    pub fn row(&self, id: &RequestId) -> Option<&RowLayout> {
        self.rows.iter().find(|r| &r.id == id)
    }
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub requests_added: u64,
    pub update_flushes: u64,
    pub patches_applied: u64,
    pub patches_dropped: u64,
    /// Scheduled flushes replaced by a later schedule under the same key.
    pub flushes_coalesced: u64,
    pub resizes_applied: u64,
    pub relayouts: u64,
}

/// Owns the request list and drives the waterfall.
pub struct RequestListController {
    config: WaterfallConfig,
    model: TimelineModel,
    /// Every record in display order.
    order: Vec<RequestId>,
    /// `order` filtered by the active filter.
    visible: Vec<RequestId>,
    segments: HashMap<RequestId, WaterfallSegment>,
    queue: Vec<(RequestId, UpdatePatch)>,
    coalescer: KeyedCoalescer<CoalesceKey, ()>,
    filter: Filter,
    sort: Option<SortOrder>,
    urls: UrlCache,
    rasterizer: TickRasterizer,
    header_policy: TickPolicy,
    direction: Direction,
    waterfall_width: f64,
    pending_width: Option<f64>,
    selected: Option<RequestId>,
    on_selection: Option<SelectionHook>,
    surface: Option<Box<dyn WaterfallSurface>>,
    summary: Summary,
    layout: WaterfallLayout,
    destroyed: bool,
    stats: ControllerStats,
}

impl fmt::Debug for RequestListController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestListController")
            .field("len", &self.model.len())
            .field("visible", &self.visible.len())
            .field("queued", &self.queue.len())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("direction", &self.direction)
            .field("waterfall_width", &self.waterfall_width)
            .field("selected", &self.selected)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl RequestListController {
    /// Create a controller for a waterfall column `waterfall_width` pixels wide.
    pub fn new(config: WaterfallConfig, waterfall_width: f64) -> Self {
        debug!(config = %config.to_json(), waterfall_width, "request list created");
        Self {
            rasterizer: TickRasterizer::from_config(&config),
            header_policy: TickPolicy::header(&config),
            config,
            model: TimelineModel::new(),
            order: Vec::new(),
            visible: Vec::new(),
            segments: HashMap::new(),
            queue: Vec::new(),
            coalescer: KeyedCoalescer::new(),
            filter: Filter::All,
            sort: None,
            urls: UrlCache::new(),
            direction: Direction::Ltr,
            waterfall_width,
            pending_width: None,
            selected: None,
            on_selection: None,
            surface: None,
            summary: Summary::default(),
            layout: WaterfallLayout::default(),
            destroyed: false,
            stats: ControllerStats::default(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Attach a surface that receives every layout.
    #[must_use]
    pub fn with_surface(mut self, surface: Box<dyn WaterfallSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Register the selection hook.
    #[must_use]
    pub fn on_selection<F>(mut self, hook: F) -> Self
    where
        F: FnMut(Option<&RequestRecord>) + 'static,
    {
        self.on_selection = Some(Box::new(hook));
        self
    }

    #[inline]
    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    // --- Input ---

    /// Route one transport event.
    pub fn handle_event(&mut self, event: NetworkEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Route one transport event at a specific time (for testing).
    pub fn handle_event_at(&mut self, event: NetworkEvent, now: Instant) {
        match event {
            NetworkEvent::Created(created) => {
                self.add(created);
            }
            NetworkEvent::Updated { id, patch } => self.apply_update_at(id, patch, now),
        }
    }

    /// Register and append a new request.
    ///
    /// The start time also counts as a provisional end. The record is not
    /// sorted or filtered until the next flush. Returns `false` for a
    /// duplicate id or after [`destroy`](Self::destroy).
    pub fn add(&mut self, created: RequestCreated) -> bool {
        if self.destroyed {
            trace!(id = %created.id, "request after destroy ignored");
            return false;
        }
        let Some(record) = self.model.insert(created) else {
            return false;
        };
        let id = record.id.clone();
        self.order.push(id.clone());
        self.visible.push(id);
        self.stats.requests_added += 1;
        self.refresh_summary();
        true
    }

    /// Queue a field patch for `id`.
    pub fn apply_update(&mut self, id: RequestId, patch: UpdatePatch) {
        self.apply_update_at(id, patch, Instant::now());
    }

    /// Queue a field patch at a specific time (for testing).
    ///
    /// With lazy updates the `update-requests` flush is (re)scheduled;
    /// otherwise the queue is flushed right away.
    pub fn apply_update_at(&mut self, id: RequestId, patch: UpdatePatch, now: Instant) {
        if self.destroyed {
            trace!(%id, "update after destroy ignored");
            return;
        }
        self.queue.push((id, patch));
        if self.config.lazy_updates {
            self.schedule(CoalesceKey::UpdateRequests, self.config.update_delay(), now);
        } else {
            self.flush_updates();
        }
    }

    /// Remove a request and recompute the bounds from the survivors.
    pub fn remove(&mut self, id: &RequestId) -> Option<RequestRecord> {
        let record = self.model.remove(id)?;
        self.order.retain(|r| r != id);
        self.visible.retain(|r| r != id);
        self.segments.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.notify_selection();
        }
        debug!(%id, remaining = self.model.len(), "request removed");
        self.refresh_summary();
        self.relayout();
        Some(record)
    }

    /// The viewport width changed; applied after the resize window.
    pub fn on_viewport_resize(&mut self, width: f64) {
        self.on_viewport_resize_at(width, Instant::now());
    }

    /// Record a viewport width at a specific time (for testing).
    pub fn on_viewport_resize_at(&mut self, width: f64, now: Instant) {
        if self.destroyed {
            return;
        }
        self.pending_width = Some(width);
        self.schedule(CoalesceKey::ResizeEvents, self.config.resize_delay(), now);
    }

    fn schedule(&mut self, key: CoalesceKey, delay: Duration, now: Instant) {
        if self.coalescer.schedule_at(key, delay, (), now) {
            self.stats.flushes_coalesced += 1;
            trace!(key = key.as_str(), "pending flush superseded");
        }
    }

    // --- Flushing ---

    /// Run every coalesced flush whose window has elapsed.
    pub fn tick(&mut self) -> usize {
        self.tick_at(Instant::now())
    }

    /// Run due flushes at a specific time (for testing). Returns how many ran.
    pub fn tick_at(&mut self, now: Instant) -> usize {
        let due = self.coalescer.poll_at(now);
        for (key, ()) in &due {
            match key {
                CoalesceKey::UpdateRequests => self.flush_updates(),
                CoalesceKey::ResizeEvents => self.flush_resize(),
            }
        }
        due.len()
    }

    /// Time until the next scheduled flush is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.coalescer.time_until_next(now)
    }

    /// Whether a flush is scheduled under `key`.
    pub fn is_pending(&self, key: CoalesceKey) -> bool {
        self.coalescer.is_pending(&key)
    }

    /// Merge every queued patch, then re-sort, re-filter, and re-lay out.
    pub fn flush_updates(&mut self) {
        self.coalescer.cancel(&CoalesceKey::UpdateRequests);
        let queue = std::mem::take(&mut self.queue);
        let _span = debug_span!("flush_updates", patches = queue.len()).entered();

        for (id, patch) in queue {
            let Some(record) = self.model.get_mut(&id) else {
                trace!(%id, fields = patch.len(), "update for unknown request dropped");
                self.stats.patches_dropped += 1;
                continue;
            };
            let mut ended = None;
            for update in patch.updates() {
                match record.apply(update) {
                    AppliedEffect::EndChanged(end) => ended = Some(end),
                    AppliedEffect::TimingsChanged => {
                        if let Some(timings) = record.event_timings.as_ref() {
                            self.segments
                                .insert(id.clone(), WaterfallSegment::build(timings));
                        }
                    }
                    AppliedEffect::RowChanged | AppliedEffect::DetailsOnly => {}
                }
            }
            if let Some(end) = ended {
                self.model.register_end(end);
            }
            self.stats.patches_applied += 1;
            if self.selected.as_ref() == Some(&id) {
                self.notify_selection();
            }
        }

        self.stats.update_flushes += 1;
        self.sort_contents();
        self.filter_contents();
        self.refresh_summary();
        self.relayout();
    }

    /// Apply the latest viewport width and redraw the background.
    pub fn flush_resize(&mut self) {
        self.coalescer.cancel(&CoalesceKey::ResizeEvents);
        if let Some(width) = self.pending_width.take() {
            self.waterfall_width = width;
        }
        self.rasterizer.invalidate();
        self.stats.resizes_applied += 1;
        debug!(width = self.waterfall_width, "viewport resize applied");
        self.relayout();
    }

    // --- Sort and filter ---

    /// Show only requests matching `filter`.
    pub fn set_filter(&mut self, filter: Filter) {
        debug!(?filter, "filter changed");
        self.filter = filter;
        self.filter_contents();
        self.refresh_summary();
        self.relayout();
    }

    #[inline]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Sort by a column.
    ///
    /// Choosing the active column again flips the direction; a new column
    /// starts ascending. Returns the direction now in effect.
    pub fn set_sort(&mut self, key: SortKey) -> SortDirection {
        let direction = match &self.sort {
            Some(SortOrder::ByKey {
                key: active,
                direction,
            }) if *active == key => direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortOrder::ByKey { key, direction });
        debug!(key = key.as_str(), ?direction, "sort changed");
        self.resort();
        direction
    }

    /// Sort with a caller-supplied strict greater-than predicate.
    pub fn set_sort_with<F>(&mut self, predicate: F, direction: SortDirection)
    where
        F: Fn(&RequestRecord, &RequestRecord) -> bool + 'static,
    {
        self.sort = Some(SortOrder::Custom {
            predicate: Box::new(predicate),
            direction,
        });
        self.resort();
    }

    #[inline]
    pub fn sort_order(&self) -> Option<&SortOrder> {
        self.sort.as_ref()
    }

    fn resort(&mut self) {
        self.sort_contents();
        self.filter_contents();
        self.relayout();
    }

    fn sort_contents(&mut self) {
        let Some(sort) = self.sort.as_ref() else {
            return;
        };
        let model = &self.model;
        let urls = &mut self.urls;
        insertion_sort_by(&mut self.order, |a, b| match (model.get(a), model.get(b)) {
            (Some(a), Some(b)) => sort.should_swap(a, b, urls),
            _ => false,
        });
    }

    fn filter_contents(&mut self) {
        let model = &self.model;
        let filter = &self.filter;
        self.visible = self
            .order
            .iter()
            .filter(|id| model.get(id).is_some_and(|r| filter.matches(r)))
            .cloned()
            .collect();
    }

    fn refresh_summary(&mut self) {
        let model = &self.model;
        self.summary = Summary::compute(self.visible.iter().filter_map(|id| model.get(id)));
        if let Some(surface) = self.surface.as_mut() {
            surface.summary_changed(&self.summary);
        }
    }

    // --- Layout ---

    /// Recompute scale, labels, background, and every row transform.
    fn relayout(&mut self) {
        let bounds = self.model.bounds();
        let available = available_width(self.waterfall_width, self.config.waterfall_safe_bounds_px);
        let scale =
            compute_scale_with(available, bounds.span_millis() as f64, self.config.min_scale);
        let labels = division_labels(available, scale, &self.header_policy, self.direction);
        let background_width = pixel_width(self.waterfall_width);
        self.rasterizer
            .background(background_width, scale, self.direction);

        let direction = self.direction;
        let size_decimals = self.config.content_size_decimals;
        let rows = self
            .visible
            .iter()
            .filter_map(|id| {
                let record = self.model.get(id)?;
                Some(RowLayout {
                    id: id.clone(),
                    started_delta_millis: record.started_delta_millis,
                    transforms: RowTransforms::compute(record.started_delta_millis, scale, direction),
                    segment: self.segments.get(id).cloned(),
                    type_text: display_type(record.mime_type.as_deref()).to_owned(),
                    size_text: record
                        .content_size
                        .map(|bytes| format_size_kb(bytes, size_decimals)),
                })
            })
            .collect();

        self.layout = WaterfallLayout {
            scale,
            available_width: available,
            direction,
            labels,
            background_width,
            background_generation: self.rasterizer.generation(),
            rows,
        };
        self.stats.relayouts += 1;
        trace!(
            scale = scale.px_per_ms(),
            available,
            rows = self.layout.rows.len(),
            "waterfall laid out"
        );

        if let (Some(surface), Some(background)) = (self.surface.as_mut(), self.rasterizer.cached())
        {
            surface.present(&self.layout, background);
        }
    }

    /// Switch layout direction. Redraws the background mirrored.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction == direction {
            return;
        }
        self.direction = direction;
        self.relayout();
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Width of the waterfall column currently laid out.
    #[inline]
    pub fn waterfall_width(&self) -> f64 {
        self.waterfall_width
    }

    // --- Selection ---

    /// Select a request. Returns `false` if the id is unknown.
    pub fn select(&mut self, id: &RequestId) -> bool {
        if !self.model.contains(id) {
            return false;
        }
        self.selected = Some(id.clone());
        self.notify_selection();
        true
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.notify_selection();
        }
    }

    #[inline]
    pub fn selected(&self) -> Option<&RequestRecord> {
        self.selected.as_ref().and_then(|id| self.model.get(id))
    }

    fn notify_selection(&mut self) {
        let Some(hook) = self.on_selection.as_mut() else {
            return;
        };
        hook(self.selected.as_ref().and_then(|id| self.model.get(id)));
    }

    // --- Lifecycle ---

    /// Forget every request and all pending work.
    pub fn reset(&mut self) {
        self.model.reset();
        self.order.clear();
        self.visible.clear();
        self.segments.clear();
        self.queue.clear();
        self.urls.clear();
        self.coalescer.clear();
        self.pending_width = None;
        self.rasterizer.invalidate();
        self.clear_selection();
        debug!(epoch = self.model.epoch(), "request list reset");
        self.refresh_summary();
        self.relayout();
    }

    /// Stop accepting input. Pending work is discarded.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.coalescer.clear();
        self.queue.clear();
        self.pending_width = None;
        debug!("request list destroyed");
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // --- Output ---

    #[inline]
    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn summary_text(&self) -> String {
        self.summary.text()
    }

    #[inline]
    pub fn layout(&self) -> &WaterfallLayout {
        &self.layout
    }

    /// The cached tick background, once a layout has run.
    pub fn background(&self) -> Option<&TickImage> {
        self.rasterizer.cached()
    }

    #[inline]
    pub fn bounds(&self) -> TimelineBounds {
        self.model.bounds()
    }

    #[inline]
    pub fn get(&self, id: &RequestId) -> Option<&RequestRecord> {
        self.model.get(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.model.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Every record in display order.
    pub fn records(&self) -> impl Iterator<Item = &RequestRecord> {
        self.order.iter().filter_map(|id| self.model.get(id))
    }

    /// Records passing the filter, in display order.
    pub fn visible_records(&self) -> impl Iterator<Item = &RequestRecord> {
        self.visible.iter().filter_map(|id| self.model.get(id))
    }

    /// Number of patches waiting for the next flush.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Phase breakdown for the details pane, once timings have arrived.
    pub fn timings_breakdown(&self, id: &RequestId, pane_width: f64) -> Option<TimingsBreakdown> {
        let record = self.model.get(id)?;
        let timings = record.event_timings.as_ref()?;
        let total = timings.total_time.or(record.total_time).unwrap_or(0);
        Some(TimingsBreakdown::compute(&timings.timings, total, pane_width))
    }

    /// Headers scope suffix for the details pane, e.g. `"0.312 KB"`.
    pub fn headers_size_text(&self, id: &RequestId) -> Option<String> {
        let bytes = self.model.get(id)?.headers_size?;
        Some(format_size_kb(bytes, self.config.headers_size_decimals))
    }

    #[inline]
    pub fn stats(&self) -> ControllerStats {
        self.stats
    }
}

/// Whole pixels for a width; zero for non-finite or negative widths.
fn pixel_width(width: f64) -> u32 {
    if width.is_finite() && width > 0.0 {
        width.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmon_core::record::{EventTimings, Phase, PhaseTimings};
    use netmon_core::update::RequestUpdate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> WaterfallConfig {
        WaterfallConfig::default()
    }

    fn created(id: &str, start: i64) -> RequestCreated {
        RequestCreated::new(id, start, "GET", format!("https://example.com/{id}"), false)
    }

    fn patch(update: RequestUpdate) -> UpdatePatch {
        UpdatePatch::new().with(update)
    }

    fn ids(list: &RequestListController) -> Vec<String> {
        list.visible_records()
            .map(|r| r.id.as_str().to_owned())
            .collect()
    }

    #[test]
    fn add_does_not_sort_or_relayout() {
        let mut list = RequestListController::new(config(), 500.0);
        list.set_sort(SortKey::Waterfall);
        list.add(created("late", 200));
        list.add(created("early", 100));
        assert_eq!(ids(&list), ["late", "early"]);
        assert!(list.layout().rows.is_empty());
        assert_eq!(list.summary().count, 2);
    }

    #[test]
    fn lazy_updates_flush_after_window() {
        let t0 = Instant::now();
        let mut list = RequestListController::new(config(), 500.0);
        list.add(created("a", 0));
        list.apply_update_at("a".into(), patch(RequestUpdate::Status("200".into())), t0);
        assert_eq!(list.queued(), 1);
        assert!(list.is_pending(CoalesceKey::UpdateRequests));

        assert_eq!(list.tick_at(t0 + Duration::from_millis(49)), 0);
        assert!(list.get(&"a".into()).unwrap().status.is_none());

        assert_eq!(list.tick_at(t0 + Duration::from_millis(50)), 1);
        assert_eq!(list.get(&"a".into()).unwrap().status.as_deref(), Some("200"));
        assert_eq!(list.queued(), 0);
    }

    #[test]
    fn burst_of_updates_restarts_window_and_flushes_once() {
        let t0 = Instant::now();
        let mut list = RequestListController::new(config(), 500.0);
        list.add(created("a", 0));
        for i in 0..5u64 {
            let now = t0 + Duration::from_millis(i * 20);
            list.apply_update_at("a".into(), patch(RequestUpdate::ContentSize(i)), now);
        }
        assert_eq!(list.tick_at(t0 + Duration::from_millis(100)), 0);
        assert_eq!(list.tick_at(t0 + Duration::from_millis(130)), 1);
        assert_eq!(list.stats().update_flushes, 1);
        assert_eq!(list.stats().patches_applied, 5);
        assert_eq!(list.stats().flushes_coalesced, 4);
        assert_eq!(list.get(&"a".into()).unwrap().content_size, Some(4));
    }

    #[test]
    fn eager_updates_flush_immediately() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.add(created("a", 0));
        list.apply_update("a".into(), patch(RequestUpdate::TotalTime(40)));
        assert_eq!(list.get(&"a".into()).unwrap().ended_millis, Some(40));
        assert_eq!(list.bounds().last_end, Some(40));
        assert_eq!(list.layout().rows.len(), 1);
    }

    #[test]
    fn removed_ids_are_dropped_and_live_ids_apply() {
        let mut list = RequestListController::new(config(), 500.0);
        list.add(created("gone", 0));
        list.add(created("live", 10));
        let now = Instant::now();
        list.apply_update_at("gone".into(), patch(RequestUpdate::Status("404".into())), now);
        list.apply_update_at("live".into(), patch(RequestUpdate::Status("200".into())), now);
        list.remove(&"gone".into());
        list.flush_updates();

        assert!(list.get(&"gone".into()).is_none());
        assert_eq!(list.get(&"live".into()).unwrap().status.as_deref(), Some("200"));
        assert_eq!(list.stats().patches_dropped, 1);
        assert_eq!(list.stats().patches_applied, 1);
    }

    #[test]
    fn rows_carry_type_and_size_columns() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.add(created("a", 0));
        list.add(created("b", 5));
        list.apply_update(
            "a".into(),
            UpdatePatch::new()
                .with(RequestUpdate::MimeType("application/x-javascript; charset=utf-8".into()))
                .with(RequestUpdate::ContentSize(1536)),
        );

        let a = list.layout().row(&"a".into()).unwrap();
        assert_eq!(a.type_text, "js");
        assert_eq!(a.size_text.as_deref(), Some("1.50 KB"));
        let b = list.layout().row(&"b".into()).unwrap();
        assert_eq!(b.type_text, "");
        assert_eq!(b.size_text, None);
    }

    #[test]
    fn size_columns_follow_configured_decimals() {
        let mut config = config().with_lazy_updates(false);
        config.content_size_decimals = 1;
        config.headers_size_decimals = 2;
        let mut list = RequestListController::new(config, 500.0);
        list.add(created("a", 0));
        assert_eq!(list.headers_size_text(&"a".into()), None);
        list.apply_update(
            "a".into(),
            UpdatePatch::new()
                .with(RequestUpdate::ContentSize(100))
                .with(RequestUpdate::HeadersSize(320)),
        );

        let row = list.layout().row(&"a".into()).unwrap();
        assert_eq!(row.size_text.as_deref(), Some("0.0 KB"));
        assert_eq!(list.headers_size_text(&"a".into()).as_deref(), Some("0.31 KB"));
        assert_eq!(list.headers_size_text(&"missing".into()), None);
    }

    #[test]
    fn headers_size_uses_three_decimals_by_default() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.add(created("a", 0));
        list.apply_update("a".into(), patch(RequestUpdate::HeadersSize(320)));
        assert_eq!(list.headers_size_text(&"a".into()).as_deref(), Some("0.312 KB"));
    }

    #[test]
    fn sort_toggles_on_same_key() {
        let mut list = RequestListController::new(config(), 500.0);
        assert_eq!(list.set_sort(SortKey::Method), SortDirection::Ascending);
        assert_eq!(list.set_sort(SortKey::Method), SortDirection::Descending);
        assert_eq!(list.set_sort(SortKey::Method), SortDirection::Ascending);
        assert_eq!(list.set_sort(SortKey::Size), SortDirection::Ascending);
    }

    #[test]
    fn flush_sorts_by_active_key() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.set_sort(SortKey::Size);
        for (id, size) in [("a", 30), ("b", 10), ("c", 20)] {
            list.add(created(id, 0));
            list.apply_update(id.into(), patch(RequestUpdate::ContentSize(size)));
        }
        assert_eq!(ids(&list), ["b", "c", "a"]);
        list.set_sort(SortKey::Size);
        assert_eq!(ids(&list), ["a", "c", "b"]);
    }

    #[test]
    fn custom_sort_predicate() {
        let mut list = RequestListController::new(config(), 500.0);
        list.add(created("bb", 0));
        list.add(created("a", 0));
        list.add(created("ccc", 0));
        list.set_sort_with(
            |a: &RequestRecord, b: &RequestRecord| a.id.as_str().len() > b.id.as_str().len(),
            SortDirection::Ascending,
        );
        assert_eq!(ids(&list), ["a", "bb", "ccc"]);
        assert!(list.sort_order().unwrap().key().is_none());
    }

    #[test]
    fn filter_hides_rows_and_updates_summary() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.add(created("page", 0));
        list.add(created("style", 5));
        list.apply_update("page".into(), patch(RequestUpdate::MimeType("text/html".into())));
        list.apply_update("style".into(), patch(RequestUpdate::MimeType("text/css".into())));

        list.set_filter(Filter::parse("css").unwrap());
        assert_eq!(ids(&list), ["style"]);
        assert_eq!(list.summary().count, 1);
        assert_eq!(list.layout().rows.len(), 1);
        assert_eq!(list.records().count(), 2);

        list.set_filter(Filter::All);
        assert_eq!(ids(&list), ["page", "style"]);
    }

    #[test]
    fn event_timings_build_segments() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 500.0);
        list.add(created("a", 0));
        let timings = EventTimings {
            timings: PhaseTimings::default()
                .with(Phase::Blocked, 3)
                .with(Phase::Wait, 20)
                .with(Phase::Receive, 5),
            total_time: Some(28),
        };
        list.apply_update("a".into(), patch(RequestUpdate::EventTimings(timings)));

        let row = list.layout().row(&"a".into()).unwrap();
        let segment = row.segment.as_ref().unwrap();
        assert_eq!(segment.start_cap, Some(Phase::Wait));
        assert_eq!(segment.end_cap, Some(Phase::Receive));

        let breakdown = list.timings_breakdown(&"a".into(), 280.0).unwrap();
        assert_eq!(breakdown.entry(Phase::Wait).unwrap().millis, 20);
        assert!(list.timings_breakdown(&"missing".into(), 280.0).is_none());
    }

    #[test]
    fn resize_is_coalesced_and_redraws_background() {
        let t0 = Instant::now();
        let mut list = RequestListController::new(config().with_lazy_updates(false), 400.0);
        list.add(created("a", 0));
        list.apply_update("a".into(), patch(RequestUpdate::TotalTime(100)));
        let first_generation = list.layout().background_generation;
        assert_eq!(list.layout().background_width, 400);

        list.on_viewport_resize_at(600.0, t0);
        list.on_viewport_resize_at(800.0, t0 + Duration::from_millis(30));
        assert_eq!(list.tick_at(t0 + Duration::from_millis(60)), 0);
        assert_eq!(list.tick_at(t0 + Duration::from_millis(80)), 1);

        assert_eq!(list.waterfall_width(), 800.0);
        assert_eq!(list.layout().background_width, 800);
        assert!(list.layout().background_generation > first_generation);
        assert_eq!(list.background().unwrap().width(), 800);
        assert_eq!(list.stats().resizes_applied, 1);
    }

    #[test]
    fn data_flush_reuses_background() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 400.0);
        list.add(created("a", 0));
        list.apply_update("a".into(), patch(RequestUpdate::TotalTime(100)));
        let generation = list.layout().background_generation;
        list.apply_update("a".into(), patch(RequestUpdate::TotalTime(10_000)));
        assert_eq!(list.layout().background_generation, generation);
        assert!(list.layout().scale < Scale::MAX);
    }

    #[test]
    fn direction_change_mirrors_rows() {
        let mut list = RequestListController::new(config().with_lazy_updates(false), 400.0);
        list.add(created("a", 0));
        list.add(created("b", 50));
        list.flush_updates();
        let ltr = list.layout().row(&"b".into()).unwrap().transforms.timings;
        list.set_direction(Direction::Rtl);
        let rtl = list.layout().row(&"b".into()).unwrap().transforms.timings;
        assert_eq!(ltr.translate_x, 50.0);
        assert_eq!(rtl.translate_x, -50.0);
        assert_eq!(list.layout().direction, Direction::Rtl);
    }

    #[test]
    fn selection_hook_sees_updates_and_removal() {
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut list = RequestListController::new(config().with_lazy_updates(false), 400.0)
            .on_selection(move |r| {
                sink.borrow_mut()
                    .push(r.and_then(|r| r.status.clone()));
            });
        list.add(created("a", 0));
        assert!(list.select(&"a".into()));
        list.apply_update("a".into(), patch(RequestUpdate::Status("304".into())));
        list.remove(&"a".into());
        assert!(!list.select(&"a".into()));
        assert_eq!(*seen.borrow(), [None, Some("304".to_owned()), None]);
        assert!(list.selected().is_none());
    }

    #[test]
    fn reset_clears_state() {
        let t0 = Instant::now();
        let mut list = RequestListController::new(config(), 400.0);
        list.add(created("a", 10));
        list.apply_update_at("a".into(), patch(RequestUpdate::TotalTime(5)), t0);
        list.reset();
        assert!(list.is_empty());
        assert_eq!(list.queued(), 0);
        assert_eq!(list.bounds(), TimelineBounds::UNSET);
        assert_eq!(list.time_until_next(t0), None);
        assert_eq!(list.summary_text(), "No requests");

        list.add(created("b", 900));
        assert_eq!(list.bounds().first_start, Some(900));
    }

    #[test]
    fn destroyed_controller_ignores_input() {
        let mut list = RequestListController::new(config(), 400.0);
        list.add(created("a", 0));
        list.destroy();
        list.apply_update("a".into(), patch(RequestUpdate::Status("200".into())));
        assert!(!list.add(created("b", 0)));
        list.on_viewport_resize(10.0);
        assert!(list.is_destroyed());
        assert_eq!(list.queued(), 0);
        assert_eq!(list.time_until_next(Instant::now()), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn narrow_viewport_has_no_labels() {
        let mut list = RequestListController::new(config(), 50.0);
        list.add(created("a", 0));
        list.flush_updates();
        assert_eq!(list.layout().available_width, 0.0);
        assert!(list.layout().labels.is_empty());
    }

    #[test]
    fn pixel_width_rounds_and_saturates() {
        assert_eq!(pixel_width(399.6), 400);
        assert_eq!(pixel_width(-3.0), 0);
        assert_eq!(pixel_width(f64::NAN), 0);
        assert_eq!(pixel_width(f64::INFINITY), 0);
    }

    #[derive(Default)]
    struct Recorder {
        frames: Rc<RefCell<Vec<(usize, u32)>>>,
        summaries: Rc<RefCell<Vec<usize>>>,
    }

    impl WaterfallSurface for Recorder {
        fn present(&mut self, layout: &WaterfallLayout, background: &TickImage) {
            self.frames
                .borrow_mut()
                .push((layout.rows.len(), background.width()));
        }

        fn summary_changed(&mut self, summary: &Summary) {
            self.summaries.borrow_mut().push(summary.count);
        }
    }

    #[test]
    fn surface_receives_layouts_and_summaries() {
        let recorder = Recorder::default();
        let frames = Rc::clone(&recorder.frames);
        let summaries = Rc::clone(&recorder.summaries);
        let mut list = RequestListController::new(config().with_lazy_updates(false), 300.0)
            .with_surface(Box::new(recorder));
        list.add(created("a", 0));
        list.apply_update("a".into(), patch(RequestUpdate::Status("200".into())));
        assert_eq!(*frames.borrow(), [(1, 300)]);
        assert_eq!(*summaries.borrow(), [1, 1]);
    }
}
