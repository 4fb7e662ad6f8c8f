#![forbid(unsafe_code)]

//! Runtime: the timeline model and the request-list controller that turns
//! transport events into a laid-out waterfall.
//!
//! The controller is single-threaded. Callers feed it events, call
//! [`RequestListController::tick`] whenever the event loop is idle, and read
//! the layout back (or attach a [`WaterfallSurface`]).

pub mod filter;
pub mod request_list;
pub mod sort;
pub mod summary;
pub mod timeline_model;

pub use filter::Filter;
pub use request_list::{
    ControllerStats, RequestListController, RowLayout, SelectionHook, WaterfallLayout,
    WaterfallSurface,
};
pub use sort::{SortDirection, SortKey, SortOrder, SortPredicate, insertion_sort_by};
pub use summary::Summary;
pub use timeline_model::{TimelineBounds, TimelineModel};
