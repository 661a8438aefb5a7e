//! Draggable, resizable sidebar panels with persisted layouts.
//!
//! This crate is the generic core behind every panel in the sidebar. It owns
//! panel geometry and input handling, persistence of layouts and open flags,
//! cross-tab ownership leases, and cached polling of remote data. Concrete
//! widgets plug in through [`surface::PanelWidget`] and only render their own
//! content. The host (a browser page with feature `web`, or the native
//! `sidebar` binary) wires raw input and a single timer to
//! [`manager::PanelManager`] and [`schedule::PollScheduler`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`manager`] | Panel lifecycle, input routing, and the [`manager::PanelEvent`]s it emits |
//! | [`layout`] | Per-panel layout record, load/commit against the store |
//! | [`drag`] | Header drag gesture with noise threshold |
//! | [`resize`] | Corner resize gesture with threshold and debounced commit |
//! | [`bounds`] | Geometry types and the clamp functions |
//! | [`hit`] | Hit-testing a pointer against a panel's regions |
//! | [`input`] | Pointer buttons and the active gesture |
//! | [`surface`] | Traits a widget implements to render a panel |
//! | [`store`] | Namespaced JSON key/value store over pluggable backends |
//! | [`ownership`] | Advisory cross-tab ownership lease |
//! | [`poll`] | TTL cache with in-flight de-duplication and backoff |
//! | [`schedule`] | One scheduler driving every poll job |
//! | [`config`] | Tunable thresholds, loadable from the store |
//! | [`clock`] | Millisecond clocks, including a manual one for tests |
//! | [`consts`] | Default thresholds and timings |

pub mod bounds;
pub mod clock;
pub mod config;
pub mod consts;
pub mod drag;
pub mod hit;
pub mod input;
pub mod layout;
pub mod manager;
pub mod ownership;
pub mod poll;
pub mod resize;
pub mod schedule;
pub mod store;
pub mod surface;
