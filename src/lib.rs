//! # Spotpin
//!
//! The core of a collaborative map of street-speech spots. Volunteers
//! long-press the map to pin a location, attach photos, rate it, and browse
//! others' spots in a swipeable, zoomable lightbox.
//!
//! This crate holds everything below the rendering layer: touch gesture
//! interpretation, the lightbox and carousel state machines, image
//! compression, the photo ingestion list, and the create/update/delete flows
//! against pluggable object and record stores.
//!
//! # Data Flow
//!
//! ```text
//! picked files ─▶ compress_many ─▶ IngestPipeline ─▶ SubmissionPayload
//!                 (parallel, ordered)  (previews,        │ upload (ObjectStore)
//!                                       reorder, remove)  ▼
//!                                            SpotForm ─▶ SpotRecord ─▶ RecordStore
//!
//! touch events ─▶ GestureRecognizer ─▶ Lightbox ─▶ transform / index / events
//!                 LongPressDetector  ─▶ NewSpotRequest
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Points, vectors, distances, zoom-to-tap offsets, map projection seam |
//! | [`gesture`] | Touch events in, taps/pinch/pan/swipe/long-press out; explicit timers |
//! | [`carousel`] | Wrapping index with scroll-snap settling |
//! | [`lightbox`] | Full-screen viewer state machine: zoom, pan, navigation, close |
//! | [`imaging`] | Pure-Rust compression: identify, decode, fit, resize, JPEG encode |
//! | [`ingest`] | The form's ordered image list, preview handles, submission payload |
//! | [`spot`] | Spot records, the form and its validation, domain constants |
//! | [`store`] | Object and record storage traits with filesystem and memory impls |
//! | [`submit`] | Create, update and delete flows tying the above together |
//! | [`config`] | `spotpin.toml` loading, validation and merging |
//! | [`types`] | Shared in-memory file type |
//! | [`naming`] | Output names, upload name sanitising, object keys |
//! | [`picker`] | Reading picked files from disk, with the form's intake filter |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Host-Driven Time
//!
//! Nothing in the crate reads a clock for gesture timing. Touch events carry
//! their timestamp and timers are polled by the host, so every state machine
//! is deterministic under test.
//!
//! ## Ordered Parallel Compression
//!
//! Batches are compressed on rayon's pool, but results are collected in input
//! order and a failing file fails the whole batch. The form never shows a
//! partial or reordered batch.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling and JPEG encoding. No system libraries are needed.

pub mod carousel;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod imaging;
pub mod ingest;
pub mod lightbox;
pub mod naming;
pub mod output;
pub mod picker;
pub mod spot;
pub mod store;
pub mod submit;
pub mod types;
