//! Presenter posture analysis for tracked body keypoints.
//!
//! This library classifies the posture of every tracked person in a video
//! stream from the body keypoints produced by an upstream pose detector and
//! tracker. It flags three habits that weaken a presentation:
//! - Arms folded across the body
//! - A hand touching the face
//! - Leaning or swaying, judged over a window of recent frames
//!
//! The pipeline for each frame is:
//! 1. Geometry extraction from the visible keypoints, once per detection
//! 2. Stateless arms-folded and touching-face classification
//! 3. Stateful leaning classification with per-track tilt history
//! 4. Aggregation into one annotation per track, plus session statistics
//! 5. Overlay layout for display
//!
//! # Examples
//!
//! ## Classifying a Stream
//!
//! ```no_run
//! use presenter_posture::{config::Config, io, pipeline::PosturePipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = PosturePipeline::new(Config::default())?;
//! let mut source = io::open_source("frames.jsonl")?;
//! let mut sink = io::open_sink("-")?;
//!
//! let frames = pipeline.run(&mut source, &mut sink)?;
//! println!("Processed {frames} frames");
//! # Ok(())
//! # }
//! ```
//!
//! ## Classifying Single Frames
//!
//! ```
//! use presenter_posture::{
//!     config::Config,
//!     frame::{BoundingBox, Detection, Frame},
//!     pipeline::PosturePipeline,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = PosturePipeline::new(Config::default())?;
//!
//! // A detection without keypoints cannot be judged, so every flag stays off
//! let detection = Detection::new(7, BoundingBox::new(0.0, 0.0, 100.0, 300.0), 0.9, Vec::new());
//! let report = pipeline.process_frame(&Frame::new(0, 0.0, vec![detection]));
//!
//! assert!(!report.annotations.annotations[&7].any());
//! # Ok(())
//! # }
//! ```
//!
//! ## Tracking Lean Over Time
//!
//! ```
//! use presenter_posture::{classifiers::LeaningClassifier, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut leaning = LeaningClassifier::new(&Config::default())?;
//!
//! // Torso tilt in degrees for track 3
//! let mut verdict = false;
//! for _ in 0..10 {
//!     verdict = leaning.observe(3, Some(25.0));
//! }
//! assert!(verdict);
//! # Ok(())
//! # }
//! ```

/// Input frame and detection types
pub mod frame;

/// Geometric features derived from keypoints
pub mod geometry;

/// Fixed-capacity window of angle samples and its statistics
pub mod window;

/// Smoothing filters for torso tilt
pub mod filters;

/// Posture classifiers
pub mod classifiers;

/// Merging classifier outputs into per-track annotations
pub mod aggregator;

/// Cumulative session statistics
pub mod stats;

/// Overlay text layout
pub mod overlay;

/// Frame rate measurement
pub mod fps;

/// Per-frame pipeline and stream collaborators
pub mod pipeline;

/// JSON Lines frame input and report output
pub mod io;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
