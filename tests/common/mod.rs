//! Common test infrastructure for svgpng integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;

use std::sync::Arc;
use svgpng::services::RecordingFeedback;
use svgpng::{BackendAvailability, RenderOptions, SvgToPngConverter};

/// Converter with an empty font database and recorded feedback
pub fn converter(availability: BackendAvailability) -> (SvgToPngConverter, Arc<RecordingFeedback>) {
    let feedback = Arc::new(RecordingFeedback::new());
    let converter = SvgToPngConverter::new(
        availability,
        RenderOptions::default(),
        Arc::new(fontdb::Database::new()),
        feedback.clone(),
    );
    (converter, feedback)
}
