pub mod converter;
pub mod feedback;

pub use converter::SvgToPngConverter;
pub use feedback::{Feedback, FeedbackMessage, RecordingFeedback, Severity, TracingFeedback};
