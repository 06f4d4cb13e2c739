use std::sync::Arc;

use crate::resume::ResumeStore;
use crate::session::InterviewEngine;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single interview engine instance
    pub engine: Arc<InterviewEngine>,

    /// Resume document store
    pub resume: Arc<ResumeStore>,
}

impl AppState {
    pub fn new(engine: Arc<InterviewEngine>, resume: Arc<ResumeStore>) -> Self {
        Self { engine, resume }
    }
}
