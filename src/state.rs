//! Shared state handed to request handlers

use crate::service::CalendarService;

/// Application state cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub calendar: CalendarService,
}

impl AppState {
    pub fn new(calendar: CalendarService) -> Self {
        Self { calendar }
    }
}
