//! Notice presentation and button dispatch.

use std::sync::Arc;

mod actions;
mod presenter;

pub use actions::{ActionExtra, ActionOutcome, NoticeActionError, NoticeActions};
pub use presenter::{present, present_shared, NOTICE_TITLE};

/// Container for notice use cases.
pub struct NoticeUseCases {
    pub actions: Arc<NoticeActions>,
}

impl NoticeUseCases {
    pub fn new(actions: Arc<NoticeActions>) -> Self {
        Self { actions }
    }
}
