//! Progress reporting for long-running operations
//!
//! Reports are advisory: they let a presentation thread show a progress bar
//! but they never hand the model to anyone else. Every operation accepts
//! `Option<&mut dyn ProgressSink>` and works the same without a sink.

/// A single progress report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    pub action_text: String,
    pub item_type: String,
    pub current_item_count: usize,
    pub total_item_count: usize,
    /// `None` when the total is unknown
    pub percentage: Option<u8>,
    pub done: bool,
}

impl ProgressInfo {
    pub fn new(
        action_text: impl Into<String>,
        item_type: impl Into<String>,
        current_item_count: usize,
        total_item_count: usize,
    ) -> Self {
        let percentage = if total_item_count > 0 {
            let pct = current_item_count.min(total_item_count) * 100 / total_item_count;
            Some(pct as u8)
        } else {
            None
        };
        Self {
            action_text: action_text.into(),
            item_type: item_type.into(),
            current_item_count,
            total_item_count,
            percentage,
            done: total_item_count > 0 && current_item_count >= total_item_count,
        }
    }
}

/// Receiver of progress reports
pub trait ProgressSink {
    fn report(&mut self, info: &ProgressInfo);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressInfo),
{
    fn report(&mut self, info: &ProgressInfo) {
        self(info)
    }
}

/// Sink that drops every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _info: &ProgressInfo) {}
}

/// Report to an optional sink, only when the percentage moves
pub(crate) struct ProgressTracker<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
    action_text: &'static str,
    item_type: &'static str,
    total: usize,
    last_percentage: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(
        sink: Option<&'a mut dyn ProgressSink>,
        action_text: &'static str,
        item_type: &'static str,
        total: usize,
    ) -> Self {
        Self {
            sink,
            action_text,
            item_type,
            total,
            last_percentage: None,
        }
    }

    pub(crate) fn update(&mut self, current: usize) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let info = ProgressInfo::new(self.action_text, self.item_type, current, self.total);
        if info.percentage != self.last_percentage || info.done {
            self.last_percentage = info.percentage;
            sink.report(&info);
        }
    }
}
