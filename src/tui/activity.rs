//! Activity log — recent actions and their outcomes, newest last.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub message: String,
    pub kind: ActivityKind,
}

/// Bounded log shown beside the nutrition facts.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), ActivityKind::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ActivityKind::Error);
    }

    fn push(&mut self, message: String, kind: ActivityKind) {
        self.entries.push(ActivityEntry { message, kind });
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    /// The last `n` entries.
    pub fn recent(&self, n: usize) -> &[ActivityEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(50)
    }
}
