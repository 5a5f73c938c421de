use super::text::collapse_whitespace;

/// Where a line scanner is in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SeekingStart,
    InSection,
    InUnit,
    Done,
}

/// A finished unit: the label it was started with and its normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit<L> {
    pub label: L,
    pub text: String,
}

/// Collects the physical lines of one unit until a boundary flushes it.
///
/// `L` carries whatever context the unit needs for its citation (chapter,
/// verse number, book), captured when the unit starts.
#[derive(Debug)]
pub struct Accumulator<L> {
    state: ScanState,
    label: Option<L>,
    lines: Vec<String>,
}

impl<L> Default for Accumulator<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Accumulator<L> {
    pub fn new() -> Self {
        Accumulator {
            state: ScanState::SeekingStart,
            label: None,
            lines: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Start marker found.
    pub fn begin(&mut self) {
        if self.state == ScanState::SeekingStart {
            self.state = ScanState::InSection;
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ScanState::InUnit
    }

    /// Flush the pending unit (if any) and stay in the current section.
    /// Units whose joined text is empty are dropped.
    pub fn close(&mut self) -> Option<Unit<L>> {
        if self.state != ScanState::InUnit {
            return None;
        }
        self.state = ScanState::InSection;
        let label = self.label.take()?;
        let text = collapse_whitespace(&std::mem::take(&mut self.lines).join(" "));
        if text.is_empty() {
            None
        } else {
            Some(Unit { label, text })
        }
    }

    /// Open a new unit, returning the one it replaces.
    pub fn start(&mut self, label: L, first_line: &str) -> Option<Unit<L>> {
        if self.state == ScanState::Done {
            return None;
        }
        let flushed = self.close();
        self.label = Some(label);
        self.lines.push(first_line.trim().to_string());
        self.state = ScanState::InUnit;
        flushed
    }

    /// Append a continuation line. Ignored outside a unit.
    pub fn append(&mut self, line: &str) -> bool {
        if self.state != ScanState::InUnit {
            return false;
        }
        self.lines.push(line.trim().to_string());
        true
    }

    /// End marker or end of input: final flush, nothing is accepted after.
    pub fn finish(&mut self) -> Option<Unit<L>> {
        let unit = self.close();
        self.state = ScanState::Done;
        unit
    }
}
