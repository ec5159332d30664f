use staffroll_lib::Range;

/// Accumulates the tick span that has to be repainted. Only ever grows until it's taken.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    span: Option<Range>,

    pad: i64,
    all_margin: i64,
    length: i64,
}

impl DirtyTracker {
    pub fn new(pad: i64, all_margin: i64) -> Self {
        Self {
            span: None,
            pad,
            all_margin,
            length: 0,
        }
    }

    /// Sets the timeline length [`mark_all`](Self::mark_all) covers.
    pub fn set_length(&mut self, length: i64) {
        self.length = length;
    }

    pub fn mark_dirty(&mut self, range: Range) {
        let padded = range.expand(self.pad);
        self.span = Some(match self.span {
            Some(span) => span.merge(padded),
            None => padded,
        });
    }

    pub fn mark_all(&mut self) {
        self.mark_dirty(Range::new(0, self.length).expand(self.all_margin - self.pad));
    }

    pub fn is_dirty(&self) -> bool {
        self.span.is_some()
    }
    pub fn span(&self) -> Option<Range> {
        self.span
    }

    /// The span to repaint, or `None` if nothing changed since the last call.
    pub fn take_and_clear(&mut self) -> Option<Range> {
        self.span.take()
    }
}
