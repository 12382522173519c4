use crate::error::{Result, SpliceError};
use crate::locate::Marker;

/// A text edit, positioned in coordinates of the original, unmodified buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Remove { start: usize, count: usize },
    Insert { start: usize, text: String },
}

impl Edit {
    pub fn start(&self) -> usize {
        match self {
            Edit::Remove { start, .. } | Edit::Insert { start, .. } => *start,
        }
    }
}

/// Edits pooled from every marker of one rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditList {
    edits: Vec<Edit>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn remove(&mut self, start: usize, count: usize) {
        self.push(Edit::Remove { start, count });
    }

    pub fn insert(&mut self, start: usize, text: impl Into<String>) {
        self.push(Edit::Insert {
            start,
            text: text.into(),
        });
    }

    /// Queue the three edits that replace a marked stub:
    /// drop the attribute, put `replacement` in front of the stack directive,
    /// drop the old body up to its terminator.
    pub fn splice(&mut self, marker: &Marker, replacement: &str, newline: &str) {
        self.remove(marker.span.start, marker.span.len());
        self.insert(marker.body.start, format!("{replacement}{newline}"));
        self.remove(marker.body.start, marker.body.len());
    }

    /// Edits in application order: by original start, ties in push order.
    pub fn ordered(&self) -> Vec<&Edit> {
        let mut order: Vec<&Edit> = self.edits.iter().collect();
        order.sort_by_key(|e| e.start());
        order
    }

    /// Build the edited text in one left-to-right pass over `original`.
    ///
    /// Untouched stretches are copied between edits. `fixup` tracks how far earlier
    /// edits have shifted the output, so each edit lands at `start + fixup`. That
    /// only holds while no edit starts inside text an earlier edit removed; such
    /// lists are rejected as a whole.
    pub fn apply(&self, original: &str) -> Result<String> {
        let mut out = String::with_capacity(original.len());
        let mut fixup: isize = 0;
        // Original text before this offset is already copied or removed.
        let mut copied = 0usize;

        for edit in self.ordered() {
            let start = edit.start();
            check_position(original, start)?;
            if start < copied {
                return Err(SpliceError::InvalidEdit {
                    start,
                    reason: "overlaps a removed range",
                });
            }

            out.push_str(&original[copied..start]);
            copied = start;
            let at = (start as isize + fixup) as usize;
            debug_assert_eq!(at, out.len());

            match edit {
                Edit::Remove { count, .. } => {
                    let end = start + count;
                    check_position(original, end)?;
                    copied = end;
                    fixup -= *count as isize;
                    log::trace!("remove {start}+{count} at {at}");
                }
                Edit::Insert { text, .. } => {
                    out.push_str(text);
                    fixup += text.len() as isize;
                    log::trace!("insert {} bytes at {at} (orig {start})", text.len());
                }
            }
        }

        out.push_str(&original[copied..]);
        Ok(out)
    }
}

impl FromIterator<Edit> for EditList {
    fn from_iter<I: IntoIterator<Item = Edit>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

fn check_position(original: &str, offset: usize) -> Result<()> {
    if offset > original.len() {
        return Err(SpliceError::InvalidEdit {
            start: offset,
            reason: "is past the end of the text",
        });
    }
    if !original.is_char_boundary(offset) {
        return Err(SpliceError::InvalidEdit {
            start: offset,
            reason: "splits a UTF-8 character",
        });
    }
    Ok(())
}
