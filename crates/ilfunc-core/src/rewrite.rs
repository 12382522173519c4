use std::ops::Range;

use crate::edit::EditList;
use crate::error::{RewriteError, SpliceError};
use crate::locate::{MarkerLocator, DEFAULT_ATTRIBUTE};
use crate::payload::decode_payload;

/// Line separator appended to each inserted payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Newline {
    /// What ildasm writes on Windows.
    #[default]
    CrLf,
    Lf,
    /// Reuse the first line break of the text, CRLF if it has none.
    Detect,
}

impl Newline {
    pub fn resolve(self, text: &str) -> &'static str {
        match self {
            Newline::CrLf => "\r\n",
            Newline::Lf => "\n",
            Newline::Detect => match text.find('\n') {
                Some(i) if i == 0 || text.as_bytes()[i - 1] != b'\r' => "\n",
                _ => "\r\n",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Type name of the marker attribute, as it appears in `.custom` lines.
    pub attribute: String,
    pub newline: Newline,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            newline: Newline::default(),
        }
    }
}

/// One resolved marker: where it was and what replaces the stub body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub index: usize,
    pub marker: Range<usize>,
    pub body: Range<usize>,
    pub replacement: String,
}

/// Every splice of a text and the pooled edits realizing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub splices: Vec<Splice>,
    pub edits: EditList,
}

impl Plan {
    pub fn apply(&self, text: &str) -> Result<String, RewriteError> {
        self.edits.apply(text).map_err(RewriteError::Apply)
    }
}

#[derive(Debug, Clone)]
pub struct Rewriter {
    locator: MarkerLocator,
    newline: Newline,
}

impl Rewriter {
    pub fn new(options: &RewriteOptions) -> Result<Self, RewriteError> {
        Ok(Self {
            locator: MarkerLocator::new(&options.attribute)?,
            newline: options.newline,
        })
    }

    /// Locate and decode every marker. Either all of them resolve or none is planned.
    pub fn plan(&self, text: &str) -> Result<Plan, RewriteError> {
        let newline = self.newline.resolve(text);
        let mut plan = Plan::default();
        // End of the furthest body claimed so far; markers arrive in text order.
        let mut claimed = 0usize;

        for marker in self.locator.locate(text)? {
            let located = |source| RewriteError::Marker {
                occurrence: marker.index,
                offset: marker.span.start,
                source,
            };
            if marker.span.start < claimed {
                return Err(located(SpliceError::InvalidEdit {
                    start: marker.span.start,
                    reason: "lies in a body replaced for an earlier marker",
                }));
            }
            claimed = marker.body.end;

            let replacement = decode_payload(&marker.blob).map_err(located)?;

            plan.edits.splice(&marker, &replacement, newline);
            plan.splices.push(Splice {
                index: marker.index,
                marker: marker.span,
                body: marker.body,
                replacement,
            });
        }

        log::debug!(
            "planned {} splices ({} edits)",
            plan.splices.len(),
            plan.edits.len()
        );
        Ok(plan)
    }

    pub fn rewrite(&self, text: &str) -> Result<String, RewriteError> {
        self.plan(text)?.apply(text)
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self {
            locator: MarkerLocator::default(),
            newline: Newline::default(),
        }
    }
}

/// Rewrite with the default marker attribute and CRLF line breaks.
pub fn rewrite_il(text: &str) -> Result<String, RewriteError> {
    Rewriter::default().rewrite(text)
}
