use std::ops::Range;

use regex::Regex;

use crate::blob::extract_blob;
use crate::error::{RewriteError, SpliceError};
use crate::scan::Scanner;

pub const DEFAULT_ATTRIBUTE: &str = "ILFuncAttribute";

/// Opens the executable part of a method body; the payload goes right before it.
pub const STACK_DIRECTIVE: &str = ".maxstack";

/// ildasm's closing line of a method body.
pub const BODY_END: &str = "} // end of method";

/// One `.custom instance void ...ILFuncAttribute::.ctor(string) = ( .. )` line and
/// the body of the method it is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Zero-based position among all markers of the text.
    pub index: usize,
    /// The whole attribute declaration, closing parenthesis included.
    pub span: Range<usize>,
    /// Raw attribute value.
    pub blob: Vec<u8>,
    /// From the stack-depth directive up to (not including) the body terminator.
    pub body: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct MarkerLocator {
    pattern: Regex,
}

impl MarkerLocator {
    pub fn new(attribute: &str) -> Result<Self, RewriteError> {
        let pattern = format!(
            r"\.custom\s+instance\s+void\s+.*?{}\s*::\s*\.ctor\s*\(\s*string\s*\)\s*=\s*",
            regex::escape(attribute)
        );
        let pattern = Regex::new(&pattern).map_err(|source| RewriteError::MarkerPattern {
            name: attribute.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Spans of the attribute declarations up to (not including) their argument list.
    pub fn heads<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.pattern.find_iter(text).map(|m| m.range())
    }

    /// Locate every marker and the method body it belongs to.
    ///
    /// Fails on the first marker whose argument list or body anchors cannot be found.
    pub fn locate(&self, text: &str) -> Result<Vec<Marker>, RewriteError> {
        self.heads(text)
            .enumerate()
            .map(|(index, head)| {
                resolve(text, index, head.clone()).map_err(|source| RewriteError::Marker {
                    occurrence: index,
                    offset: head.start,
                    source,
                })
            })
            .collect()
    }
}

impl Default for MarkerLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ATTRIBUTE).expect("default marker pattern is valid")
    }
}

fn resolve(text: &str, index: usize, head: Range<usize>) -> Result<Marker, SpliceError> {
    let blob = extract_blob(text, head.end)?;

    // ildasm may annotate the closing line; the body starts on a later line.
    let mut scanner = Scanner::new(text, blob.close);
    scanner.skip_line();

    let after = scanner.pos();

    // The enclosing method ends at the first terminator; the directive must come before it.
    let body_end = scanner.find(BODY_END).ok_or(SpliceError::StructuralMismatch {
        anchor: BODY_END,
        offset: after,
    })?;

    let body_start = Scanner::new(&text[..body_end], after)
        .find(STACK_DIRECTIVE)
        .ok_or(SpliceError::StructuralMismatch {
            anchor: STACK_DIRECTIVE,
            offset: after,
        })?;

    log::debug!(
        "marker #{index} at {}..{}, body {body_start}..{body_end}, {} blob bytes",
        head.start,
        blob.close + 1,
        blob.bytes.len()
    );

    Ok(Marker {
        index,
        span: head.start..blob.close + 1,
        blob: blob.bytes,
        body: body_start..body_end,
    })
}
