//! The generic table structure handed to the host's rendering pipeline.
//!
//! A [`TableNode`] is host-agnostic: column-width hints, a header row, body
//! rows of text paragraphs, presentation classes, and an optional anchor.
//! Hosts lower it into their own table/row/entry node types.
use core::fmt;
use std::error;

/// A single cell's text block, mirroring the host's paragraph node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Paragraph {
    text: String,
}

impl Paragraph {
    /// Creates a new [`Paragraph`] from any text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Getter for the cell text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The table produced from one query result.
///
/// Invariant: the header length, the number of width hints, and the length of
/// every body row all equal the column count. A zero-column result yields an
/// empty header and zero width hints.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableNode {
    widths: Vec<u32>,
    header: Vec<Paragraph>,
    rows: Vec<Vec<Paragraph>>,
    classes: Vec<String>,
    anchor: Option<String>,
}

impl TableNode {
    /// Creates a new [`TableNode`] from a query result's columns and rows.
    ///
    /// Every cell is wrapped as a [`Paragraph`]; an empty value stays an
    /// empty paragraph, never an omitted cell.
    ///
    /// # Parameters
    /// - `columns`: the ordered column names forming the header row
    /// - `rows`: one entry per body row, each with one cell per column
    /// - `widths`: one width hint per column
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>, widths: Vec<u32>) -> Self {
        let header = columns.into_iter().map(Paragraph::new).collect();
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Paragraph::new).collect())
            .collect();
        Self { widths, header, rows, classes: Vec::new(), anchor: None }
    }

    /// Returns the column count.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.header.len()
    }

    /// Getter for the per-column width hints
    #[must_use]
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Getter for the header cells
    #[must_use]
    pub fn header(&self) -> &[Paragraph] {
        &self.header
    }

    /// Getter for the body rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<Paragraph>] {
        &self.rows
    }

    /// Getter for the presentation classes
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Getter for the anchor name, if one was requested
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Appends presentation class names to the table.
    pub fn add_classes(&mut self, classes: &[String]) {
        self.classes.extend(classes.iter().cloned());
    }

    /// Sets the anchor name applied to the table.
    pub fn set_anchor(&mut self, anchor: impl Into<String>) {
        self.anchor = Some(anchor.into());
    }
}

impl fmt::Display for TableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<&str> = self.header.iter().map(Paragraph::text).collect();
        writeln!(f, "{}", header.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(Paragraph::text).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

/// Error for an explicit `widths` list that does not match the column count
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WidthCountMismatch {
    /// The number of columns the query produced
    pub expected: usize,
    /// The number of widths the option supplied
    pub got: usize,
}

impl fmt::Display for WidthCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"widths\" option requires one value per column ({} columns, {} widths given)",
            self.expected, self.got
        )
    }
}

impl error::Error for WidthCountMismatch {}

/// Resolves the effective per-column widths for `max_cols` columns.
///
/// An explicit list is used as-is when its length matches the column count;
/// when no list is given each column receives an equal share of 100. Zero
/// columns yield zero hints.
///
/// # Errors
/// Returns [`WidthCountMismatch`] when an explicit list has the wrong length.
pub fn column_widths(
    explicit: Option<&[u32]>,
    max_cols: usize,
) -> Result<Vec<u32>, WidthCountMismatch> {
    match explicit {
        Some(widths) if widths.len() == max_cols => Ok(widths.to_vec()),
        Some(widths) => Err(WidthCountMismatch { expected: max_cols, got: widths.len() }),
        None if max_cols == 0 => Ok(Vec::new()),
        None => Ok(vec![(100 / max_cols) as u32; max_cols]),
    }
}
