pub mod locate;
pub mod parse;
pub mod strip;

pub use locate::locate;
pub use parse::parse;
pub use strip::strip;

/// One `<table>` element as found on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Position among the page's wikitables, in document order.
    pub index: usize,
    /// Outer HTML of the table element.
    pub html: String,
}

/// A [`RawTable`] with every footnote superscript removed from its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    pub index: usize,
    pub html: String,
}
