//! Route rendering: a kubectl-style table and a tree graph over the same
//! resolved route

mod graph;
mod table;

use std::io;

use crate::types::Route;

/// Suffix appended to a backend service name that does not exist
pub(crate) const NOT_FOUND_MARKER: &str = " *Not found*";

/// Selects how a resolved route is rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Graph,
}

/// Render a resolved route to the given sink
pub fn render(route: &Route, format: OutputFormat, out: &mut impl io::Write) -> io::Result<()> {
    match format {
        OutputFormat::Table => table::render(route, out),
        OutputFormat::Graph => graph::render(route, out),
    }
}
