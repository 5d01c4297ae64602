//! The `sqltable` directive handler.
//!
//! [`SqlTableDirective::run`] takes one [`DirectiveInvocation`] and produces
//! either a table node (optionally preceded by a title) or a single error
//! node. No failure escapes this boundary: every database, connectivity, or
//! assembly fault is downgraded to an in-document error marker carrying the
//! offending block's raw text and line number.
use std::env;

use tracing::info;

use crate::{
    engine::{SqlEngine, SqliteEngine},
    error::DirectiveError,
    invocation::{normalize_name, DirectiveInvocation},
    table::{column_widths, TableNode},
};

/// An in-document error marker shown in place of the intended table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorNode {
    message: String,
    block_text: String,
    line: u64,
}

impl ErrorNode {
    /// Creates a new [`ErrorNode`]
    ///
    /// # Parameters
    /// - `message`: the human-readable cause
    /// - `block_text`: the raw source text of the offending block
    /// - `line`: the source line number of the block
    pub fn new(message: impl Into<String>, block_text: impl Into<String>, line: u64) -> Self {
        Self { message: message.into(), block_text: block_text.into(), line }
    }

    /// Getter for the human-readable cause
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Getter for the raw block text
    #[must_use]
    pub fn block_text(&self) -> &str {
        &self.block_text
    }

    /// Getter for the source line number
    #[must_use]
    pub const fn line(&self) -> u64 {
        self.line
    }
}

/// One node of directive output, in document order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectiveNode {
    /// A title block preceding the table
    Title(String),
    /// The table built from the query result
    Table(TableNode),
    /// An error marker replacing the table
    Error(ErrorNode),
}

impl DirectiveNode {
    /// Returns the table if this node holds one.
    #[must_use]
    pub const fn as_table(&self) -> Option<&TableNode> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Returns the error marker if this node holds one.
    #[must_use]
    pub const fn as_error(&self) -> Option<&ErrorNode> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the title text if this node holds one.
    #[must_use]
    pub fn as_title(&self) -> Option<&str> {
        match self {
            Self::Title(title) => Some(title),
            _ => None,
        }
    }

    /// Lowers this node into the host's own representation.
    pub fn lower<B: NodeBuilder>(&self, builder: &mut B) -> B::Node {
        match self {
            Self::Title(title) => builder.title(title),
            Self::Table(table) => builder.table(table),
            Self::Error(error) => builder.error(error),
        }
    }
}

/// Capability the host implements to lower directive output into its own
/// document tree: build a table from headers, rows, width hints, classes,
/// and an optional anchor, or the title and error markers around it.
pub trait NodeBuilder {
    /// The host's node type
    type Node;

    /// Builds a title node.
    fn title(&mut self, text: &str) -> Self::Node;
    /// Builds a table node from the generic [`TableNode`].
    fn table(&mut self, table: &TableNode) -> Self::Node;
    /// Builds an error marker node.
    fn error(&mut self, error: &ErrorNode) -> Self::Node;
}

/// Lowers a directive output sequence into host nodes, preserving order.
pub fn lower_all<B: NodeBuilder>(nodes: &[DirectiveNode], builder: &mut B) -> Vec<B::Node> {
    nodes.iter().map(|node| node.lower(builder)).collect()
}

/// The directive handler: holds the process-wide default connection string
/// and the engine used to reach the database.
pub struct SqlTableDirective {
    default_connection_string: String,
    engine: Box<dyn SqlEngine>,
}

impl SqlTableDirective {
    /// Creates a new [`SqlTableDirective`]
    ///
    /// # Parameters
    /// - `default_connection_string`: the configured fallback used when a
    ///   block has no `connection_string` option (may be empty)
    /// - `engine`: the [`SqlEngine`] opening connections for this handler
    pub fn new(default_connection_string: impl Into<String>, engine: Box<dyn SqlEngine>) -> Self {
        Self { default_connection_string: default_connection_string.into(), engine }
    }

    /// Creates a handler backed by the shipped SQLite engine.
    pub fn sqlite(default_connection_string: impl Into<String>) -> Self {
        Self::new(default_connection_string, Box::new(SqliteEngine))
    }

    /// Processes one directive block.
    ///
    /// Returns the table (preceded by a title when one was given) on
    /// success, or exactly one [`ErrorNode`] on any failure. Never panics
    /// and never returns an error to the caller.
    #[must_use]
    pub fn run(&self, invocation: &DirectiveInvocation) -> Vec<DirectiveNode> {
        match self.try_run(invocation) {
            Ok(nodes) => nodes,
            Err(err) => vec![DirectiveNode::Error(ErrorNode::new(
                err.to_string(),
                invocation.block_text(),
                invocation.line(),
            ))],
        }
    }

    /// Resolves the connection string for one block: a non-empty per-block
    /// option wins, otherwise the configured default; `None` when neither
    /// yields a non-empty value.
    fn resolved_connection_string(&self, invocation: &DirectiveInvocation) -> Option<String> {
        let resolved = invocation
            .connection_string()
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.default_connection_string);
        if resolved.is_empty() {
            None
        } else {
            Some(resolved.to_owned())
        }
    }

    fn try_run(
        &self,
        invocation: &DirectiveInvocation,
    ) -> Result<Vec<DirectiveNode>, DirectiveError> {
        if !invocation.has_query() {
            return Err(DirectiveError::MissingQuery);
        }

        let connection_string = self
            .resolved_connection_string(invocation)
            .ok_or(DirectiveError::MissingConnectionString)?;

        info!("connecting to {connection_string}");
        let mut connection = self.engine.connect(&connection_string).map_err(|err| {
            DirectiveError::ConnectionFailure {
                connection_string: connection_string.clone(),
                cwd: current_dir_display(),
                message: err.message().to_owned(),
            }
        })?;

        let query = invocation.query_text();
        info!("running query {query:?}");
        let result = connection.run_query(&query).map_err(|err| {
            DirectiveError::QueryExecutionFailure {
                query: query.clone(),
                message: err.message().to_owned(),
            }
        })?;
        // One connection per block: released here on success, and by drop on
        // the error paths above.
        drop(connection);

        let widths = column_widths(invocation.widths(), result.column_count())
            .map_err(|err| DirectiveError::TableBuildFailure { message: err.to_string() })?;

        let columns = result.columns().to_vec();
        let mut table = TableNode::new(columns, result.into_rows(), widths);
        table.add_classes(invocation.classes());
        if let Some(name) = invocation.name() {
            table.set_anchor(normalize_name(name));
        }

        let mut nodes = Vec::with_capacity(2);
        if let Some(title) = invocation.title().filter(|t| !t.trim().is_empty()) {
            nodes.push(DirectiveNode::Title(title.to_owned()));
        }
        nodes.push(DirectiveNode::Table(table));
        Ok(nodes)
    }
}

fn current_dir_display() -> String {
    env::current_dir().map_or_else(|_| "<unknown>".to_owned(), |p| p.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use super::*;

    /// Creates a fresh SQLite database under the temp dir with a seeded
    /// `inventory` table and returns its directory and connection string.
    fn seeded_database(dir_name: &str) -> Result<(PathBuf, String), Box<dyn std::error::Error>> {
        let base = env::temp_dir().join(dir_name);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base)?;
        let db_path = base.join("docs.sqlite3");
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute_batch(
            "CREATE TABLE inventory (name TEXT, quantity INTEGER);
             INSERT INTO inventory VALUES ('bolt', 42), ('washer', NULL);",
        )?;
        Ok((base, db_path.to_string_lossy().into_owned()))
    }

    fn invocation_with_query(connection_string: &str) -> DirectiveInvocation {
        DirectiveInvocation::builder(".. sqltable::", 7)
            .connection_string(connection_string)
            .body(["SELECT name, quantity FROM inventory ORDER BY name"])
            .build()
    }

    #[test]
    fn test_empty_body_yields_missing_query_error() {
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable::", 3).build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let error = nodes[0].as_error().expect("expected an error node");
        assert_eq!(error.message(), "No query in sqltable directive");
        assert_eq!(error.block_text(), ".. sqltable::");
        assert_eq!(error.line(), 3);
    }

    #[test]
    fn test_blank_body_counts_as_missing_query() {
        let directive = SqlTableDirective::sqlite("");
        let invocation =
            DirectiveInvocation::builder(".. sqltable::", 3).body(["", "   "]).build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].as_error().is_some());
    }

    #[test]
    fn test_missing_connection_string_is_reported() {
        let directive = SqlTableDirective::sqlite("");
        let invocation =
            DirectiveInvocation::builder(".. sqltable::", 9).body(["SELECT 1"]).build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let error = nodes[0].as_error().expect("expected an error node");
        assert_eq!(
            error.message(),
            "No connection_string or sqltable_connection_string was specified for sqltable"
        );
        assert_eq!(error.line(), 9);
    }

    #[test]
    fn test_query_result_becomes_table() -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_table_test")?;
        let directive = SqlTableDirective::sqlite("");
        let nodes = directive.run(&invocation_with_query(&connection_string));
        assert_eq!(nodes.len(), 1);
        let table = nodes[0].as_table().expect("expected a table node");
        assert_eq!(table.cols(), 2);
        assert_eq!(table.header()[0].text(), "name");
        assert_eq!(table.header()[1].text(), "quantity");
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0][0].text(), "bolt");
        assert_eq!(table.rows()[0][1].text(), "42");
        assert_eq!(table.rows()[1][0].text(), "washer");
        assert_eq!(table.rows()[1][1].text(), "");
        assert_eq!(table.widths(), &[50, 50]);
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_title_precedes_table_and_options_attach()
    -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_title_test")?;
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable:: Inventory", 5)
            .title("Inventory levels")
            .widths(vec![30, 10])
            .classes(["data-table"])
            .name("Inventory Table")
            .connection_string(&connection_string)
            .body(["SELECT name, quantity FROM inventory ORDER BY name"])
            .build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].as_title(), Some("Inventory levels"));
        let table = nodes[1].as_table().expect("expected a table node");
        assert_eq!(table.widths(), &[30, 10]);
        assert_eq!(table.classes(), &["data-table".to_owned()]);
        assert_eq!(table.anchor(), Some("inventory-table"));
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_zero_row_query_yields_header_only_table()
    -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_zero_rows_test")?;
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable::", 7)
            .connection_string(&connection_string)
            .body(["SELECT name, quantity FROM inventory WHERE quantity > 1000"])
            .build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let table = nodes[0].as_table().expect("expected a table node");
        assert_eq!(table.cols(), 2);
        assert!(table.rows().is_empty());
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_unopenable_connection_string_yields_connection_error() {
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable::", 11)
            .connection_string("bogus://nohost")
            .body(["SELECT 1"])
            .build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let error = nodes[0].as_error().expect("expected an error node");
        assert!(error.message().starts_with("Could not connect to bogus://nohost"));
        assert_eq!(error.line(), 11);
    }

    #[test]
    fn test_invalid_query_yields_execution_error() -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_bad_query_test")?;
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable::", 13)
            .connection_string(&connection_string)
            .body(["SELEKT * FROM t"])
            .build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let error = nodes[0].as_error().expect("expected an error node");
        assert!(error.message().contains("SELEKT * FROM t"));
        assert!(error.message().starts_with("Error with query"));
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_width_count_mismatch_yields_build_error()
    -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_widths_test")?;
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable::", 17)
            .widths(vec![10, 20, 30])
            .connection_string(&connection_string)
            .body(["SELECT name, quantity FROM inventory"])
            .build();
        let nodes = directive.run(&invocation);
        assert_eq!(nodes.len(), 1);
        let error = nodes[0].as_error().expect("expected an error node");
        assert!(error.message().starts_with("Error processing sqltable directive:"));
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_default_connection_string_is_used_as_fallback()
    -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_default_cs_test")?;
        let directive = SqlTableDirective::sqlite(connection_string);
        let invocation = DirectiveInvocation::builder(".. sqltable::", 7)
            .body(["SELECT name FROM inventory ORDER BY name"])
            .build();
        let nodes = directive.run(&invocation);
        assert!(nodes[0].as_table().is_some());
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_block_option_overrides_default() -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_override_test")?;
        let directive = SqlTableDirective::sqlite("bogus://nohost");
        let nodes = directive.run(&invocation_with_query(&connection_string));
        assert!(nodes[0].as_table().is_some());
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    #[test]
    fn test_empty_block_option_falls_back_to_default()
    -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_empty_opt_test")?;
        let directive = SqlTableDirective::sqlite(connection_string);
        let invocation = DirectiveInvocation::builder(".. sqltable::", 7)
            .connection_string("")
            .body(["SELECT name FROM inventory"])
            .build();
        let nodes = directive.run(&invocation);
        assert!(nodes[0].as_table().is_some());
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }

    /// A minimal host that lowers nodes into plain strings.
    struct TextHost;

    impl NodeBuilder for TextHost {
        type Node = String;

        fn title(&mut self, text: &str) -> String {
            format!("title: {text}")
        }

        fn table(&mut self, table: &TableNode) -> String {
            format!("table: {} cols x {} rows", table.cols(), table.rows().len())
        }

        fn error(&mut self, error: &ErrorNode) -> String {
            format!("error at line {}: {}", error.line(), error.message())
        }
    }

    #[test]
    fn test_lowering_preserves_node_order() -> Result<(), Box<dyn std::error::Error>> {
        let (base, connection_string) = seeded_database("sqltable_directive_lowering_test")?;
        let directive = SqlTableDirective::sqlite("");
        let invocation = DirectiveInvocation::builder(".. sqltable:: Inventory", 5)
            .title("Inventory")
            .connection_string(&connection_string)
            .body(["SELECT name, quantity FROM inventory"])
            .build();
        let nodes = directive.run(&invocation);
        let lowered = lower_all(&nodes, &mut TextHost);
        assert_eq!(lowered, vec!["title: Inventory".to_owned(), "table: 2 cols x 2 rows".to_owned()]);
        let _ = fs::remove_dir_all(&base);
        Ok(())
    }
}
