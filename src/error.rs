//! Module for managing directive failures as [`DirectiveError`]
//!
//! Every variant is fatal to the one block that raised it and recoverable for
//! the rest of the document: the directive converts each into an in-document
//! error node rather than letting it escape.
use core::fmt;
use std::{error, fmt::Debug};

/// Error enum covering every failure path of the `sqltable` directive
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectiveError {
    /// The directive block carried no query text
    MissingQuery,
    /// Neither the block nor the process-wide configuration supplied a
    /// connection string
    MissingConnectionString,
    /// Opening a connection for the resolved string failed
    ConnectionFailure {
        /// The connection string that could not be opened
        connection_string: String,
        /// The working directory at the time of the attempt
        cwd: String,
        /// The underlying client message
        message: String,
    },
    /// Executing the query failed after a connection was opened
    QueryExecutionFailure {
        /// The full newline-joined query text
        query: String,
        /// The underlying client message
        message: String,
    },
    /// Width or title resolution failed while assembling the table
    TableBuildFailure {
        /// The underlying message
        message: String,
    },
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuery => write!(f, "No query in sqltable directive"),
            Self::MissingConnectionString => write!(
                f,
                "No connection_string or sqltable_connection_string was specified for sqltable"
            ),
            Self::ConnectionFailure { connection_string, cwd, message } => write!(
                f,
                "Could not connect to {connection_string} for sqltable when in {cwd}: {message}"
            ),
            Self::QueryExecutionFailure { query, message } => {
                write!(f, "Error with query {query} for sqltable: {message}")
            }
            Self::TableBuildFailure { message } => {
                write!(f, "Error processing sqltable directive:\n{message}")
            }
        }
    }
}

impl error::Error for DirectiveError {}
