//! Registration contract with the host document generator.
//!
//! On initialization the plugin registers one configuration value (the
//! process-wide default connection string) and one block-type handler. The
//! default is read back from the host and threaded into the handler at
//! registration time; the directive never consults ambient global state.
use tracing::info;

use crate::directive::SqlTableDirective;

/// Name of the configuration value holding the fallback connection string.
pub const CONNECTION_STRING_CONFIG: &str = "sqltable_connection_string";

/// Name of the registered block type.
pub const DIRECTIVE_NAME: &str = "sqltable";

/// Capability the host generator exposes for plugin registration.
pub trait DocumentHost {
    /// Registers a string configuration value with its default. A value the
    /// build environment already configured keeps its configured setting.
    fn add_config_value(&mut self, name: &str, default: &str);

    /// Returns the current setting of a configuration value.
    fn config_value(&self, name: &str) -> Option<String>;

    /// Registers a block-type handler under `name`.
    fn add_directive(&mut self, name: &str, directive: SqlTableDirective);
}

/// Registers the `sqltable` configuration value and directive handler.
pub fn setup<H: DocumentHost>(host: &mut H) {
    info!("initializing sqltable");
    host.add_config_value(CONNECTION_STRING_CONFIG, "");
    let default_connection_string =
        host.config_value(CONNECTION_STRING_CONFIG).unwrap_or_default();
    host.add_directive(DIRECTIVE_NAME, SqlTableDirective::sqlite(default_connection_string));
}
