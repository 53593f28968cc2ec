//! Server and proxy stanzas.

use crate::watcher::{Mode, WatcherView};

/// Bind address used when neither the watcher nor the generator names one.
pub const DEFAULT_LISTEN_ADDRESS: &str = "localhost";

/// Build the `server { ... }` block for a watcher.
///
/// Returns an empty fragment when the watcher has no port: such services only
/// get an upstream block and traffic is routed to it by hand.
pub fn generate_server(
    watcher: &WatcherView,
    mode: Mode,
    default_listen_address: Option<&str>,
) -> Vec<String> {
    let config = &watcher.config;
    let Some(port) = config.port else {
        tracing::debug!(
            service = %watcher.name,
            "Not generating server stanza, no port defined"
        );
        return Vec::new();
    };

    let listen_address = config
        .listen_address
        .as_deref()
        .or(default_listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    let listen = match config.listen_options.as_deref() {
        Some(options) => format!("\t\tlisten {listen_address}:{port} {options};"),
        None => format!("\t\tlisten {listen_address}:{port};"),
    };

    let mut stanza = Vec::with_capacity(config.server.len() + 6);
    stanza.push("\tserver {".to_string());
    stanza.push(listen);
    stanza.extend(config.server.iter().map(|directive| format!("\t\t{directive};")));
    stanza.extend(generate_proxy(
        mode,
        watcher.upstream_name(),
        watcher.backends.is_empty(),
    ));
    stanza.push("\t}".to_string());
    stanza
}

/// Build the clause forwarding traffic to an upstream.
///
/// An http service without backends answers `503` instead of pointing at an
/// upstream block that does not exist.
pub fn generate_proxy(mode: Mode, upstream_name: &str, empty_upstream: bool) -> Vec<String> {
    match mode {
        Mode::Http => {
            let target = if empty_upstream {
                "\t\t\treturn 503;".to_string()
            } else {
                format!("\t\t\tproxy_pass http://{upstream_name};")
            };
            vec!["\t\tlocation / {".to_string(), target, "\t\t}".to_string()]
        }
        Mode::Tcp => vec![format!("\t\tproxy_pass {upstream_name};")],
    }
}
