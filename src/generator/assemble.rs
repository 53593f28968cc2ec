//! Document assembly helpers.

use crate::config::GeneratorConfig;

/// Contexts rendered by the assembler itself rather than as plain blocks.
const SPECIAL_CONTEXTS: [&str; 3] = ["main", "http", "stream"];

/// Header placed on the first line of every generated document.
pub fn header_line(timestamp: &str) -> String {
    format!("# This config was generated at {timestamp}")
}

/// Current local time in the format used by the header line.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}

/// Header, top-level `main` directives, then every other plain context as
/// its own block in declaration order.
pub fn generate_base_config(config: &GeneratorConfig, timestamp: &str) -> Vec<String> {
    let mut lines = vec![header_line(timestamp)];
    lines.extend(config.context("main").iter().map(|directive| format!("{directive};")));

    for (name, directives) in &config.contexts {
        if SPECIAL_CONTEXTS.contains(&name.as_str()) {
            continue;
        }
        lines.push(format!("{name} {{"));
        lines.extend(directives.iter().map(|directive| format!("\t{directive};")));
        lines.push("}".to_string());
    }

    lines
}

/// Wrap already-indented stanzas in a `name { ... }` block, after the
/// context's own directives.
pub fn wrap_context(name: &str, directives: &[String], body: Vec<String>) -> Vec<String> {
    let mut lines = Vec::with_capacity(directives.len() + body.len() + 2);
    lines.push(format!("{name} {{"));
    lines.extend(directives.iter().map(|directive| format!("\t{directive};")));
    lines.extend(body);
    lines.push("}".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config
            .contexts
            .insert("main".into(), vec!["worker_processes 1".into(), "pid /run/nginx.pid".into()]);
        config.contexts.insert("http".into(), vec!["sendfile on".into()]);
        config
            .contexts
            .insert("events".into(), vec!["worker_connections 1024".into()]);
        config.contexts.insert("stream".into(), vec![]);
        config.contexts.insert("mail".into(), vec![]);
        config
    }

    #[test]
    fn test_base_config_layout() {
        assert_eq!(
            generate_base_config(&config(), "2026-01-01 00:00:00 +0000"),
            vec![
                "# This config was generated at 2026-01-01 00:00:00 +0000",
                "worker_processes 1;",
                "pid /run/nginx.pid;",
                "events {",
                "\tworker_connections 1024;",
                "}",
                "mail {",
                "}",
            ]
        );
    }

    #[test]
    fn test_wrap_context() {
        assert_eq!(
            wrap_context("http", &["sendfile on".to_string()], vec!["\tserver {".into(), "\t}".into()]),
            vec!["http {", "\tsendfile on;", "\tserver {", "\t}", "}"]
        );
    }

    #[test]
    fn test_timestamp_is_single_line() {
        let header = header_line(&timestamp_now());
        assert!(header.starts_with("# This config was generated at "));
        assert!(!header.contains('\n'));
    }
}
