//! Upstream stanzas.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::watcher::{Backend, BackendKey, UpstreamOrder, WatcherView};

/// Build the `upstream { ... }` block for a watcher.
///
/// Backends are de-duplicated by [`BackendKey`], the later backend winning.
/// Returns an empty fragment when no backends remain, since nginx rejects an
/// upstream without servers.
pub fn generate_upstream<R: Rng + ?Sized>(watcher: &WatcherView, rng: &mut R) -> Vec<String> {
    let config = &watcher.config;

    let mut backends: IndexMap<BackendKey, &Backend> = IndexMap::new();
    for backend in &watcher.backends {
        backends.insert(backend.key(), backend);
    }

    if backends.is_empty() {
        return Vec::new();
    }

    let mut keys: Vec<&BackendKey> = backends.keys().collect();
    match config.upstream_order {
        UpstreamOrder::Asc => keys.sort(),
        UpstreamOrder::Desc => keys.sort_by(|a, b| b.cmp(a)),
        UpstreamOrder::Shuffle => keys.shuffle(rng),
        UpstreamOrder::NoShuffle => {}
    }

    let mut stanza = Vec::with_capacity(keys.len() + config.upstream.len() + 2);
    stanza.push(format!("\tupstream {} {{", watcher.upstream_name()));
    stanza.extend(config.upstream.iter().map(|directive| format!("\t\t{directive};")));
    for key in keys {
        let backend = backends[key];
        let line = match config.server_options.as_deref() {
            Some(options) => format!("\t\tserver {} {};", backend.address(), options),
            None => format!("\t\tserver {};", backend.address()),
        };
        stanza.push(line);
    }
    stanza.push("\t}".to_string());
    stanza
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::WatcherConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn watcher(order: UpstreamOrder, backends: Vec<Backend>) -> WatcherView {
        let config = WatcherConfig {
            port: Some(8080),
            upstream_order: order,
            ..WatcherConfig::default()
        };
        WatcherView::new("web", 1, config).with_backends(backends)
    }

    fn backends() -> Vec<Backend> {
        vec![
            Backend::new("10.0.0.2", 3000),
            Backend::new("10.0.0.3", 3000),
            Backend::new("10.0.0.1", 3000),
        ]
    }

    fn server_lines(stanza: &[String]) -> Vec<&str> {
        stanza
            .iter()
            .filter(|line| line.starts_with("\t\tserver "))
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_empty_backends_no_block() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_upstream(&watcher(UpstreamOrder::Asc, vec![]), &mut rng).is_empty());
    }

    #[test]
    fn test_ascending_by_default() {
        let mut rng = StdRng::seed_from_u64(1);
        let stanza = generate_upstream(&watcher(UpstreamOrder::Asc, backends()), &mut rng);
        assert_eq!(
            stanza,
            vec![
                "\tupstream web {",
                "\t\tserver 10.0.0.1:3000;",
                "\t\tserver 10.0.0.2:3000;",
                "\t\tserver 10.0.0.3:3000;",
                "\t}",
            ]
        );
    }

    #[test]
    fn test_descending() {
        let mut rng = StdRng::seed_from_u64(1);
        let stanza = generate_upstream(&watcher(UpstreamOrder::Desc, backends()), &mut rng);
        assert_eq!(
            server_lines(&stanza),
            vec![
                "\t\tserver 10.0.0.3:3000;",
                "\t\tserver 10.0.0.2:3000;",
                "\t\tserver 10.0.0.1:3000;",
            ]
        );
    }

    #[test]
    fn test_no_shuffle_keeps_reported_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let stanza = generate_upstream(&watcher(UpstreamOrder::NoShuffle, backends()), &mut rng);
        assert_eq!(
            server_lines(&stanza),
            vec![
                "\t\tserver 10.0.0.2:3000;",
                "\t\tserver 10.0.0.3:3000;",
                "\t\tserver 10.0.0.1:3000;",
            ]
        );
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let stanza = generate_upstream(&watcher(UpstreamOrder::Shuffle, backends()), &mut rng);
        assert_eq!(stanza.first().map(String::as_str), Some("\tupstream web {"));
        assert_eq!(stanza.last().map(String::as_str), Some("\t}"));

        let mut lines = server_lines(&stanza);
        lines.sort_unstable();
        assert_eq!(
            lines,
            vec![
                "\t\tserver 10.0.0.1:3000;",
                "\t\tserver 10.0.0.2:3000;",
                "\t\tserver 10.0.0.3:3000;",
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let mut rng = StdRng::seed_from_u64(1);
        let view = watcher(
            UpstreamOrder::Asc,
            vec![Backend::new("10.0.0.1", 3000), Backend::new("10.0.0.1", 3000)],
        );
        let stanza = generate_upstream(&view, &mut rng);
        assert_eq!(server_lines(&stanza), vec!["\t\tserver 10.0.0.1:3000;"]);
    }

    #[test]
    fn test_named_backends_sort_by_name() {
        let mut rng = StdRng::seed_from_u64(1);
        let view = watcher(
            UpstreamOrder::Asc,
            vec![
                Backend::named("b", "10.0.0.1", 3000),
                Backend::named("a", "10.0.0.9", 3000),
            ],
        );
        let stanza = generate_upstream(&view, &mut rng);
        assert_eq!(
            server_lines(&stanza),
            vec!["\t\tserver 10.0.0.9:3000;", "\t\tserver 10.0.0.1:3000;"]
        );
    }

    #[test]
    fn test_directives_and_server_options() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut view = watcher(UpstreamOrder::Asc, vec![Backend::new("10.0.0.1", 3000)]);
        view.config.upstream = vec!["keepalive 16".into()];
        view.config.server_options = Some("max_fails=3".into());
        view.config.upstream_name = Some("pool".into());

        assert_eq!(
            generate_upstream(&view, &mut rng),
            vec![
                "\tupstream pool {",
                "\t\tkeepalive 16;",
                "\t\tserver 10.0.0.1:3000 max_fails=3;",
                "\t}",
            ]
        );
    }
}
