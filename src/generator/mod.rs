//! nginx configuration generator and control loop.
//!
//! # Data Flow
//! ```text
//! update_config(watchers):
//!     watchers
//!     → cache.rs (reuse stanzas when the revision is unchanged)
//!     → stanza builders (server + upstream on a miss)
//!     → assemble.rs (base contexts + http {} / stream {})
//!     → writer.rs (diff against disk, atomic write, check command)
//!     → resilience::restart (rate-limited reload when the write was accepted)
//!
//! tick():
//!     → virtual clock += 1
//!     → start nginx once, retry a deferred reload
//! ```
//!
//! # Design Decisions
//! - One generator owns all control-loop state; nothing is global
//! - Single-threaded and non-reentrant: callers serialize `tick` and `update_config`
//! - Configuration errors are returned; process failures are logged and absorbed

pub mod assemble;
pub mod cache;
pub mod writer;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::{validate_config, GeneratorConfig, ValidationError};
use crate::lifecycle::{CommandRunner, ShellRunner};
use crate::resilience::{RestartLimiter, RestartOutcome, RestartState};
use crate::stanza::{generate_server, generate_upstream};
use crate::watcher::{Mode, UnknownMode, WatcherView};

pub use assemble::{generate_base_config, timestamp_now};
pub use cache::{CacheEntry, RevisionCache};
pub use writer::ConfigWriter;

/// Errors that abort construction or generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid generator configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("Service {service}: {source}")]
    UnknownMode {
        service: String,
        #[source]
        source: UnknownMode,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Server and upstream fragments of one watcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stanzas {
    pub server: Vec<String>,
    pub upstream: Vec<String>,
}

/// Generates, writes and applies nginx configuration for a set of watchers.
pub struct NginxGenerator<C: CommandRunner = ShellRunner> {
    config: GeneratorConfig,
    cache: RevisionCache<Stanzas>,
    writer: Option<ConfigWriter>,
    restarter: Option<RestartLimiter>,
    runner: C,
    rng: StdRng,
}

impl NginxGenerator<ShellRunner> {
    /// Create a generator that runs commands through the shell.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        Self::with_runner(config, ShellRunner)
    }
}

impl<C: CommandRunner> NginxGenerator<C> {
    /// Create a generator with a custom command runner.
    pub fn with_runner(config: GeneratorConfig, runner: C) -> Result<Self, GenerateError> {
        validate_config(&config).map_err(GenerateError::InvalidConfig)?;

        let writer = match (config.do_writes, &config.config_file_path, &config.check_command) {
            (true, Some(path), Some(check)) => Some(ConfigWriter::new(path, check)),
            _ => None,
        };

        let restarter = match (config.do_reloads, &config.start_command, &config.reload_command) {
            (true, Some(start), Some(reload)) => Some(RestartLimiter::new(
                config.restart_interval,
                config.restart_jitter,
                start,
                reload,
            )),
            _ => None,
        };

        tracing::info!(
            do_writes = config.do_writes,
            do_reloads = config.do_reloads,
            restart_interval = config.restart_interval,
            restart_jitter = config.restart_jitter,
            "nginx generator configured"
        );

        Ok(Self {
            config,
            cache: RevisionCache::new(),
            writer,
            restarter,
            runner,
            rng: StdRng::from_entropy(),
        })
    }

    /// Seed every random source (upstream shuffling and restart jitter).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.restarter = self
            .restarter
            .map(|restarter| restarter.with_rng(StdRng::seed_from_u64(seed.wrapping_add(1))));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn runner(&self) -> &C {
        &self.runner
    }

    /// Restart bookkeeping, `None` when reloads are disabled.
    pub fn restart_state(&self) -> Option<&RestartState> {
        self.restarter.as_ref().map(RestartLimiter::state)
    }

    /// Cached stanzas for a watcher.
    pub fn cached(&self, watcher_name: &str) -> Option<&CacheEntry<Stanzas>> {
        self.cache.get(watcher_name)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Render the full document for `watchers`.
    pub fn generate_config(&mut self, watchers: &[WatcherView]) -> Result<String, GenerateError> {
        self.generate_config_at(watchers, &timestamp_now())
    }

    fn generate_config_at(
        &mut self,
        watchers: &[WatcherView],
        timestamp: &str,
    ) -> Result<String, GenerateError> {
        let mut document = generate_base_config(&self.config, timestamp);
        let mut http = Vec::new();
        let mut stream = Vec::new();
        let mut rendered = HashSet::new();

        let listen_address = self.config.listen_address.as_deref();
        let rng = &mut self.rng;

        for watcher in watchers {
            if watcher.config.disabled {
                continue;
            }

            let mode = watcher
                .config
                .mode()
                .map_err(|source| GenerateError::UnknownMode {
                    service: watcher.name.clone(),
                    source,
                })?;

            // nginx has no way to express a stream listener without upstream servers
            if mode == Mode::Tcp && watcher.backends.is_empty() {
                continue;
            }

            let section = match mode {
                Mode::Http => &mut http,
                Mode::Tcp => &mut stream,
            };

            let stanzas = self
                .cache
                .get_or_compute(&watcher.name, watcher.revision, || Stanzas {
                    server: generate_server(watcher, mode, listen_address),
                    upstream: generate_upstream(watcher, &mut *rng),
                });
            section.extend(stanzas.server.iter().cloned());
            section.extend(stanzas.upstream.iter().cloned());
            rendered.insert(watcher.name.as_str());
        }

        let evicted = self.cache.retain_names(&rendered);
        if evicted > 0 {
            tracing::debug!(evicted, "Dropped cached stanzas for departed services");
        }

        if !http.is_empty() {
            document.extend(assemble::wrap_context("http", self.config.context("http"), http));
        }
        if !stream.is_empty() {
            document.extend(assemble::wrap_context(
                "stream",
                self.config.context("stream"),
                stream,
            ));
        }

        tracing::debug!(lines = document.len(), "Generated new nginx config");
        let mut text = document.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Regenerate the document and, when writes are enabled, write it and
    /// reload nginx if it changed.
    ///
    /// Returns whether a new, checked document was written.
    pub fn update_config(&mut self, watchers: &[WatcherView]) -> Result<bool, GenerateError> {
        let document = self.generate_config(watchers)?;

        let Some(writer) = &self.writer else {
            return Ok(false);
        };

        let changed = writer.write(&document, &self.runner);
        if changed {
            if let Some(restarter) = self.restarter.as_mut() {
                restarter.request_restart();
                restarter.restart(&self.runner);
            }
        }
        Ok(changed)
    }

    /// Advance the virtual clock; starts nginx once and retries a reload
    /// that was rate limited earlier.
    pub fn tick(&mut self) -> Option<RestartOutcome> {
        let restarter = self.restarter.as_mut()?;
        restarter.tick(&self.runner)
    }
}
