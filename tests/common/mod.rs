//! Shared utilities for integration tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

use nginx_sync::config::GeneratorConfig;
use nginx_sync::lifecycle::{CommandOutcome, CommandRunner};
use nginx_sync::watcher::{Backend, WatcherConfig};
use nginx_sync::WatcherView;

pub const CHECK: &str = "nginx -t";
pub const START: &str = "nginx";
pub const RELOAD: &str = "nginx -s reload";

/// Records every command and fails the ones it was told to fail.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: RefCell<Vec<String>>,
    failing: RefCell<HashSet<String>>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn fail(&self, command: &str) {
        self.failing.borrow_mut().insert(command.to_string());
    }

    pub fn succeed(&self, command: &str) {
        self.failing.borrow_mut().remove(command);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == command).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> CommandOutcome {
        self.calls.borrow_mut().push(command.to_string());
        if self.failing.borrow().contains(command) {
            CommandOutcome::failure(format!("{command} failed"))
        } else {
            CommandOutcome::success("")
        }
    }
}

/// Writes and reloads enabled, interval 2, no jitter.
pub fn generator_config(path: &Path) -> GeneratorConfig {
    let mut config = GeneratorConfig {
        config_file_path: Some(path.to_path_buf()),
        check_command: Some(CHECK.into()),
        start_command: Some(START.into()),
        reload_command: Some(RELOAD.into()),
        ..GeneratorConfig::default()
    };
    config
        .contexts
        .insert("main".into(), vec!["worker_processes 1".into()]);
    config
        .contexts
        .insert("events".into(), vec!["worker_connections 1024".into()]);
    config
}

#[allow(dead_code)]
pub fn http_watcher(name: &str, revision: u64, port: u16, backends: Vec<Backend>) -> WatcherView {
    let config = WatcherConfig {
        port: Some(port),
        ..WatcherConfig::default()
    };
    WatcherView::new(name, revision, config).with_backends(backends)
}

#[allow(dead_code)]
pub fn tcp_watcher(name: &str, revision: u64, port: u16, backends: Vec<Backend>) -> WatcherView {
    let config = WatcherConfig {
        mode: "tcp".into(),
        port: Some(port),
        ..WatcherConfig::default()
    };
    WatcherView::new(name, revision, config).with_backends(backends)
}
