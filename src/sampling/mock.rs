//! In-memory fixtures for testing samplers without a real host.
//!
//! `MockFs` simulates the kernel pseudo-filesystems and `MockRunner` stands in
//! for external commands, recording every invocation so tests can assert
//! which sources were probed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::traits::{CommandOutput, CommandRunner, FileSystem};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, replacing any previous content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Adds a `/proc/net/dev` table with one row per `(interface, rx, tx)`.
    pub fn add_net_dev(&mut self, proc_path: &str, rows: &[(&str, u64, u64)]) {
        let mut content = String::from(
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n",
        );
        for (name, rx, tx) in rows {
            content.push_str(&format!(
                "{:>6}: {} 10 0 0 0 0 0 0 {} 10 0 0 0 0 0 0\n",
                name, rx, tx
            ));
        }
        self.add_file(format!("{}/net/dev", proc_path), content);
    }

    /// Adds sysfs statistics files for one interface.
    pub fn add_sysfs_stats(&mut self, sys_path: &str, interface: &str, rx: u64, tx: u64) {
        let base = format!("{}/class/net/{}/statistics", sys_path, interface);
        self.add_file(format!("{}/rx_bytes", base), format!("{}\n", rx));
        self.add_file(format!("{}/tx_bytes", base), format!("{}\n", tx));
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock file not found: {}", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|p| p.starts_with(path))
    }
}

/// Command runner returning canned output and recording invocations.
///
/// Clones share the same call log, so a test can keep one handle while the
/// sampler under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    outputs: HashMap<String, CommandOutput>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers successful output for `program`.
    pub fn add_output(&mut self, program: &str, stdout: impl Into<String>) {
        self.outputs.insert(
            program.to_string(),
            CommandOutput {
                success: true,
                stdout: stdout.into(),
            },
        );
    }

    /// Registers a non-zero exit for `program`.
    pub fn add_failure(&mut self, program: &str) {
        self.outputs.insert(
            program.to_string(),
            CommandOutput {
                success: false,
                stdout: String::new(),
            },
        );
    }

    /// Programs invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, _args: &[&str]) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(program.to_string());
        self.outputs.get(program).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock command not found: {}", program),
            )
        })
    }
}
