//! Sampler that parses the output of an interface-listing command.

use super::parser::{parse_ip_link, parse_netstat_ib};
use super::traits::CommandRunner;
use super::{Sample, SampleError};

/// Which external command supplies the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// iproute2: `ip -s link show dev <iface>`.
    Ip,
    /// BSD netstat: `netstat -ibn -I <iface>`.
    Netstat,
}

impl CommandKind {
    pub fn program(self) -> &'static str {
        match self {
            CommandKind::Ip => "ip",
            CommandKind::Netstat => "netstat",
        }
    }

    fn args(self, interface: &str) -> Vec<&str> {
        match self {
            CommandKind::Ip => vec!["-s", "link", "show", "dev", interface],
            CommandKind::Netstat => vec!["-ibn", "-I", interface],
        }
    }
}

/// Runs an external command on every sample. The most expensive backend.
#[derive(Debug)]
pub struct CommandSampler<R: CommandRunner> {
    runner: R,
    kind: CommandKind,
}

impl<R: CommandRunner> CommandSampler<R> {
    pub fn new(runner: R, kind: CommandKind) -> Self {
        Self { runner, kind }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn get_sample(&self, interface: &str) -> Result<Sample, SampleError> {
        let program = self.kind.program();
        let output = self.runner.run(program, &self.kind.args(interface))?;
        if !output.success {
            return Err(SampleError::Command(format!(
                "{} exited with failure for {}",
                program, interface
            )));
        }

        let stats = match self.kind {
            CommandKind::Ip => {
                let stats = parse_ip_link(&output.stdout)?;
                if !stats.interface.is_empty() && stats.interface != interface {
                    return Err(SampleError::InterfaceNotFound(interface.to_string()));
                }
                stats
            }
            CommandKind::Netstat => parse_netstat_ib(&output.stdout, interface)?,
        };

        Ok(Sample::now(stats.rx_bytes, stats.tx_bytes))
    }
}
