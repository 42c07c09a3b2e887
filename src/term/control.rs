//! Low-level terminal primitives behind a trait.
//!
//! `Tty` talks to the real controlling terminal through termios, `fcntl` and
//! the window-size ioctl. Tests substitute a recording double so guard
//! behaviour can be checked without a terminal attached.

use std::io;
use std::os::fd::AsFd;

use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::sys::termios::{LocalFlags, SetArg, tcgetattr, tcsetattr};

use super::TerminalError;

/// Terminal attribute access needed by the guards and the window.
pub trait TerminalControl {
    /// Current line-discipline local-mode flags.
    fn local_flags(&self) -> Result<LocalFlags, TerminalError>;

    /// Replaces the local-mode flags, leaving every other attribute as is.
    fn set_local_flags(&self, flags: LocalFlags) -> Result<(), TerminalError>;

    /// Current file-status flags of standard input.
    fn status_flags(&self) -> Result<OFlag, TerminalError>;

    /// Replaces the file-status flags of standard input.
    fn set_status_flags(&self, flags: OFlag) -> Result<(), TerminalError>;

    /// Window size as `(columns, rows)`.
    fn window_size(&self) -> Result<(u16, u16), TerminalError>;
}

/// The process's controlling terminal, addressed through standard input.
#[derive(Debug)]
pub struct Tty {
    stdin: io::Stdin,
}

impl Tty {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for Tty {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalControl for Tty {
    fn local_flags(&self) -> Result<LocalFlags, TerminalError> {
        Ok(tcgetattr(self.stdin.as_fd())?.local_flags)
    }

    fn set_local_flags(&self, flags: LocalFlags) -> Result<(), TerminalError> {
        let mut termios = tcgetattr(self.stdin.as_fd())?;
        termios.local_flags = flags;
        tcsetattr(self.stdin.as_fd(), SetArg::TCSANOW, &termios)?;
        Ok(())
    }

    fn status_flags(&self) -> Result<OFlag, TerminalError> {
        let bits = fcntl(self.stdin.as_fd(), FcntlArg::F_GETFL)?;
        Ok(OFlag::from_bits_truncate(bits))
    }

    fn set_status_flags(&self, flags: OFlag) -> Result<(), TerminalError> {
        fcntl(self.stdin.as_fd(), FcntlArg::F_SETFL(flags))?;
        Ok(())
    }

    fn window_size(&self) -> Result<(u16, u16), TerminalError> {
        Ok(crossterm::terminal::size()?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use nix::fcntl::OFlag;
    use nix::sys::termios::LocalFlags;

    use super::TerminalControl;
    use crate::term::TerminalError;

    /// One call made against [`RecordingControl`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        GetLocal,
        SetLocal(LocalFlags),
        GetStatus,
        SetStatus(OFlag),
        WindowSize,
    }

    #[derive(Debug)]
    struct State {
        local: LocalFlags,
        status: OFlag,
        size: (u16, u16),
        calls: Vec<Call>,
    }

    /// In-memory terminal that records every attribute access.
    #[derive(Debug)]
    pub struct RecordingControl {
        state: RefCell<State>,
    }

    impl RecordingControl {
        pub fn new(local: LocalFlags, status: OFlag, size: (u16, u16)) -> Self {
            Self {
                state: RefCell::new(State {
                    local,
                    status,
                    size,
                    calls: Vec::new(),
                }),
            }
        }

        /// A cooked-mode, blocking 80x24 terminal.
        pub fn typical() -> Self {
            Self::new(
                LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::ISIG,
                OFlag::O_RDWR,
                (80, 24),
            )
        }

        pub fn local(&self) -> LocalFlags {
            self.state.borrow().local
        }

        pub fn status(&self) -> OFlag {
            self.state.borrow().status
        }

        pub fn resize(&self, columns: u16, rows: u16) {
            self.state.borrow_mut().size = (columns, rows);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.borrow().calls.clone()
        }

        /// Only the mutating calls, in order.
        pub fn writes(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::SetLocal(_) | Call::SetStatus(_)))
                .collect()
        }

        pub fn clear_calls(&self) {
            self.state.borrow_mut().calls.clear();
        }
    }

    impl TerminalControl for RecordingControl {
        fn local_flags(&self) -> Result<LocalFlags, TerminalError> {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::GetLocal);
            Ok(state.local)
        }

        fn set_local_flags(&self, flags: LocalFlags) -> Result<(), TerminalError> {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::SetLocal(flags));
            state.local = flags;
            Ok(())
        }

        fn status_flags(&self) -> Result<OFlag, TerminalError> {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::GetStatus);
            Ok(state.status)
        }

        fn set_status_flags(&self, flags: OFlag) -> Result<(), TerminalError> {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::SetStatus(flags));
            state.status = flags;
            Ok(())
        }

        fn window_size(&self) -> Result<(u16, u16), TerminalError> {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::WindowSize);
            Ok(state.size)
        }
    }
}
