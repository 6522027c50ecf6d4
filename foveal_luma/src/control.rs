// THEORY:
// User control is modeled as a tiny state machine plus a one-way channel.
//
// `PlaybackState` is the whole of the controller's mode: it starts `Running`,
// flips between `Running` and `Paused` on a toggle, and ends in `Stopped`, which
// nothing leaves. The transition function is pure so it can be reasoned about
// (and tested) without a loop around it.
//
// Signals reach the loop through an unbounded tokio channel. Producers (a stdin
// reader, a Ctrl-C handler, a GUI) hold a cloneable `ControlHandle`; the loop
// owns the receiving end and drains it at least once per tick.

use tokio::sync::mpsc;

/// A request from the user to change the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Quit,
    TogglePause,
}

impl ControlSignal {
    /// Maps the player's key bindings: `q` quits, `p` pauses or resumes.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Self::Quit),
            'p' => Some(Self::TogglePause),
            _ => None,
        }
    }

    /// Parses a typed command such as `p`, `pause`, `q` or `quit`.
    pub fn from_command(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(Self::Quit),
            "p" | "pause" | "resume" => Some(Self::TogglePause),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Running,
    Paused,
    Stopped,
}

impl PlaybackState {
    /// The state after `signal`. `Stopped` is terminal.
    pub fn apply(self, signal: ControlSignal) -> Self {
        match (self, signal) {
            (Self::Stopped, _) => Self::Stopped,
            (_, ControlSignal::Quit) => Self::Stopped,
            (Self::Running, ControlSignal::TogglePause) => Self::Paused,
            (Self::Paused, ControlSignal::TogglePause) => Self::Running,
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_paused(self) -> bool {
        self == Self::Paused
    }

    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

pub type ControlReceiver = mpsc::UnboundedReceiver<ControlSignal>;

/// The sending side handed to whatever produces control input.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlSignal>,
}

impl ControlHandle {
    /// Returns `false` once the playback loop has gone away.
    pub fn send(&self, signal: ControlSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    pub fn quit(&self) -> bool {
        self.send(ControlSignal::Quit)
    }

    pub fn toggle_pause(&self) -> bool {
        self.send(ControlSignal::TogglePause)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub fn channel() -> (ControlHandle, ControlReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlHandle { tx }, rx)
}
