//! Learned remote: address plus one code per semantic command.

/// Number of learnable commands.
pub const NUMBER_OF_COMMANDS: usize = 6;

/// What a remote button means to the controller.
///
/// The discriminant doubles as the learning slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SemanticCommand {
    Up = 0,
    Down = 1,
    Mute = 2,
    Left = 3,
    Right = 4,
    Preset = 5,
    /// No stored code matched. Never stored.
    Unknown = 6,
}

impl SemanticCommand {
    /// Learnable commands in slot order.
    pub const SLOTS: [SemanticCommand; NUMBER_OF_COMMANDS] = [
        SemanticCommand::Up,
        SemanticCommand::Down,
        SemanticCommand::Mute,
        SemanticCommand::Left,
        SemanticCommand::Right,
        SemanticCommand::Preset,
    ];

    /// Command for a slot index, `Unknown` past the last slot.
    pub fn from_slot(idx: usize) -> Self {
        Self::SLOTS.get(idx).copied().unwrap_or(SemanticCommand::Unknown)
    }

    pub fn name(self) -> &'static str {
        match self {
            SemanticCommand::Up => "Up",
            SemanticCommand::Down => "Down",
            SemanticCommand::Mute => "Mute",
            SemanticCommand::Left => "Left",
            SemanticCommand::Right => "Right",
            SemanticCommand::Preset => "Preset",
            SemanticCommand::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for SemanticCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Address and codes captured from one remote.
///
/// Always complete: learning either fills all slots or produces nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoteProfile {
    pub address: u16,
    pub codes: [u16; NUMBER_OF_COMMANDS],
}

impl RemoteProfile {
    pub const fn new(address: u16, codes: [u16; NUMBER_OF_COMMANDS]) -> Self {
        Self { address, codes }
    }

    /// Map a received code to its command. The lowest slot wins on duplicates.
    pub fn lookup(&self, code: u16) -> SemanticCommand {
        self.codes
            .iter()
            .position(|&c| c == code)
            .map(SemanticCommand::from_slot)
            .unwrap_or(SemanticCommand::Unknown)
    }

    /// Code learned for a command, `None` for `Unknown`.
    pub fn code_for(&self, command: SemanticCommand) -> Option<u16> {
        self.codes.get(command as usize).copied()
    }

    /// Print the mapping to the console.
    pub fn log(&self) {
        log::info!("  {:>8}: {:04X}", "Address", self.address);
        for (command, code) in SemanticCommand::SLOTS.iter().zip(self.codes.iter()) {
            log::info!("  {:>8}: {:04X}", command.name(), code);
        }
    }
}
