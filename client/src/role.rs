//! Role assignment from the relay's connection count

use log::info;
use shared::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Side),
    Spectator,
}

impl Role {
    /// First connection plays left, second plays right, everybody else watches.
    pub fn from_player_count(count: usize) -> Role {
        match count {
            1 => Role::Player(Side::Left),
            2 => Role::Player(Side::Right),
            _ => Role::Spectator,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Role::Player(side) => Some(side),
            Role::Spectator => None,
        }
    }

    pub fn is_player(self) -> bool {
        matches!(self, Role::Player(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Player(Side::Left) => "left",
            Role::Player(Side::Right) => "right",
            Role::Spectator => "spec",
        }
    }

    pub fn greeting(self) -> &'static str {
        match self {
            Role::Player(Side::Left) => "You are LEFT. Waiting for second player...",
            Role::Player(Side::Right) => "You are RIGHT. You need to move right pieces.",
            Role::Spectator => "You are a spectator.",
        }
    }
}

/// Holds the session's role. Only the first count update assigns it.
#[derive(Debug, Default)]
pub struct RoleAssignment {
    role: Option<Role>,
}

impl RoleAssignment {
    pub fn new() -> Self {
        Self { role: None }
    }

    /// Returns the role if this call assigned it, None if it was already set.
    pub fn observe_count(&mut self, count: usize) -> Option<Role> {
        if self.role.is_some() {
            return None;
        }

        let role = Role::from_player_count(count);
        info!("Assigned role {} (player count {})", role.label(), count);
        self.role = Some(role);
        Some(role)
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }
}
