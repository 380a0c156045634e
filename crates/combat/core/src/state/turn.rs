//! Per-entity, per-round action economy.

bitflags::bitflags! {
    /// Action-economy flags tracked for one entity during one round.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const ACTION_USED       = 1 << 0;
        const BONUS_ACTION_USED = 1 << 1;
        const REACTION_USED     = 1 << 2;
        const DASHED            = 1 << 3;
        const DISENGAGING       = 1 << 4;
        const DODGING           = 1 << 5;
        const HIDDEN            = 1 << 6;
    }
}

/// Budget for one entity's round.
///
/// Reset by the host's scheduler at the start of the entity's turn
/// ([`TurnState::reset_for_turn`]). The engine only writes the reaction flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub movement_remaining_ft: u32,
    pub flags: TurnFlags,
}

impl TurnState {
    pub const fn new(speed_ft: u32) -> Self {
        Self {
            movement_remaining_ft: speed_ft,
            flags: TurnFlags::empty(),
        }
    }

    /// Start-of-turn reset: full movement, every flag cleared.
    pub fn reset_for_turn(&mut self, speed_ft: u32) {
        *self = Self::new(speed_ft);
    }

    pub const fn reaction_available(&self) -> bool {
        !self.flags.contains(TurnFlags::REACTION_USED)
    }

    pub const fn is_dodging(&self) -> bool {
        self.flags.contains(TurnFlags::DODGING)
    }

    pub const fn is_disengaging(&self) -> bool {
        self.flags.contains(TurnFlags::DISENGAGING)
    }

    /// Marks the reaction as spent. Returns false if it already was.
    pub fn spend_reaction(&mut self) -> bool {
        if !self.reaction_available() {
            return false;
        }
        self.flags.insert(TurnFlags::REACTION_USED);
        true
    }

    /// Spends movement, clamping at zero. Returns the feet actually spent.
    pub fn spend_movement(&mut self, feet: u32) -> u32 {
        let spent = feet.min(self.movement_remaining_ft);
        self.movement_remaining_ft -= spent;
        spent
    }

    /// Dash adds the entity's speed to the remaining movement.
    pub fn dash(&mut self, speed_ft: u32) {
        self.flags.insert(TurnFlags::DASHED | TurnFlags::ACTION_USED);
        self.movement_remaining_ft = self.movement_remaining_ft.saturating_add(speed_ft);
    }
}
