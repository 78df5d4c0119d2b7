use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Which of the three merge inputs track a path
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Presence: u8 {
        const NONE = 0b000;
        const SPLIT = 0b001;
        const CURRENT = 0b010;
        const OTHER = 0b100;
    }
}

impl Presence {
    pub fn of(
        split: Option<&ObjectId>,
        current: Option<&ObjectId>,
        other: Option<&ObjectId>,
    ) -> Self {
        let mut presence = Presence::NONE;
        presence.set(Presence::SPLIT, split.is_some());
        presence.set(Presence::CURRENT, current.is_some());
        presence.set(Presence::OTHER, other.is_some());
        presence
    }
}

impl fmt::Debug for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(Presence::SPLIT) {
            flags.push("SPLIT");
        }
        if self.contains(Presence::CURRENT) {
            flags.push("CURRENT");
        }
        if self.contains(Presence::OTHER) {
            flags.push("OTHER");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}
