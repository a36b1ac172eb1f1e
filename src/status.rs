const SELECTED: u8 = 1 << 0;
const TAGGED: u8 = 1 << 1;
const BRIDGE: u8 = 1 << 2;

/// Bit flags attached to every vertex and edge of a mesh.
///
/// `selected` mirrors the user's selection. `tagged` marks elements produced
/// or consumed by the connect operation. `bridge` marks edges created across
/// the interior of a face to connect two selected edges.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    flags: u8,
}

impl std::fmt::Debug for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Status")
            .field("selected", &self.selected())
            .field("tagged", &self.tagged())
            .field("bridge", &self.bridge())
            .finish()
    }
}

impl Status {
    fn check(&self, i: u8) -> bool {
        self.flags & i > 0
    }

    fn set(&mut self, i: u8, flag: bool) {
        if flag {
            self.flags |= i;
        } else {
            self.flags &= !i;
        }
    }

    pub fn selected(&self) -> bool {
        self.check(SELECTED)
    }

    pub fn set_selected(&mut self, flag: bool) {
        self.set(SELECTED, flag)
    }

    pub fn tagged(&self) -> bool {
        self.check(TAGGED)
    }

    pub fn set_tagged(&mut self, flag: bool) {
        self.set(TAGGED, flag)
    }

    pub fn bridge(&self) -> bool {
        self.check(BRIDGE)
    }

    pub fn set_bridge(&mut self, flag: bool) {
        self.set(BRIDGE, flag)
    }
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn t_flags_are_independent() {
        let mut s = Status::default();
        assert!(!s.selected() && !s.tagged() && !s.bridge());
        s.set_selected(true);
        s.set_bridge(true);
        assert!(s.selected());
        assert!(s.bridge());
        assert!(!s.tagged());
        s.set_selected(false);
        assert!(!s.selected());
        assert!(s.bridge());
    }
}
