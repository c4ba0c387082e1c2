/// A point source driven continuously while active.
///
/// The position is a cell coordinate; positions outside the grid are legal
/// and simply inject nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Source {
    pub x: i32,
    pub y: i32,
    pub active: bool,
}

/// Tracks up to two point sources and their activation rules.
///
/// In single mode only the primary source exists and every placement
/// overwrites it. In dual mode the first placement sets the primary, the
/// second sets the secondary, and further placements are ignored until the
/// sources are demoted back to single mode.
#[derive(Clone, Debug)]
pub struct SourceManager {
    dual_mode: bool,
    count: u8,
    primary: Source,
    secondary: Source,
}

impl SourceManager {
    pub fn new(dual_mode: bool) -> Self {
        Self {
            dual_mode,
            count: 0,
            primary: Source::default(),
            secondary: Source::default(),
        }
    }

    pub fn is_dual_mode(&self) -> bool {
        self.dual_mode
    }

    /// Number of placed sources (0, 1, or 2).
    pub fn source_count(&self) -> u8 {
        self.count
    }

    pub fn primary(&self) -> Source {
        self.primary
    }

    pub fn secondary(&self) -> Source {
        self.secondary
    }

    /// Place a source at `(x, y)`.
    pub fn set_position(&mut self, x: i32, y: i32) {
        if !self.dual_mode {
            self.primary = Source { x, y, active: true };
            self.secondary.active = false;
            self.count = 1;
        } else {
            match self.count {
                0 => {
                    self.primary = Source { x, y, active: true };
                    self.secondary.active = false;
                    self.count = 1;
                }
                1 => {
                    self.secondary = Source { x, y, active: true };
                    self.count = 2;
                }
                // Both placed: ignored until demotion resets the ladder
                _ => {}
            }
        }
    }

    /// Switch between single and dual mode. Leaving dual mode deactivates
    /// the secondary source and keeps the primary where it was.
    pub fn set_dual_mode(&mut self, dual: bool) {
        if self.dual_mode == dual {
            return;
        }
        self.dual_mode = dual;
        if !dual {
            if self.count >= 1 {
                self.secondary.active = false;
                self.count = 1;
            } else {
                self.primary.active = false;
                self.secondary.active = false;
            }
        }
    }

    /// The currently active sources, in placement order.
    pub fn active(&self) -> impl Iterator<Item = Source> {
        [self.primary, self.secondary]
            .into_iter()
            .filter(|s| s.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_overwrites_primary() {
        let mut sources = SourceManager::new(false);
        sources.set_position(3, 4);
        sources.set_position(7, 8);
        assert_eq!(sources.source_count(), 1);
        assert_eq!(sources.primary(), Source { x: 7, y: 8, active: true });
        assert!(!sources.secondary().active);
    }

    #[test]
    fn test_dual_mode_places_two_sources() {
        let mut sources = SourceManager::new(true);
        sources.set_position(1, 1);
        sources.set_position(2, 2);
        assert_eq!(sources.source_count(), 2);
        assert_eq!(sources.active().count(), 2);
        assert_eq!(sources.secondary(), Source { x: 2, y: 2, active: true });
    }

    #[test]
    fn test_dual_mode_third_placement_ignored() {
        let mut sources = SourceManager::new(true);
        sources.set_position(1, 1);
        sources.set_position(2, 2);
        sources.set_position(9, 9);
        assert_eq!(sources.primary(), Source { x: 1, y: 1, active: true });
        assert_eq!(sources.secondary(), Source { x: 2, y: 2, active: true });
    }

    #[test]
    fn test_demotion_keeps_primary() {
        let mut sources = SourceManager::new(true);
        sources.set_position(5, 6);
        sources.set_position(7, 8);
        sources.set_dual_mode(false);
        assert_eq!(sources.source_count(), 1);
        assert_eq!(sources.primary(), Source { x: 5, y: 6, active: true });
        assert!(!sources.secondary().active);
    }

    #[test]
    fn test_demotion_with_no_sources() {
        let mut sources = SourceManager::new(true);
        sources.set_dual_mode(false);
        assert_eq!(sources.source_count(), 0);
        assert_eq!(sources.active().count(), 0);
    }

    #[test]
    fn test_promotion_only_flips_flag() {
        let mut sources = SourceManager::new(false);
        sources.set_position(4, 4);
        sources.set_dual_mode(true);
        assert!(sources.is_dual_mode());
        assert_eq!(sources.source_count(), 1);
        assert!(!sources.secondary().active);
        // The next placement goes to the secondary slot
        sources.set_position(6, 6);
        assert_eq!(sources.secondary(), Source { x: 6, y: 6, active: true });
    }

    #[test]
    fn test_same_mode_call_is_a_noop() {
        let mut sources = SourceManager::new(true);
        sources.set_position(1, 2);
        sources.set_position(3, 4);
        sources.set_dual_mode(true);
        assert_eq!(sources.source_count(), 2);
    }
}
