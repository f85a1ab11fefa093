use serde::{Deserialize, Serialize};

/// How the map follows the user. The location button cycles through the
/// modes in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Every new fix re-centers the map.
    #[default]
    FollowUser,
    /// Centering is suspended and the user pans and zooms freely.
    Free,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::FollowUser, ViewMode::Free];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|mode| *mode == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Advances to the next mode and returns it.
    pub fn toggle(&mut self) -> Self {
        *self = self.next();
        *self
    }

    pub fn recenters_on_fix(self) -> bool {
        self == ViewMode::FollowUser
    }

    pub fn allows_panning(self) -> bool {
        !self.recenters_on_fix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_following_the_user() {
        assert_eq!(ViewMode::default(), ViewMode::FollowUser);
        assert!(ViewMode::default().recenters_on_fix());
        assert!(!ViewMode::default().allows_panning());
    }

    #[test]
    fn toggling_twice_returns_to_follow() {
        let mut mode = ViewMode::default();
        assert_eq!(mode.toggle(), ViewMode::Free);
        assert!(mode.allows_panning());
        assert_eq!(mode.toggle(), ViewMode::FollowUser);
    }
}
