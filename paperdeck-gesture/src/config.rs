//! Tunables for the swipe interaction.
//!
//! All distances are in density-independent units, velocities in
//! units per second. Defaults match the interaction as shipped; hosts
//! override individual fields when the card geometry differs.

#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Travel distance to the fully revealed position (width of the
    /// action area behind the card).
    pub open_width: f32,
    /// Fraction of `open_width` past which a released card settles
    /// into the revealed state instead of closing.
    pub reveal_fraction: f32,
    /// Release speed above which the fling projection, rather than the
    /// raw position, decides settle-vs-reveal.
    pub velocity_threshold: f32,
    /// Exponential decay rate applied when projecting a fling.
    pub fling_friction: f32,
    /// Scroll displacement within the first visible item that closes
    /// the revealed card.
    pub scroll_close_threshold: f32,
    /// Offset comparisons closer than this are treated as equal.
    pub epsilon: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_width: 88.0,
            reveal_fraction: 0.3,
            velocity_threshold: 400.0,
            fling_friction: 4.2,
            scroll_close_threshold: 50.0,
            epsilon: crate::motion::EPSILON,
        }
    }
}

impl GestureConfig {
    /// Offset of the fully revealed position (cards travel left, so the
    /// open offset is negative).
    pub fn open_offset(&self) -> f32 {
        -self.open_width
    }

    /// Position past which a slow release settles into the revealed state.
    pub fn reveal_boundary(&self) -> f32 {
        -self.open_width * self.reveal_fraction
    }
}
