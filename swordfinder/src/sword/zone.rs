// Zone penalty: how far outside the strike zone a pitch crossed the plate.

use crate::sword::pitch::PitchRecord;

/// Half-width of the nominal strike zone, in feet from the center of the plate.
pub const ZONE_HALF_WIDTH_FT: f64 = 0.83;

/// Inches outside the zone that earn one full unit of bonus.
pub const INCHES_PER_BONUS_UNIT: f64 = 18.0;

/// Maximum bonus, so the factor never exceeds `1.0 + MAX_ZONE_BONUS`.
pub const MAX_ZONE_BONUS: f64 = 2.0;

/// Neutral factor for pitches in (or on the edge of) the zone.
pub const NEUTRAL_ZONE_FACTOR: f64 = 1.0;

/// Plate crossing location plus the batter's vertical zone bounds, in feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLocation {
    pub plate_x: f64,
    pub plate_z: f64,
    pub sz_top: f64,
    pub sz_bot: f64,
}

impl ZoneLocation {
    /// Returns `None` unless all four location fields are present.
    pub fn from_pitch(pitch: &PitchRecord) -> Option<Self> {
        Some(ZoneLocation {
            plate_x: pitch.plate_x?,
            plate_z: pitch.plate_z?,
            sz_top: pitch.sz_top?,
            sz_bot: pitch.sz_bot?,
        })
    }

    /// Horizontal distance outside the zone, in feet.
    pub fn out_x(&self) -> f64 {
        (self.plate_x.abs() - ZONE_HALF_WIDTH_FT).max(0.0)
    }

    /// Vertical distance above or below the batter's zone, in feet.
    pub fn out_z(&self) -> f64 {
        if self.plate_z < self.sz_bot {
            self.sz_bot - self.plate_z
        } else if self.plate_z > self.sz_top {
            self.plate_z - self.sz_top
        } else {
            0.0
        }
    }
}

/// Zone penalty factor in `[1.0, 3.0]`.
///
/// Every 18 inches of combined horizontal and vertical overage adds 1.0, with
/// the bonus capped at 2.0 so pitches in the dirt cannot dominate a score.
pub fn zone_penalty_factor(loc: &ZoneLocation) -> f64 {
    let penalty_inches = (loc.out_x() + loc.out_z()) * 12.0;
    let scaled_bonus = (penalty_inches / INCHES_PER_BONUS_UNIT).min(MAX_ZONE_BONUS);
    NEUTRAL_ZONE_FACTOR + scaled_bonus
}

/// Zone penalty factor for a pitch record. Pitches with unknown location get
/// the neutral factor.
pub fn zone_penalty_for(pitch: &PitchRecord) -> f64 {
    match ZoneLocation::from_pitch(pitch) {
        Some(loc) => zone_penalty_factor(&loc),
        None => NEUTRAL_ZONE_FACTOR,
    }
}
