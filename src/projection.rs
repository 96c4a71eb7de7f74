//! Pure angle-to-display transforms. No I/O, no state: every view calls
//! these synchronously on each successful refresh to derive its render
//! parameters from the azimuth/elevation pair the service returned.

use serde::Serialize;

/// One of the eight 45-degree compass sectors, starting at north and going
/// clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompassSector {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassSector {
    const ALL: [CompassSector; 8] = [
        CompassSector::North,
        CompassSector::Northeast,
        CompassSector::East,
        CompassSector::Southeast,
        CompassSector::South,
        CompassSector::Southwest,
        CompassSector::West,
        CompassSector::Northwest,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassSector::North => "N",
            CompassSector::Northeast => "NE",
            CompassSector::East => "E",
            CompassSector::Southeast => "SE",
            CompassSector::South => "S",
            CompassSector::Southwest => "SW",
            CompassSector::West => "W",
            CompassSector::Northwest => "NW",
        }
    }

    /// Arrow glyph pointing into the sector, north being "up".
    pub fn glyph(&self) -> &'static str {
        match self {
            CompassSector::North => "↑",
            CompassSector::Northeast => "↗",
            CompassSector::East => "→",
            CompassSector::Southeast => "↘",
            CompassSector::South => "↓",
            CompassSector::Southwest => "↙",
            CompassSector::West => "←",
            CompassSector::Northwest => "↖",
        }
    }
}

/// Maps an azimuth in degrees to its compass sector. Periodic in 360; the
/// sector boundary falls halfway between sector centers (22.5, 67.5, ...).
pub fn compass_sector(azimuth_deg: f64) -> CompassSector {
    let index = (azimuth_deg / 45.0).round() as i64;
    CompassSector::ALL[index.rem_euclid(8) as usize]
}

/// Qualitative elevation band, evaluated highest-first so every elevation
/// lands in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElevationBand {
    VeryHigh,
    Medium,
    Low,
    AtHorizon,
}

impl ElevationBand {
    pub fn label(&self) -> &'static str {
        match self {
            ElevationBand::VeryHigh => "very high",
            ElevationBand::Medium => "medium",
            ElevationBand::Low => "low",
            ElevationBand::AtHorizon => "at horizon",
        }
    }
}

pub fn elevation_band(elevation_deg: f64) -> ElevationBand {
    if elevation_deg > 60.0 {
        ElevationBand::VeryHigh
    } else if elevation_deg > 30.0 {
        ElevationBand::Medium
    } else if elevation_deg > 10.0 {
        ElevationBand::Low
    } else {
        ElevationBand::AtHorizon
    }
}

/// Rotation pair for the directional-pole visualization. Azimuth is a
/// clockwise-from-north bearing while screen rotations are counter-clockwise,
/// so the pole angle is the negated azimuth; the elevation indicator is a
/// second rotation nested inside the pole's frame and uses elevation as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoleTransform {
    pub pole_deg: f64,
    pub indicator_deg: f64,
}

pub fn pole_transform(azimuth_deg: f64, elevation_deg: f64) -> PoleTransform {
    PoleTransform {
        pole_deg: -azimuth_deg,
        indicator_deg: elevation_deg,
    }
}

/// A point in percent-of-container coordinates, origin at the top-left,
/// y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x_pct: f64,
    pub y_pct: f64,
}

/// Decorative dome placement for items that carry no angles (pass
/// predictions only have timestamps). Spreads the i-th item around the
/// center on a widening spiral of fixed steps.
pub fn layout_position(index: usize) -> ScreenPoint {
    let angle_deg = ((index * 90) % 360) as f64;
    let radius_pct = (30 + (index * 10) % 50) as f64;
    let angle = angle_deg.to_radians();
    ScreenPoint {
        x_pct: 50.0 + radius_pct * angle.cos(),
        y_pct: 50.0 - radius_pct * angle.sin(),
    }
}

/// Faithful polar sky projection: zenith at the center, horizon at the rim,
/// north up, east right. Used whenever real angles are available.
pub fn sky_position(azimuth_deg: f64, elevation_deg: f64) -> ScreenPoint {
    let radius_pct = (90.0 - elevation_deg.clamp(0.0, 90.0)) / 90.0 * 50.0;
    let az = azimuth_deg.to_radians();
    ScreenPoint {
        x_pct: 50.0 + radius_pct * az.sin(),
        y_pct: 50.0 - radius_pct * az.cos(),
    }
}

/// Local antenna recommendation derived from elevation alone. The service
/// sends its own guidance text; these tiers are the fallback when a response
/// omits it, and the reference semantics for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AntennaAdvice {
    pub antenna_type: &'static str,
    pub difficulty: &'static str,
}

pub fn antenna_advice(elevation_deg: f64) -> AntennaAdvice {
    if elevation_deg < 10.0 {
        AntennaAdvice {
            antenna_type: "Horizontal antenna with slight uptilt",
            difficulty: "Hard (near the horizon)",
        }
    } else if elevation_deg < 25.0 {
        AntennaAdvice {
            antenna_type: "Low polar antenna",
            difficulty: "Moderate",
        }
    } else if elevation_deg < 45.0 {
        AntennaAdvice {
            antenna_type: "Yagi or grid antenna",
            difficulty: "Easy",
        }
    } else if elevation_deg < 70.0 {
        AntennaAdvice {
            antenna_type: "Vertical or helical antenna",
            difficulty: "Very easy",
        }
    } else {
        AntennaAdvice {
            antenna_type: "Any vertical antenna",
            difficulty: "Very easy (overhead)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarization {
    Vertical,
    Horizontal,
}

/// Vertical for bearings in the northern half-planes (NE and NW quadrants),
/// horizontal otherwise.
pub fn polarization_for(azimuth_deg: f64) -> Polarization {
    let az = azimuth_deg.rem_euclid(360.0);
    if az < 90.0 || az >= 270.0 {
        Polarization::Vertical
    } else {
        Polarization::Horizontal
    }
}
