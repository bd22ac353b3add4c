use super::types::{Dart, BULL};

/// Numbers clockwise from the top of the board
pub const SEGMENT_ORDER: [u8; 20] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];

// Ring radii as a fraction of the outer edge of the double ring (170mm)
const INNER_BULL: f64 = 6.35 / 170.0;
const OUTER_BULL: f64 = 15.9 / 170.0;
const TREBLE_INNER: f64 = 99.0 / 170.0;
const TREBLE_OUTER: f64 = 107.0 / 170.0;
const DOUBLE_INNER: f64 = 162.0 / 170.0;

const SEGMENT_ANGLE: f64 = 18.0;

/// Dart landing at board coordinates. The board is centred on the origin,
/// y grows downwards and radius 1.0 is the outer wire of the doubles.
pub fn dart_at(x: f64, y: f64) -> Dart {
    let radius = x.hypot(y);

    let dart = if radius > 1.0 {
        Dart::miss()
    } else if radius <= INNER_BULL {
        Dart::bullseye()
    } else if radius <= OUTER_BULL {
        Dart::single(BULL)
    } else {
        let segment = segment_at_angle(x, y);
        if radius >= DOUBLE_INNER {
            Dart::double(segment)
        } else if (TREBLE_INNER..=TREBLE_OUTER).contains(&radius) {
            Dart::treble(segment)
        } else {
            Dart::single(segment)
        }
    };

    dart.with_position(x, y)
}

fn segment_at_angle(x: f64, y: f64) -> u8 {
    // clockwise from twelve o'clock
    let degrees = x.atan2(-y).to_degrees().rem_euclid(360.0);
    let idx = ((degrees + SEGMENT_ANGLE / 2.0) / SEGMENT_ANGLE) as usize % SEGMENT_ORDER.len();
    SEGMENT_ORDER[idx]
}

/// Centre of the bed a player aims at for the given dart
pub fn aim_point(dart: &Dart) -> (f64, f64) {
    if dart.is_miss() || dart.segment == BULL {
        return (0.0, 0.0);
    }

    let radius = match dart.multiplier {
        3 => (TREBLE_INNER + TREBLE_OUTER) / 2.0,
        2 => (DOUBLE_INNER + 1.0) / 2.0,
        _ => (OUTER_BULL + TREBLE_INNER) / 2.0,
    };
    let idx = SEGMENT_ORDER
        .iter()
        .position(|&s| s == dart.segment)
        .unwrap_or(0);
    let angle = (idx as f64 * SEGMENT_ANGLE).to_radians();

    (radius * angle.sin(), -radius * angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lands(x: f64, y: f64) -> (u8, u8) {
        let dart = dart_at(x, y);
        (dart.segment, dart.multiplier)
    }

    #[test]
    fn test_rings() {
        assert_eq!(lands(0.0, 0.0), (25, 2));
        assert_eq!(lands(0.0, -0.07), (25, 1));
        assert_eq!(lands(0.0, -0.6), (20, 3));
        assert_eq!(lands(0.0, -0.97), (20, 2));
        assert_eq!(lands(0.0, -0.3), (20, 1));
        assert_eq!(lands(0.0, -1.2), (0, 0));
    }

    #[test]
    fn test_segments_clockwise() {
        assert_eq!(lands(0.6, 0.0).0, 6);
        assert_eq!(lands(0.0, 0.6).0, 3);
        assert_eq!(lands(-0.6, 0.0).0, 11);
    }

    #[test]
    fn test_aim_point_lands_in_bed() {
        for dart in [Dart::treble(19), Dart::double(16), Dart::single(5), Dart::bullseye()] {
            let (x, y) = aim_point(&dart);
            let landed = dart_at(x, y);
            assert_eq!((landed.segment, landed.multiplier), (dart.segment, dart.multiplier));
            assert_eq!(landed.x, Some(x));
        }
    }
}
