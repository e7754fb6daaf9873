use super::Appearance;
use crate::config::ThresholdEntry;
use crate::error::{ConfigError, PayloadError};

/// One row of the table: prices at or above `price_floor` (and below the
/// next row's floor) show `appearance`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceSpec {
    /// Euros; may be negative.
    pub price_floor: f64,
    pub appearance: Appearance,
}

/// Validated, immutable price → appearance table.
///
/// Invariants after [`ThresholdTable::validate`]:
/// - at least one entry
/// - first floor is finite and ≤ 0
/// - floors strictly increasing
/// - brightness in 0..=100 and color resolved for every entry
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    entries: Vec<AppearanceSpec>,
}

impl ThresholdTable {
    /// Check every invariant, stopping at the first violation.
    pub fn validate(entries: &[ThresholdEntry]) -> Result<Self, ConfigError> {
        let first = entries.first().ok_or(ConfigError::EmptyTable)?;
        if !first.price_floor.is_finite() {
            return Err(ConfigError::NonFiniteFloor { index: 0 });
        }
        if first.price_floor > 0.0 {
            return Err(ConfigError::FirstFloorPositive {
                floor: first.price_floor,
            });
        }

        let mut specs: Vec<AppearanceSpec> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if !entry.price_floor.is_finite() {
                return Err(ConfigError::NonFiniteFloor { index });
            }
            if let Some(prev) = specs.last() {
                if entry.price_floor <= prev.price_floor {
                    return Err(ConfigError::NonMonotonicFloors {
                        index,
                        previous: prev.price_floor,
                        floor: entry.price_floor,
                    });
                }
            }
            let appearance = Appearance::build(
                index,
                &entry.color,
                entry.on_brightness,
                entry.off_brightness,
            )?;
            specs.push(AppearanceSpec {
                price_floor: entry.price_floor,
                appearance,
            });
        }

        Ok(Self { entries: specs })
    }

    /// Highest-floor entry whose floor is ≤ `price`. A price equal to a floor
    /// selects that floor.
    ///
    /// Unreachable for any finite price at or above the first floor; `NaN` or
    /// prices below the first floor surface as `NoMatchingThreshold`, which
    /// callers must treat as fatal.
    pub fn resolve(&self, price: f64) -> Result<&AppearanceSpec, PayloadError> {
        self.entries
            .iter()
            .rev()
            .find(|spec| spec.price_floor <= price)
            .ok_or(PayloadError::NoMatchingThreshold { price })
    }

    pub fn entries(&self) -> &[AppearanceSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::NativeRgb;
    use crate::error::ColorError;

    fn entry(floor: f64, color: &str) -> ThresholdEntry {
        ThresholdEntry::new(floor, color, 50, 20)
    }

    fn abc() -> ThresholdTable {
        ThresholdTable::validate(&[
            entry(-1.0, "blue"),
            entry(0.0, "lime"),
            entry(0.09, "red"),
        ])
        .unwrap()
    }

    fn color_at(table: &ThresholdTable, price: f64) -> String {
        table.resolve(price).unwrap().appearance.color_token.clone()
    }

    #[test]
    fn resolves_by_greatest_floor() {
        let t = abc();
        assert_eq!(color_at(&t, 0.05), "lime");
        assert_eq!(color_at(&t, -0.5), "blue");
        assert_eq!(color_at(&t, 1000.0), "red");
    }

    #[test]
    fn exact_floor_selects_that_floor() {
        let t = abc();
        assert_eq!(color_at(&t, 0.09), "red");
        assert_eq!(color_at(&t, 0.0), "lime");
        assert_eq!(color_at(&t, -1.0), "blue");
        assert_eq!(color_at(&t, 0.089_999), "lime");
    }

    #[test]
    fn below_first_floor_is_no_match() {
        let t = abc();
        assert!(matches!(
            t.resolve(-1.5),
            Err(PayloadError::NoMatchingThreshold { .. })
        ));
        assert!(t.resolve(f64::NAN).is_err());
        assert!(t.resolve(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn native_color_precomputed() {
        let t = abc();
        let spec = t.resolve(0.5).unwrap();
        assert_eq!(spec.appearance.native, NativeRgb([100, 0, 0]));
        assert_eq!(spec.appearance.on_brightness, 50);
        assert_eq!(spec.appearance.off_brightness, 20);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ThresholdTable::validate(&[]),
            Err(ConfigError::EmptyTable)
        ));
    }

    #[test]
    fn rejects_positive_first_floor() {
        assert!(matches!(
            ThresholdTable::validate(&[entry(0.01, "red")]),
            Err(ConfigError::FirstFloorPositive { .. })
        ));
        // zero is allowed
        assert!(ThresholdTable::validate(&[entry(0.0, "red")]).is_ok());
    }

    #[test]
    fn rejects_duplicate_and_inverted_floors() {
        assert!(matches!(
            ThresholdTable::validate(&[entry(0.0, "red"), entry(0.0, "blue")]),
            Err(ConfigError::NonMonotonicFloors { index: 1, .. })
        ));
        assert!(matches!(
            ThresholdTable::validate(&[entry(-1.0, "red"), entry(0.5, "blue"), entry(0.2, "lime")]),
            Err(ConfigError::NonMonotonicFloors { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_floor() {
        assert!(matches!(
            ThresholdTable::validate(&[entry(f64::NAN, "red")]),
            Err(ConfigError::NonFiniteFloor { index: 0 })
        ));
        assert!(matches!(
            ThresholdTable::validate(&[entry(0.0, "red"), entry(f64::INFINITY, "blue")]),
            Err(ConfigError::NonFiniteFloor { index: 1 })
        ));
    }

    #[test]
    fn rejects_brightness_out_of_range() {
        let bad = [
            ThresholdEntry::new(0.0, "red", 50, 20),
            ThresholdEntry::new(1.0, "red", 101, 20),
        ];
        assert!(matches!(
            ThresholdTable::validate(&bad),
            Err(ConfigError::BrightnessOutOfRange { index: 1, field: "on_brightness", value: 101 })
        ));
        let bad = [ThresholdEntry::new(0.0, "red", 50, -3)];
        assert!(matches!(
            ThresholdTable::validate(&bad),
            Err(ConfigError::BrightnessOutOfRange { index: 0, field: "off_brightness", value: -3 })
        ));
    }

    #[test]
    fn rejects_unknown_color() {
        let err = ThresholdTable::validate(&[entry(0.0, "red"), entry(1.0, "Blue")]).unwrap_err();
        match err {
            ConfigError::Color { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, ColorError::UnknownColor("Blue".into()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_hex_digit() {
        assert!(matches!(
            ThresholdTable::validate(&[entry(0.0, "#00ZZ00")]),
            Err(ConfigError::Color {
                index: 0,
                source: ColorError::InvalidHexDigit { digit: 'Z', .. }
            })
        ));
    }

    #[test]
    fn fail_fast_reports_first_violation() {
        // Entry 1 has both an inverted floor and a bad color; the floor is checked first.
        let err = ThresholdTable::validate(&[entry(0.0, "red"), entry(-1.0, "nope")]).unwrap_err();
        assert!(matches!(err, ConfigError::NonMonotonicFloors { index: 1, .. }));
    }

    #[test]
    fn greatest_floor_property_over_sweep() {
        let t = ThresholdTable::validate(&[
            entry(-0.2, "blue"),
            entry(0.0, "lime"),
            entry(0.05, "yellow"),
            entry(0.1, "orange"),
            entry(0.2, "red"),
        ])
        .unwrap();
        let floors: Vec<f64> = t.entries().iter().map(|s| s.price_floor).collect();
        let mut p = -0.2;
        while p < 0.5 {
            let got = t.resolve(p).unwrap().price_floor;
            let want = floors.iter().copied().filter(|f| *f <= p).fold(f64::MIN, f64::max);
            assert_eq!(got, want, "price {p}");
            p += 0.0073;
        }
    }
}
