//! Hover zone classification.
//!
//! Calibrated orientation is converted to engine Euler degrees and matched
//! against an ordered rule table. Each rule tests one axis against one or
//! more inclusive ranges; the first rule with a matching range wins. Bands
//! that cross 0° are written as two ranges (`[350, 360]` and `[0, 10]`).
//!
//! Default table:
//!
//! | # | Axis | Range      | Zone   |
//! |---|------|------------|--------|
//! | 1 | X    | [330, 353] | Unlock |
//! | 2 | Y    | [330, 360] | Cancel |
//! | 3 | X    | [260, 355] | Zoom   |
//! | 4 | X    | [5, 90]    | Light  |
//! | - | -    | otherwise  | None   |

use crate::core::orientation::{EulerAngles, EulerAxis};
use crate::core::types::HoverZone;
use crate::error::{Error, Result};
use crate::ui::{UiSurface, UiTarget};
use serde::{Deserialize, Serialize};

/// Inclusive angle range in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, deg: f32) -> bool {
        deg >= self.min && deg <= self.max
    }
}

/// One row of the zone table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRule {
    pub zone: HoverZone,
    pub axis: EulerAxis,
    pub ranges: Vec<AngleRange>,
}

impl ZoneRule {
    pub fn new(zone: HoverZone, axis: EulerAxis, min: f32, max: f32) -> Self {
        Self {
            zone,
            axis,
            ranges: vec![AngleRange::new(min, max)],
        }
    }

    pub fn matches(&self, euler: &EulerAngles) -> bool {
        let deg = euler.axis(self.axis);
        self.ranges.iter().any(|r| r.contains(deg))
    }
}

/// Ordered rule table, first match wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    #[serde(default = "default_rules")]
    pub rules: Vec<ZoneRule>,

    #[serde(default)]
    pub fallback: HoverZone,
}

fn default_rules() -> Vec<ZoneRule> {
    vec![
        ZoneRule::new(HoverZone::Unlock, EulerAxis::X, 330.0, 353.0),
        ZoneRule::new(HoverZone::Cancel, EulerAxis::Y, 330.0, 360.0),
        ZoneRule::new(HoverZone::Zoom, EulerAxis::X, 260.0, 355.0),
        ZoneRule::new(HoverZone::Light, EulerAxis::X, 5.0, 90.0),
    ]
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            fallback: HoverZone::None,
        }
    }
}

impl ZoneTable {
    /// Zone for an orientation, without side effects
    pub fn zone_for(&self, euler: &EulerAngles) -> HoverZone {
        self.rules
            .iter()
            .find(|rule| rule.matches(euler))
            .map(|rule| rule.zone)
            .unwrap_or(self.fallback)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.ranges.is_empty() {
                return Err(Error::Config(format!("zone rule {} has no ranges", i + 1)));
            }
            for range in &rule.ranges {
                if range.min > range.max {
                    return Err(Error::Config(format!(
                        "zone rule {} range [{}, {}] is inverted; split wrapping bands into two ranges",
                        i + 1,
                        range.min,
                        range.max
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Stateful classifier driving the hover targets
pub struct ZoneClassifier {
    table: ZoneTable,
    active: HoverZone,
    last_hovered: HoverZone,
}

impl ZoneClassifier {
    pub fn new(table: ZoneTable) -> Self {
        Self {
            table,
            active: HoverZone::None,
            last_hovered: HoverZone::None,
        }
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Zone chosen by the most recent classification
    pub fn active(&self) -> HoverZone {
        self.active
    }

    /// Most recent non-`None` zone of the current session
    pub fn last_hovered(&self) -> HoverZone {
        self.last_hovered
    }

    /// Start a hover session with nothing highlighted
    pub fn begin_session<U: UiSurface>(&mut self, ui: &mut U) {
        self.clear(ui);
        self.last_hovered = HoverZone::None;
    }

    /// Classify and update the hover targets so only the winner is visible
    pub fn classify<U: UiSurface>(&mut self, euler: &EulerAngles, ui: &mut U) -> HoverZone {
        let zone = self.table.zone_for(euler);
        if zone != self.active {
            log::debug!(
                "Hover zone {:?} -> {:?} (x={:.1}, y={:.1}, z={:.1})",
                self.active,
                zone,
                euler.x,
                euler.y,
                euler.z
            );
            for other in HoverZone::SELECTABLE {
                if other != zone {
                    ui.hide_bound(UiTarget::Hover(other));
                }
            }
            if zone != HoverZone::None {
                ui.show_bound(UiTarget::Hover(zone));
            }
            self.active = zone;
        }
        if zone != HoverZone::None {
            self.last_hovered = zone;
        }
        zone
    }

    /// Hide every hover target and drop the active zone
    pub fn clear<U: UiSurface>(&mut self, ui: &mut U) {
        for zone in HoverZone::SELECTABLE {
            ui.hide_bound(UiTarget::Hover(zone));
        }
        self.active = HoverZone::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RecordingSurface, UiEvent};

    fn euler(x: f32, y: f32) -> EulerAngles {
        EulerAngles::new(x, y, 0.0)
    }

    #[test]
    fn test_default_table() {
        let table = ZoneTable::default();
        assert_eq!(table.zone_for(&euler(340.0, 0.0)), HoverZone::Unlock);
        assert_eq!(table.zone_for(&euler(0.0, 345.0)), HoverZone::Cancel);
        assert_eq!(table.zone_for(&euler(300.0, 0.0)), HoverZone::Zoom);
        assert_eq!(table.zone_for(&euler(354.0, 0.0)), HoverZone::Zoom);
        assert_eq!(table.zone_for(&euler(45.0, 0.0)), HoverZone::Light);
        assert_eq!(table.zone_for(&euler(0.0, 0.0)), HoverZone::None);
        assert_eq!(table.zone_for(&euler(180.0, 100.0)), HoverZone::None);
    }

    #[test]
    fn test_first_match_wins() {
        // X=340 is in both Unlock and Zoom; Y=340 is Cancel, but Unlock is listed first
        let table = ZoneTable::default();
        assert_eq!(table.zone_for(&euler(340.0, 340.0)), HoverZone::Unlock);
        assert_eq!(table.zone_for(&euler(300.0, 340.0)), HoverZone::Cancel);
    }

    #[test]
    fn test_inclusive_bounds() {
        let table = ZoneTable::default();
        assert_eq!(table.zone_for(&euler(330.0, 0.0)), HoverZone::Unlock);
        assert_eq!(table.zone_for(&euler(353.0, 0.0)), HoverZone::Unlock);
        assert_eq!(table.zone_for(&euler(5.0, 0.0)), HoverZone::Light);
        assert_eq!(table.zone_for(&euler(90.0, 0.0)), HoverZone::Light);
        assert_eq!(table.zone_for(&euler(90.5, 0.0)), HoverZone::None);
    }

    #[test]
    fn test_wrapping_band_as_two_ranges() {
        let table = ZoneTable {
            rules: vec![ZoneRule {
                zone: HoverZone::Cancel,
                axis: EulerAxis::Z,
                ranges: vec![AngleRange::new(350.0, 360.0), AngleRange::new(0.0, 10.0)],
            }],
            fallback: HoverZone::None,
        };
        assert_eq!(table.zone_for(&EulerAngles::new(0.0, 0.0, 355.0)), HoverZone::Cancel);
        assert_eq!(table.zone_for(&EulerAngles::new(0.0, 0.0, 5.0)), HoverZone::Cancel);
        assert_eq!(table.zone_for(&EulerAngles::new(0.0, 0.0, 20.0)), HoverZone::None);
    }

    #[test]
    fn test_configurable_fallback() {
        let table = ZoneTable {
            rules: Vec::new(),
            fallback: HoverZone::Cancel,
        };
        assert_eq!(table.zone_for(&euler(0.0, 0.0)), HoverZone::Cancel);
    }

    #[test]
    fn test_at_most_one_hover_visible() {
        let mut ui = RecordingSurface::new();
        let mut classifier = ZoneClassifier::new(ZoneTable::default());
        classifier.begin_session(&mut ui);

        for (x, y) in [
            (340.0, 0.0),
            (300.0, 0.0),
            (45.0, 0.0),
            (0.0, 345.0),
            (0.0, 0.0),
            (340.0, 0.0),
        ] {
            let zone = classifier.classify(&euler(x, y), &mut ui);
            let visible = ui.visible_hovers();
            assert!(visible.len() <= 1, "visible: {:?}", visible);
            if zone == HoverZone::None {
                assert!(visible.is_empty());
            } else {
                assert_eq!(visible, vec![zone]);
            }
        }
    }

    #[test]
    fn test_unbound_hover_target_is_not_shown() {
        let mut ui = RecordingSurface::new();
        ui.unbind(UiTarget::Hover(HoverZone::Unlock));
        let mut classifier = ZoneClassifier::new(ZoneTable::default());

        let zone = classifier.classify(&euler(340.0, 0.0), &mut ui);
        assert_eq!(zone, HoverZone::Unlock);
        assert_eq!(classifier.last_hovered(), HoverZone::Unlock);
        assert!(!ui
            .events()
            .contains(&UiEvent::Show(UiTarget::Hover(HoverZone::Unlock))));
        assert!(ui.visible_hovers().is_empty());
    }

    #[test]
    fn test_last_hovered_ignores_none() {
        let mut ui = RecordingSurface::new();
        let mut classifier = ZoneClassifier::new(ZoneTable::default());
        classifier.classify(&euler(45.0, 0.0), &mut ui);
        classifier.classify(&euler(0.0, 0.0), &mut ui);
        assert_eq!(classifier.active(), HoverZone::None);
        assert_eq!(classifier.last_hovered(), HoverZone::Light);

        classifier.begin_session(&mut ui);
        assert_eq!(classifier.last_hovered(), HoverZone::None);
    }

    #[test]
    fn test_clear_hides_everything() {
        let mut ui = RecordingSurface::new();
        let mut classifier = ZoneClassifier::new(ZoneTable::default());
        classifier.classify(&euler(340.0, 0.0), &mut ui);
        classifier.clear(&mut ui);
        assert!(ui.visible_hovers().is_empty());
        assert_eq!(classifier.active(), HoverZone::None);
        assert_eq!(classifier.last_hovered(), HoverZone::Unlock);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut table = ZoneTable::default();
        assert!(table.validate().is_ok());
        table.rules[0].ranges[0] = AngleRange::new(350.0, 10.0);
        assert!(table.validate().is_err());
    }
}
