//! Classification rule table and fixed constants.
//!
//! Rules are plain data handed to the engine at construction so a host or a
//! test can swap any entry. Constants marked "inches" are stored already
//! converted into host units through `units`.

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorType;
use crate::error::{HangerError, HangerResult};
use crate::spatial::{Category, CategoryFilter};
use crate::units::{FeetInches, LengthFormat};

/// Maps a structural category to the anchor used on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRule {
    pub category: Category,
    pub anchor: AnchorType,
}

/// Lookup tables and constants used by classification and the builders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Category to anchor table
    pub anchor_table: Vec<AnchorRule>,
    /// Anchor used for categories missing from the table
    pub default_anchor: AnchorType,
    /// Categories a rod ray may stop on
    pub obstruction_filter: CategoryFilter,
    /// Beam clamps nearer than this become close beam clamps
    pub close_clamp_distance: f64,
    /// Stock rod length between couplings
    pub coupling_interval: f64,
    /// Conduit above this diameter always gets the large clip (1 1/4 inches)
    pub attachment_cutoff: f64,
    /// Extra rod added above fixture supports (3 inches)
    pub fixture_extra_rod: f64,
    /// Largest rod diameter a strut end must clear (1/2 inch)
    pub max_rod_diameter: f64,
    /// Elevations closer than this belong to the same tier (1/2 inch)
    pub tier_tolerance: f64,
    /// Maximum number of tiers resolved per rack
    pub max_tiers: usize,
    /// Shortest line the host accepts as a curve
    pub min_curve_length: f64,
    /// Size used when a run has no diameter
    pub default_attachment_size: String,
    /// Display unit used for size labels
    pub units: FeetInches,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::for_units(FeetInches::default())
    }
}

impl ClassificationRules {
    /// Default rules for a host working in the given unit
    pub fn for_units(units: FeetInches) -> Self {
        Self {
            anchor_table: vec![
                AnchorRule {
                    category: Category::Floor,
                    anchor: AnchorType::ConcreteAnchor,
                },
                AnchorRule {
                    category: Category::Roof,
                    anchor: AnchorType::ConcreteAnchor,
                },
                AnchorRule {
                    category: Category::StructuralFraming,
                    anchor: AnchorType::BeamClamp,
                },
                AnchorRule {
                    category: Category::Joist,
                    anchor: AnchorType::BeamClamp,
                },
            ],
            default_anchor: AnchorType::ConcreteAnchor,
            obstruction_filter: CategoryFilter::new([
                Category::Floor,
                Category::Roof,
                Category::StructuralFraming,
                Category::Joist,
            ]),
            close_clamp_distance: 3.0,
            coupling_interval: 10.0,
            attachment_cutoff: units.from_inches(1.25),
            fixture_extra_rod: units.from_inches(3.0),
            max_rod_diameter: units.from_inches(0.5),
            tier_tolerance: units.from_inches(0.5),
            max_tiers: 4,
            min_curve_length: units.from_inches(1.0 / 32.0),
            default_attachment_size: "1/2\"".to_string(),
            units,
        }
    }

    /// Look up a category in the anchor table
    pub fn anchor_for_category(&self, category: &Category) -> Option<AnchorType> {
        self.anchor_table
            .iter()
            .find(|rule| &rule.category == category)
            .map(|rule| rule.anchor)
    }

    /// Replace or add an anchor table entry
    pub fn with_anchor(mut self, category: Category, anchor: AnchorType) -> Self {
        match self.anchor_table.iter_mut().find(|r| r.category == category) {
            Some(rule) => rule.anchor = anchor,
            None => self.anchor_table.push(AnchorRule { category, anchor }),
        }
        self
    }

    pub fn with_close_clamp_distance(mut self, distance: f64) -> Self {
        self.close_clamp_distance = distance;
        self
    }

    pub fn with_coupling_interval(mut self, interval: f64) -> Self {
        self.coupling_interval = interval;
        self
    }

    pub fn with_obstruction_filter(mut self, filter: CategoryFilter) -> Self {
        self.obstruction_filter = filter;
        self
    }

    /// Reject rule sets the builders cannot work with
    pub fn validate(&self) -> HangerResult<()> {
        self.units.validate()?;
        for (name, value) in [
            ("close clamp distance", self.close_clamp_distance),
            ("coupling interval", self.coupling_interval),
            ("attachment cutoff", self.attachment_cutoff),
            ("fixture extra rod", self.fixture_extra_rod),
            ("max rod diameter", self.max_rod_diameter),
            ("tier tolerance", self.tier_tolerance),
            ("min curve length", self.min_curve_length),
        ] {
            if !(value >= 0.0) {
                return Err(HangerError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.max_tiers == 0 {
            return Err(HangerError::InvalidInput(
                "max tiers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Trade-size label for a diameter, falling back to the default size
    pub fn size_label(&self, diameter: Option<f64>) -> String {
        match diameter {
            Some(d) if d > 0.0 => self.units.size_label(d),
            _ => self.default_attachment_size.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let rules = ClassificationRules::default();
        assert_eq!(
            rules.anchor_for_category(&Category::Joist),
            Some(AnchorType::BeamClamp)
        );
        assert_eq!(rules.anchor_for_category(&Category::Wall), None);
        assert_eq!(rules.max_tiers, 4);
    }

    #[test]
    fn test_override_entry() {
        let rules = ClassificationRules::default()
            .with_anchor(Category::Joist, AnchorType::ConcreteAnchor)
            .with_anchor(Category::Ceiling, AnchorType::BeamClamp);
        assert_eq!(
            rules.anchor_for_category(&Category::Joist),
            Some(AnchorType::ConcreteAnchor)
        );
        assert_eq!(
            rules.anchor_for_category(&Category::Ceiling),
            Some(AnchorType::BeamClamp)
        );
    }

    #[test]
    fn test_size_label_fallback() {
        let rules = ClassificationRules::default();
        assert_eq!(rules.size_label(Some(2.0 / 12.0)), "2\"");
        assert_eq!(rules.size_label(None), "1/2\"");
    }

    #[test]
    fn test_validate_rejects_bad_units() {
        assert!(ClassificationRules::default().validate().is_ok());
        let rules: ClassificationRules = serde_json::from_str(
            r#"{"units": {"units_per_inch": 0.0833, "denominator": 0}}"#,
        )
        .unwrap();
        assert!(matches!(rules.validate(), Err(HangerError::InvalidInput(_))));

        let rules = ClassificationRules::default().with_close_clamp_distance(-1.0);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rules_deserialize_partial() {
        let rules: ClassificationRules =
            serde_json::from_str(r#"{"close_clamp_distance": 0.25}"#).unwrap();
        assert_eq!(rules.close_clamp_distance, 0.25);
        assert_eq!(rules.coupling_interval, 10.0);
    }
}
