//! Hardware totals - the merged bill of materials.
//!
//! Line items are keyed by category, type name and optional size and
//! diameter. Pushing the same key twice always lands on the same line item,
//! so the final totals do not depend on push order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::anchor::{attachment_for_diameter, AnchorType, AttachmentKind};
use crate::rules::ClassificationRules;
use crate::supports::SupportRecord;
use crate::units::LengthFormat;

/// Hardware category of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareCategory {
    Anchor,
    HexNut,
    SpringNut,
    Washer,
    LockWasher,
    RodCoupling,
    ThreadedRod,
    Strut,
    ConduitStrap,
    Attachment,
}

impl HardwareCategory {
    /// Categories whose line items sum length as well as count
    pub fn sums_length(&self) -> bool {
        matches!(self, Self::ThreadedRod | Self::Strut)
    }
}

/// Composite key of a line item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HardwareKey {
    pub category: HardwareCategory,
    pub type_name: String,
    pub size: Option<String>,
    pub diameter: Option<String>,
}

impl HardwareKey {
    pub fn sized(category: HardwareCategory, type_name: &str, size: &str) -> Self {
        Self {
            category,
            type_name: type_name.to_string(),
            size: Some(size.to_string()),
            diameter: None,
        }
    }

    pub fn with_diameter(category: HardwareCategory, type_name: &str, diameter: &str) -> Self {
        Self {
            category,
            type_name: type_name.to_string(),
            size: None,
            diameter: Some(diameter.to_string()),
        }
    }
}

/// Accumulated quantity of one line item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub count: u32,
    /// Total length, only meaningful for length-summing categories
    pub length: f64,
}

/// A line item as handed to the spreadsheet writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub key: HardwareKey,
    pub count: u32,
    pub length: f64,
}

/// Fastener counts used when deriving hardware from support records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareKit {
    pub hex_nuts_per_rod: u32,
    pub washers_per_rod: u32,
    pub lock_washers_per_rod: u32,
    /// Spring nuts holding each strut rod in the channel
    pub spring_nuts_per_strut_rod: u32,
}

impl Default for HardwareKit {
    fn default() -> Self {
        Self {
            hex_nuts_per_rod: 2,
            washers_per_rod: 1,
            lock_washers_per_rod: 1,
            spring_nuts_per_strut_rod: 1,
        }
    }
}

/// Bill of materials accumulator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareTotal {
    items: BTreeMap<HardwareKey, Quantity>,
}

impl HardwareTotal {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, key: HardwareKey, count: u32, length: f64) {
        let entry = self.items.entry(key).or_default();
        entry.count += count;
        entry.length += length;
    }

    pub fn push_anchor(&mut self, anchor: AnchorType, rod_size: &str, count: u32) {
        self.add(
            HardwareKey::sized(HardwareCategory::Anchor, anchor.name(), rod_size),
            count,
            0.0,
        );
    }

    pub fn push_hex_nut(&mut self, size: &str, count: u32) {
        self.add(HardwareKey::sized(HardwareCategory::HexNut, "Hex Nut", size), count, 0.0);
    }

    pub fn push_spring_nut(&mut self, size: &str, count: u32) {
        self.add(
            HardwareKey::sized(HardwareCategory::SpringNut, "Spring Nut", size),
            count,
            0.0,
        );
    }

    pub fn push_washer(&mut self, size: &str, count: u32) {
        self.add(HardwareKey::sized(HardwareCategory::Washer, "Washer", size), count, 0.0);
    }

    pub fn push_lock_washer(&mut self, size: &str, count: u32) {
        self.add(
            HardwareKey::sized(HardwareCategory::LockWasher, "Lock Washer", size),
            count,
            0.0,
        );
    }

    pub fn push_rod_coupling(&mut self, size: &str, count: u32) {
        self.add(
            HardwareKey::sized(HardwareCategory::RodCoupling, "Rod Coupling", size),
            count,
            0.0,
        );
    }

    /// Add one piece of threaded rod
    pub fn push_threaded_rod(&mut self, diameter: &str, length: f64) {
        self.add(
            HardwareKey::with_diameter(HardwareCategory::ThreadedRod, "Threaded Rod", diameter),
            1,
            length,
        );
    }

    /// Add one piece of strut channel
    pub fn push_strut(&mut self, size: &str, length: f64) {
        self.add(HardwareKey::sized(HardwareCategory::Strut, "Strut", size), 1, length);
    }

    pub fn push_conduit_strap(&mut self, diameter: &str, count: u32) {
        self.add(
            HardwareKey::with_diameter(HardwareCategory::ConduitStrap, "Conduit Strap", diameter),
            count,
            0.0,
        );
    }

    /// Add an attachment whose kind is already resolved
    pub fn push_attachment(&mut self, kind: AttachmentKind, size: &str, count: u32) {
        self.add(
            HardwareKey::sized(HardwareCategory::Attachment, kind.name(), size),
            count,
            0.0,
        );
    }

    /// Add an attachment for a conduit of the given diameter, applying the
    /// large-clip cutoff
    pub fn push_attachment_for(
        &mut self,
        preferred: AttachmentKind,
        diameter: Option<f64>,
        rules: &ClassificationRules,
    ) {
        let kind = attachment_for_diameter(preferred, diameter, rules);
        self.push_attachment(kind, &rules.size_label(diameter), 1);
    }

    /// Look up a line item
    pub fn get(&self, key: &HardwareKey) -> Option<&Quantity> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line items ordered by key
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items
            .iter()
            .map(|(key, q)| LineItem {
                key: key.clone(),
                count: q.count,
                length: q.length,
            })
            .collect()
    }

    /// Total count over every line item of a category
    pub fn category_count(&self, category: HardwareCategory) -> u32 {
        self.items
            .iter()
            .filter(|(k, _)| k.category == category)
            .map(|(_, q)| q.count)
            .sum()
    }

    /// Fold another total into this one
    pub fn merge(&mut self, other: &HardwareTotal) {
        for (key, q) in &other.items {
            self.add(key.clone(), q.count, q.length);
        }
    }

    /// Drop line items with nothing in them
    pub fn prune_zero(&mut self) {
        self.items
            .retain(|key, q| q.count > 0 && (!key.category.sums_length() || q.length > 0.0));
    }

    /// Derive the hardware for a batch of supports. Empty lines are pruned.
    pub fn from_supports(
        supports: &[SupportRecord],
        rules: &ClassificationRules,
        kit: &HardwareKit,
    ) -> Self {
        let mut total = Self::new();
        for support in supports {
            total.push_support(support, rules, kit);
        }
        total.prune_zero();
        total
    }

    fn push_rod(&mut self, anchor: AnchorType, rod_size: &str, length: f64, kit: &HardwareKit) {
        if !anchor.is_none() {
            self.push_anchor(anchor, rod_size, 1);
        }
        if length > 0.0 {
            self.push_threaded_rod(rod_size, length);
        }
        self.push_hex_nut(rod_size, kit.hex_nuts_per_rod);
        self.push_washer(rod_size, kit.washers_per_rod);
        self.push_lock_washer(rod_size, kit.lock_washers_per_rod);
    }

    /// Add the hardware of one support
    pub fn push_support(
        &mut self,
        support: &SupportRecord,
        rules: &ClassificationRules,
        kit: &HardwareKit,
    ) {
        match support {
            SupportRecord::Single(s) => {
                let rod = rules.units.size_label(s.rod_diameter);
                self.push_rod(s.anchor_type, &rod, s.rod_length, kit);
                self.push_rod_coupling(&rod, s.coupling_count);
                self.push_attachment(s.attachment, &s.attachment_size, 1);
            }
            SupportRecord::Fixture(s) => {
                let rod = rules.units.size_label(s.rod_diameter);
                self.push_rod(s.anchor_type, &rod, s.rod_length, kit);
                self.push_rod_coupling(&rod, s.coupling_count);
            }
            SupportRecord::Strut(s) => {
                let rod = rules.units.size_label(s.rod_diameter);
                for (anchor, length) in s.anchor_types.iter().zip(s.rod_lengths) {
                    self.push_rod(*anchor, &rod, length, kit);
                    self.push_spring_nut(&rod, kit.spring_nuts_per_strut_rod);
                }
                self.push_rod_coupling(&rod, s.coupling_count);
                self.push_strut(&s.strut_size, s.strut_length);
                for strap in &s.straps {
                    self.push_conduit_strap(&strap.diameter, strap.count);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Point3};
    use crate::segment::ElementId;
    use crate::supports::{ConduitStrap, SingleSupport, StrutSupport};
    use approx::assert_relative_eq;

    fn washer_key() -> HardwareKey {
        HardwareKey::sized(HardwareCategory::Washer, "Washer", "1/4\"")
    }

    #[test]
    fn test_same_key_collapses() {
        let mut total = HardwareTotal::new();
        for _ in 0..3 {
            total.push_washer("1/4\"", 1);
        }
        assert_eq!(total.len(), 1);
        assert_eq!(total.get(&washer_key()).unwrap().count, 3);
    }

    #[test]
    fn test_push_order_does_not_matter() {
        let mut a = HardwareTotal::new();
        a.push_washer("1/4\"", 1);
        a.push_threaded_rod("3/8\"", 4.0);
        a.push_hex_nut("3/8\"", 2);
        a.push_threaded_rod("3/8\"", 6.5);

        let mut b = HardwareTotal::new();
        b.push_threaded_rod("3/8\"", 6.5);
        b.push_hex_nut("3/8\"", 2);
        b.push_threaded_rod("3/8\"", 4.0);
        b.push_washer("1/4\"", 1);

        assert_eq!(a, b);
        let rod =
            HardwareKey::with_diameter(HardwareCategory::ThreadedRod, "Threaded Rod", "3/8\"");
        let q = a.get(&rod).unwrap();
        assert_eq!(q.count, 2);
        assert_relative_eq!(q.length, 10.5);
    }

    #[test]
    fn test_size_and_diameter_are_distinct_keys() {
        let mut total = HardwareTotal::new();
        total.push_conduit_strap("2\"", 1);
        total.push_conduit_strap("1\"", 1);
        total.push_conduit_strap("2\"", 3);
        assert_eq!(total.len(), 2);
        assert_eq!(total.category_count(HardwareCategory::ConduitStrap), 5);
    }

    #[test]
    fn test_merge_and_prune() {
        let mut a = HardwareTotal::new();
        a.push_washer("1/4\"", 2);
        a.push_rod_coupling("3/8\"", 0);

        let mut b = HardwareTotal::new();
        b.push_washer("1/4\"", 1);
        b.push_strut("1 5/8\"", 0.0);

        a.merge(&b);
        assert_eq!(a.get(&washer_key()).unwrap().count, 3);
        assert_eq!(a.len(), 3);
        a.prune_zero();
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_attachment_sub_typing() {
        let rules = ClassificationRules::default();
        let mut total = HardwareTotal::new();
        total.push_attachment_for(AttachmentKind::Clip, Some(1.0 / 12.0), &rules);
        total.push_attachment_for(AttachmentKind::Clip, Some(3.0 / 12.0), &rules);
        let large = HardwareKey::sized(HardwareCategory::Attachment, "Large Conduit Clip", "3\"");
        let small = HardwareKey::sized(HardwareCategory::Attachment, "Conduit Clip", "1\"");
        assert_eq!(total.get(&large).unwrap().count, 1);
        assert_eq!(total.get(&small).unwrap().count, 1);
    }

    #[test]
    fn test_from_supports() {
        let rules = ClassificationRules::default();
        let kit = HardwareKit::default();
        let rod_diameter = 0.375 / 12.0;
        let single = SupportRecord::Single(SingleSupport {
            origin: Point3::origin(),
            rod_length: 12.0,
            rod_diameter,
            coupling_count: 1,
            attachment: AttachmentKind::Clip,
            attachment_size: "1\"".into(),
            anchor_type: AnchorType::ConcreteAnchor,
            host: ElementId(1),
            linked_placement: None,
        });
        let strut = SupportRecord::Strut(StrutSupport {
            origin: Point3::origin(),
            rod_lengths: [3.0, 1.0],
            rod_diameter,
            coupling_count: 0,
            strut_line: Line::from_coords([0.0; 3], [1.5, 0.0, 0.0]),
            strut_size: "1 5/8\"".into(),
            strut_length: 1.8,
            tier_spacings: Vec::new(),
            anchor_types: [AnchorType::BeamClamp, AnchorType::None],
            straps: vec![ConduitStrap {
                diameter: "2\"".into(),
                count: 2,
            }],
            linked_placement: None,
        });

        let total = HardwareTotal::from_supports(&[single, strut], &rules, &kit);
        assert_eq!(total.category_count(HardwareCategory::Anchor), 2);
        assert_eq!(total.category_count(HardwareCategory::HexNut), 6);
        assert_eq!(total.category_count(HardwareCategory::SpringNut), 2);
        assert_eq!(total.category_count(HardwareCategory::RodCoupling), 1);
        assert_eq!(total.category_count(HardwareCategory::ConduitStrap), 2);
        assert_eq!(total.category_count(HardwareCategory::Attachment), 1);

        let rod =
            HardwareKey::with_diameter(HardwareCategory::ThreadedRod, "Threaded Rod", "3/8\"");
        let q = total.get(&rod).unwrap();
        assert_eq!(q.count, 3);
        assert_relative_eq!(q.length, 16.0);

        let strut = HardwareKey::sized(HardwareCategory::Strut, "Strut", "1 5/8\"");
        assert_relative_eq!(total.get(&strut).unwrap().length, 1.8);
    }
}
