//! Support placement options

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::anchor::AttachmentKind;
use crate::error::{HangerError, HangerResult};

/// Options for one batch of support placement.
///
/// All lengths are in the host's linear unit (feet for the defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportOptions {
    /// Maximum distance between supports along a run
    pub nominal_spacing: f64,
    /// Distance kept between an end of a run and the first support
    pub bend_spacing: f64,
    /// Threaded rod diameter
    pub rod_diameter: f64,
    /// Longest strut line before a span warning is recorded
    pub max_strut_span: f64,
    /// Clearance between the outermost conduit and a strut rod
    pub inside_rod_gap: f64,
    /// Strut left past each rod
    pub outside_rod_extra: f64,
    /// Rods not longer than this are dropped
    pub min_rod_length: f64,
    /// Preferred attachment for single supports
    pub attachment: AttachmentKind,
    /// Hang from below: rays are cast downward
    pub ceiling_mode: bool,
    /// Strut channel size label
    pub strut_size: String,
}

impl Default for SupportOptions {
    fn default() -> Self {
        Self {
            nominal_spacing: 8.0,
            bend_spacing: 1.0,
            rod_diameter: 0.375 / 12.0,
            max_strut_span: 4.0,
            inside_rod_gap: 0.5 / 12.0,
            outside_rod_extra: 2.0 / 12.0,
            min_rod_length: 2.0 / 12.0,
            attachment: AttachmentKind::Clip,
            ceiling_mode: false,
            strut_size: "1 5/8\"".to_string(),
        }
    }
}

impl SupportOptions {
    /// Load options from a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> HangerResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> HangerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject option sets the builders cannot work with
    pub fn validate(&self) -> HangerResult<()> {
        if !(self.nominal_spacing > 0.0) {
            return Err(HangerError::InvalidInput(format!(
                "nominal spacing must be positive, got {}",
                self.nominal_spacing
            )));
        }
        if !(self.bend_spacing >= 0.0) {
            return Err(HangerError::InvalidInput(format!(
                "bend spacing must not be negative, got {}",
                self.bend_spacing
            )));
        }
        if !(self.rod_diameter > 0.0) {
            return Err(HangerError::InvalidInput(format!(
                "rod diameter must be positive, got {}",
                self.rod_diameter
            )));
        }
        for (name, value) in [
            ("max strut span", self.max_strut_span),
            ("inside rod gap", self.inside_rod_gap),
            ("outside rod extra", self.outside_rod_extra),
            ("min rod length", self.min_rod_length),
        ] {
            if !(value >= 0.0) {
                return Err(HangerError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Set nominal and bend spacing
    pub fn with_spacing(mut self, nominal: f64, bend: f64) -> Self {
        self.nominal_spacing = nominal;
        self.bend_spacing = bend;
        self
    }

    pub fn with_rod_diameter(mut self, diameter: f64) -> Self {
        self.rod_diameter = diameter;
        self
    }

    pub fn with_min_rod_length(mut self, length: f64) -> Self {
        self.min_rod_length = length;
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentKind) -> Self {
        self.attachment = attachment;
        self
    }

    /// Enable ceiling mode
    pub fn with_ceiling_mode(mut self) -> Self {
        self.ceiling_mode = true;
        self
    }

    /// Set strut clearances
    pub fn with_strut(mut self, max_span: f64, inside_gap: f64, outside_extra: f64) -> Self {
        self.max_strut_span = max_span;
        self.inside_rod_gap = inside_gap;
        self.outside_rod_extra = outside_extra;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SupportOptions::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let opts = SupportOptions::from_json_str(
            r#"{"nominal_spacing": 10.0, "ceiling_mode": true, "attachment": "clevis"}"#,
        )
        .unwrap();
        assert_eq!(opts.nominal_spacing, 10.0);
        assert!(opts.ceiling_mode);
        assert_eq!(opts.attachment, AttachmentKind::Clevis);
        assert_eq!(opts.bend_spacing, SupportOptions::default().bend_spacing);
    }

    #[test]
    fn test_invalid_spacing() {
        let err = SupportOptions::default().with_spacing(0.0, 1.0).validate();
        assert!(matches!(err, Err(HangerError::InvalidInput(_))));
        let err = SupportOptions::default().with_spacing(8.0, -1.0).validate();
        assert!(err.is_err());
        assert!(SupportOptions::from_json_str(r#"{"inside_rod_gap": -0.1}"#).is_err());
    }

    #[test]
    fn test_bad_json() {
        let err = SupportOptions::from_json_str("{not json");
        assert!(matches!(err, Err(HangerError::Serialization(_))));
    }
}
