use serde::Serialize;

use crate::ident::Id;
use crate::transform::{LogicleParams, Transform};

/// One measured channel: a named column of raw event values
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    id: Id,
    index: usize,
    short_name: String,
    stain_name: Option<String>,
    amplification: Amplification,
    range: Option<f64>,
    compensation_ref: Option<Id>,
    values: Vec<f64>,
    transform: Option<Transform>,
}

/// The two `$PnE` calibration fields (decades, offset)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Amplification {
    /// Number of logarithmic decades (0 for linear amplification)
    pub decades: f64,
    /// Linear value corresponding to channel 0 on a log amplifier
    pub offset: f64,
}

impl Amplification {
    /// Parse a `$PnE` value such as `"4,1"` or `"0,0"`
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(',').map(str::trim);
        let decades = parts.next()?.parse().ok()?;
        let offset = parts.next()?.parse().ok()?;
        Some(Self { decades, offset })
    }

    /// True when the detector was log-amplified
    pub fn is_logarithmic(&self) -> bool {
        self.decades > 0.0
    }
}

impl Dimension {
    /// Create a dimension with a fresh identity
    pub fn new(index: usize, short_name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::with_id(Id::new(), index, short_name, values)
    }

    /// Create a dimension that keeps a prior identity
    pub fn with_id(id: Id, index: usize, short_name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            id,
            index,
            short_name: short_name.into(),
            stain_name: None,
            amplification: Amplification::default(),
            range: None,
            compensation_ref: None,
            values,
            transform: None,
        }
    }

    /// Set the stain (long) name
    pub fn stain(mut self, stain_name: impl Into<String>) -> Self {
        let stain = stain_name.into();
        self.stain_name = if stain.trim().is_empty() { None } else { Some(stain) };
        self
    }

    /// Set the `$PnE` calibration fields
    pub fn amplification(mut self, amplification: Amplification) -> Self {
        self.amplification = amplification;
        self
    }

    /// Set the linear range hint
    pub fn range(mut self, range: Option<f64>) -> Self {
        self.range = range;
        self
    }

    /// Set the compensation reference
    pub fn compensation_ref(mut self, id: Option<Id>) -> Self {
        self.compensation_ref = id;
        self
    }

    /// Set the preferred transform
    pub fn transform(mut self, transform: Option<Transform>) -> Self {
        self.transform = transform;
        self
    }

    /// Stable identity
    pub fn id(&self) -> Id {
        self.id
    }

    /// 1-based parameter number in the source file
    pub fn index(&self) -> usize {
        self.index
    }

    /// Short (`$PnN`) name; unique within a frame
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Stain (`$PnS`) name, when declared
    pub fn stain_name(&self) -> Option<&str> {
        self.stain_name.as_deref()
    }

    /// Human label: `"<short> (<stain>)"` or just the short name
    pub fn display_name(&self) -> String {
        match &self.stain_name {
            Some(stain) => format!("{} ({})", self.short_name, stain),
            None => self.short_name.clone(),
        }
    }

    /// `$PnE` calibration fields
    pub fn amplification_fields(&self) -> Amplification {
        self.amplification
    }

    /// Declared instrument range (`$PnR`)
    pub fn range_hint(&self) -> Option<f64> {
        self.range
    }

    /// Id of the spillover matrix these values were compensated with
    pub fn compensation_id(&self) -> Option<Id> {
        self.compensation_ref
    }

    /// Raw values, one per event
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column holds no events
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Preferred display transform
    pub fn preferred_transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Values mapped through the preferred transform (raw values when unset)
    pub fn display_values(&self) -> Vec<f64> {
        match &self.transform {
            Some(t) => t.to_display_all(&self.values),
            None => self.values.clone(),
        }
    }

    pub(crate) fn set_transform(&mut self, transform: Option<Transform>) {
        self.transform = transform;
    }

    /// Replace the column; the caller guarantees the length is unchanged
    pub(crate) fn replace_values(&mut self, values: Vec<f64>, compensation_ref: Option<Id>) {
        debug_assert_eq!(values.len(), self.values.len());
        self.values = values;
        self.compensation_ref = compensation_ref;
    }
}

/// Pick the transform a freshly parsed dimension is displayed with.
///
/// Scatter and time channels stay linear over their range, log-amplified
/// detectors get a log scale and everything else gets Logicle.
pub fn default_transform(
    short_name: &str,
    range: Option<f64>,
    amplification: Amplification,
    logicle: LogicleParams,
) -> Option<Transform> {
    let upper = range.filter(|r| r.is_finite() && *r > 1.0);
    let name = short_name.to_ascii_uppercase();

    if name.starts_with("FSC") || name.starts_with("SSC") || name.starts_with("TIME") {
        return Transform::bounded(0.0, upper.unwrap_or(logicle.t)).ok();
    }
    if amplification.is_logarithmic() {
        return Transform::logarithmic(1.0, upper.unwrap_or(logicle.t)).ok();
    }
    let params = LogicleParams {
        t: upper.unwrap_or(logicle.t),
        ..logicle
    };
    Transform::logicle(params.t, params.w, params.m, params.a)
        .or_else(|_| Transform::logicle(logicle.t, logicle.w, logicle.m, logicle.a))
        .ok()
}
