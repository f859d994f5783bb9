//! JSON documents describing a whole timeline.

use serde::{Deserialize, Serialize};

use super::{ConfigError, InterpolationKind, KindRequest, TimelineConfig};
use crate::compute::{Timeline, TimelineError, ValueVector};

/// Errors raised while loading a timeline document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid limits: {0}")]
    Dimension(#[from] TimelineError),
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// One point of a [`TimelineDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpec {
    pub time: f64,
    pub value: ValueVector,
    /// Missing kinds are inherited from the preceding point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<InterpolationKind>,
    /// Overrides the automatic tangent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent: Option<ValueVector>,
}

/// Human-authored description of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub dimensions: usize,
    #[serde(default)]
    pub config: TimelineConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<ValueVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<ValueVector>,
    #[serde(default)]
    pub points: Vec<PointSpec>,
}

impl TimelineDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the timeline.
    ///
    /// Points are added in document order, so a point without a kind
    /// inherits from the points listed before it. Automatic tangents are
    /// computed once all points are present; explicit tangents are applied
    /// last. Duplicate times keep the first entry.
    pub fn into_timeline(&self) -> Result<Timeline, DocumentError> {
        self.config.validate()?;

        let mut timeline = Timeline::with_config(self.dimensions, self.config);
        if let Some(lower) = &self.lower_limit {
            timeline.set_lower_limit(lower.clone())?;
        }
        if let Some(upper) = &self.upper_limit {
            timeline.set_upper_limit(upper.clone())?;
        }

        let mut explicit = Vec::new();
        for spec in &self.points {
            let request = KindRequest::from(spec.kind);
            match timeline.add(spec.time, spec.value.clone(), request) {
                Some(handle) => {
                    if let Some(tangent) = &spec.tangent {
                        explicit.push((handle, tangent.clone()));
                    }
                }
                None => log::warn!("Skipping duplicate point at {}s", spec.time),
            }
        }

        timeline.recompute_tangents();
        for (handle, tangent) in explicit {
            timeline.set_tangent(handle, tangent);
        }

        log::debug!(
            "Loaded timeline document: {} point(s), {} dimension(s)",
            timeline.len(),
            timeline.dimensions()
        );
        Ok(timeline)
    }

    /// Describe an existing timeline. Tangents are recorded for the kinds
    /// that read them.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let points = timeline
            .points()
            .map(|p| PointSpec {
                time: p.time,
                value: p.value.clone(),
                kind: Some(p.kind),
                tangent: p.kind.uses_tangent().then(|| p.tangent.clone()),
            })
            .collect();

        Self {
            dimensions: timeline.dimensions(),
            config: *timeline.config(),
            lower_limit: timeline.lower_limit().cloned(),
            upper_limit: timeline.upper_limit().cloned(),
            points,
        }
    }

    /// Small two-component document used by `keyline --example`.
    pub fn example() -> Self {
        let point = |time: f64, value: [f64; 2], kind| PointSpec {
            time,
            value: value.into(),
            kind: Some(kind),
            tangent: None,
        };

        Self {
            dimensions: 2,
            config: TimelineConfig::default(),
            lower_limit: Some(ValueVector::from([0.0, -1.0])),
            upper_limit: None,
            points: vec![
                point(0.0, [0.0, 0.0], InterpolationKind::Smooth),
                point(1.0, [1.0, 0.5], InterpolationKind::Symmetric),
                point(2.5, [0.25, -0.5], InterpolationKind::Spline4),
                point(4.0, [0.75, 1.0], InterpolationKind::Constant),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let doc = TimelineDocument::from_json(
            r#"{
                "dimensions": 1,
                "points": [
                    { "time": 0.0, "value": [0.0], "kind": "linear" },
                    { "time": 1.0, "value": [10.0] }
                ]
            }"#,
        )
        .unwrap();
        let tl = doc.into_timeline().unwrap();
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.get(0.5)[0], 5.0);
        // Inherited from the point before it.
        assert_eq!(tl.find(1.0).unwrap().kind, InterpolationKind::Linear);
    }

    #[test]
    fn test_auto_tangents_see_all_points() {
        let doc = TimelineDocument::from_json(
            r#"{
                "dimensions": 1,
                "points": [
                    { "time": 0.0, "value": [0.0], "kind": "symmetric" },
                    { "time": 1.0, "value": [2.0], "kind": "symmetric" }
                ]
            }"#,
        )
        .unwrap();
        let tl = doc.into_timeline().unwrap();
        // Previous synthetic (-1, 0) and next (1, 2).
        assert!((tl.find(0.0).unwrap().tangent[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_tangent_wins() {
        let doc = TimelineDocument {
            dimensions: 1,
            config: TimelineConfig::default(),
            lower_limit: None,
            upper_limit: None,
            points: vec![PointSpec {
                time: 0.0,
                value: ValueVector::from([1.0]),
                kind: Some(InterpolationKind::Hermite),
                tangent: Some(ValueVector::from([3.0])),
            }],
        };
        let tl = doc.into_timeline().unwrap();
        assert_eq!(tl.find(0.0).unwrap().tangent[0], 3.0);
    }

    #[test]
    fn test_bad_limits_rejected() {
        let mut doc = TimelineDocument::example();
        doc.lower_limit = Some(ValueVector::from([0.0]));
        assert!(matches!(
            doc.into_timeline(),
            Err(DocumentError::Dimension(_))
        ));
    }

    #[test]
    fn test_bad_config_rejected() {
        let mut doc = TimelineDocument::example();
        doc.config.derivative_step = 0.0;
        assert!(matches!(doc.into_timeline(), Err(DocumentError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TimelineDocument::from_json("{ \"dimensions\": "),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_timeline_round_trip() {
        let tl = TimelineDocument::example().into_timeline().unwrap();
        let doc = TimelineDocument::from_timeline(&tl);
        let json = doc.to_json_pretty().unwrap();
        let back = TimelineDocument::from_json(&json)
            .unwrap()
            .into_timeline()
            .unwrap();

        assert_eq!(tl.len(), back.len());
        for (a, b) in tl.points().zip(back.points()) {
            assert_eq!(a.time, b.time);
            assert_eq!(a.kind, b.kind);
            assert!(a.value.approx_eq(&b.value, 1e-12));
            assert!(a.tangent.approx_eq(&b.tangent, 1e-12));
        }
        assert_eq!(tl.lower_limit(), back.lower_limit());
        for t in [-1.0, 0.3, 1.7, 3.0, 5.0] {
            assert!(tl.get(t).approx_eq(&back.get(t), 1e-9));
        }
    }
}
