//! Interpolation kinds attached to timeline points.

use serde::{Deserialize, Serialize};

/// How the curve travels from a point to the next one.
///
/// The kind of the *earlier* point of a segment decides the interpolation
/// of that segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationKind {
    /// Hold the value until the next point.
    Constant,
    /// Straight fade to the next point.
    Linear,
    /// Sigmoid (smoothstep) fade to the next point.
    Smooth,
    /// Smoothstep blend between the tangent lines of both points.
    Symmetric,
    /// Classic cubic Hermite basis using both point tangents.
    Hermite,
    /// Four-sample spline, symmetric variant.
    Spline4Sym,
    /// Four-sample spline.
    Spline4,
    /// Six-sample spline.
    Spline6,
}

impl InterpolationKind {
    /// All evaluable kinds, in archive table order.
    pub const ALL: [InterpolationKind; 8] = [
        InterpolationKind::Constant,
        InterpolationKind::Linear,
        InterpolationKind::Smooth,
        InterpolationKind::Symmetric,
        InterpolationKind::Hermite,
        InterpolationKind::Spline4Sym,
        InterpolationKind::Spline4,
        InterpolationKind::Spline6,
    ];

    /// User-facing name.
    pub fn name(self) -> &'static str {
        match self {
            InterpolationKind::Constant => "Constant",
            InterpolationKind::Linear => "Linear",
            InterpolationKind::Smooth => "Smooth",
            InterpolationKind::Symmetric => "Symmetric",
            InterpolationKind::Hermite => "Hermite",
            InterpolationKind::Spline4Sym => "Spline (4, symmetric)",
            InterpolationKind::Spline4 => "Spline (4)",
            InterpolationKind::Spline6 => "Spline (6)",
        }
    }

    /// Name written to archives. These must never change.
    pub fn persistent_name(self) -> &'static str {
        match self {
            InterpolationKind::Constant => "constant",
            InterpolationKind::Linear => "linear",
            InterpolationKind::Smooth => "smooth",
            InterpolationKind::Symmetric => "symmetric",
            InterpolationKind::Hermite => "hermite",
            InterpolationKind::Spline4Sym => "spline4sym",
            InterpolationKind::Spline4 => "spline4",
            InterpolationKind::Spline6 => "spline6",
        }
    }

    /// Kind for a persistent name. Unknown names map to `Linear`.
    pub fn from_persistent_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.persistent_name() == name)
            .unwrap_or(InterpolationKind::Linear)
    }

    /// Whether evaluation reads the point tangents, and therefore whether
    /// tangents are derived automatically.
    #[inline]
    pub fn uses_tangent(self) -> bool {
        matches!(
            self,
            InterpolationKind::Symmetric | InterpolationKind::Hermite
        )
    }
}

impl std::fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind requested when inserting a point.
///
/// `Inherit` only exists at insertion time: the timeline resolves it to the
/// kind of the preceding point before anything is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindRequest {
    /// Use the kind of the point preceding the insertion time.
    #[default]
    Inherit,
    /// Use this kind.
    Kind(InterpolationKind),
}

impl From<InterpolationKind> for KindRequest {
    fn from(kind: InterpolationKind) -> Self {
        KindRequest::Kind(kind)
    }
}

impl From<Option<InterpolationKind>> for KindRequest {
    fn from(kind: Option<InterpolationKind>) -> Self {
        kind.map_or(KindRequest::Inherit, KindRequest::Kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_names_roundtrip() {
        for kind in InterpolationKind::ALL {
            assert_eq!(
                InterpolationKind::from_persistent_name(kind.persistent_name()),
                kind
            );
        }
    }

    #[test]
    fn test_unknown_name_is_linear() {
        assert_eq!(
            InterpolationKind::from_persistent_name("bezier"),
            InterpolationKind::Linear
        );
    }

    #[test]
    fn test_serde_uses_persistent_names() {
        for kind in InterpolationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.persistent_name()));
        }
    }

    #[test]
    fn test_tangent_kinds() {
        let tangent_kinds: Vec<_> = InterpolationKind::ALL
            .into_iter()
            .filter(|k| k.uses_tangent())
            .collect();
        assert_eq!(
            tangent_kinds,
            vec![InterpolationKind::Symmetric, InterpolationKind::Hermite]
        );
    }

    #[test]
    fn test_request_conversion() {
        assert_eq!(KindRequest::from(None), KindRequest::Inherit);
        assert_eq!(
            KindRequest::from(Some(InterpolationKind::Smooth)),
            KindRequest::Kind(InterpolationKind::Smooth)
        );
    }
}
