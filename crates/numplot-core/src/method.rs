use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Interpolation,
    Fit,
    Derivative,
    Minimum,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Self::Interpolation,
        Self::Fit,
        Self::Derivative,
        Self::Minimum,
    ];

    /// Human-readable name for form options.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Interpolation => "Linear interpolation",
            Self::Fit => "Quadratic fit",
            Self::Derivative => "Discrete derivative",
            Self::Minimum => "Minimum",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interpolation => write!(f, "interpolation"),
            Self::Fit => write!(f, "fit"),
            Self::Derivative => write!(f, "derivative"),
            Self::Minimum => write!(f, "minimum"),
        }
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The legacy form posted Spanish tokens; keep accepting them.
        match s.trim().to_lowercase().as_str() {
            "interpolation" | "interpolacion" => Ok(Self::Interpolation),
            "fit" | "ajuste" => Ok(Self::Fit),
            "derivative" | "derivada" => Ok(Self::Derivative),
            "minimum" | "optimizacion" => Ok(Self::Minimum),
            _ => Err(format!("invalid method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_legacy() {
        assert_eq!("fit".parse::<Method>().unwrap(), Method::Fit);
        assert_eq!("Derivative".parse::<Method>().unwrap(), Method::Derivative);
        assert_eq!(
            "interpolacion".parse::<Method>().unwrap(),
            Method::Interpolation
        );
        assert_eq!("optimizacion".parse::<Method>().unwrap(), Method::Minimum);
        assert!("spline".parse::<Method>().is_err());
    }

    #[test]
    fn test_display_roundtrips() {
        for m in Method::ALL {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
    }
}
