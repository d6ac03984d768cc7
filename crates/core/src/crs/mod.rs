//! Coordinate Reference System handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EPSG codes of the geographic (lon/lat) systems DEMs commonly arrive in
const GEOGRAPHIC_EPSG: &[u32] = &[4326, 4269, 4258, 4283, 4617, 4674, 4755];

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// PROJ string if available
    proj: Option<String>,
}

impl CRS {
    /// CRS with no identifying information
    pub const UNKNOWN: CRS = CRS {
        wkt: None,
        epsg: None,
        proj: None,
    };

    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            wkt: None,
            epsg: None,
            proj: Some(proj.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// WGS84 / UTM zone containing (lat, lon): EPSG 326xx north, 327xx south
    pub fn utm_for(lat: f64, lon: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u32;
        if lat >= 0.0 {
            Self::from_epsg(32600 + zone)
        } else {
            Self::from_epsg(32700 + zone)
        }
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Get PROJ string
    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// Whether coordinates are angular (degrees), making planar area meaningless
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            return GEOGRAPHIC_EPSG.contains(&code);
        }
        if let Some(proj) = &self.proj {
            return proj.contains("+proj=longlat") || proj.contains("+proj=latlong");
        }
        if let Some(wkt) = &self.wkt {
            let head = wkt.trim_start().to_ascii_uppercase();
            return head.starts_with("GEOGCS") || head.starts_with("GEOGCRS");
        }
        false
    }

    /// True when no EPSG code, WKT or PROJ string is set
    pub fn is_unknown(&self) -> bool {
        self.epsg.is_none() && self.proj.is_none() && self.wkt.is_none()
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }
        false
    }

    /// Short string identifier ("EPSG:32643", a PROJ string, or truncated WKT)
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", wkt.chars().take(50).collect::<String>());
        }
        "Unknown".to_string()
    }
}

impl FromStr for CRS {
    type Err = Error;

    /// Accepts `EPSG:<code>`, a bare EPSG code, a PROJ string or WKT.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let upper = s.to_ascii_uppercase();

        if let Some(code) = upper.strip_prefix("EPSG:") {
            return code
                .parse()
                .map(Self::from_epsg)
                .map_err(|_| Error::Configuration(format!("invalid EPSG code: {s}")));
        }
        if let Ok(code) = s.parse::<u32>() {
            return Ok(Self::from_epsg(code));
        }
        if s.starts_with('+') {
            return Ok(Self::from_proj(s));
        }
        if upper.starts_with("PROJCS")
            || upper.starts_with("GEOGCS")
            || upper.starts_with("PROJCRS")
            || upper.starts_with("GEOGCRS")
        {
            return Ok(Self::from_wkt(s));
        }
        Err(Error::Configuration(format!("unrecognised CRS: {s}")))
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs: CRS = "EPSG:32643".parse().unwrap();
        assert_eq!(crs.epsg(), Some(32643));
        assert_eq!(crs.identifier(), "EPSG:32643");
        assert!(!crs.is_geographic());
        assert!(CRS::wgs84().is_geographic());
    }

    #[test]
    fn test_utm_zone_estimate() {
        // Gurugram, India: zone 43N
        assert_eq!(CRS::utm_for(28.45, 77.02).epsg(), Some(32643));
        // Santiago, Chile: zone 19S
        assert_eq!(CRS::utm_for(-33.45, -70.66).epsg(), Some(32719));
        assert_eq!(CRS::utm_for(0.0, 180.0).epsg(), Some(32660));
    }

    #[test]
    fn test_geographic_detection_from_strings() {
        assert!(CRS::from_proj("+proj=longlat +datum=WGS84").is_geographic());
        assert!(CRS::from_wkt("GEOGCS[\"WGS 84\"]").is_geographic());
        assert!(!CRS::from_proj("+proj=utm +zone=43").is_geographic());
        assert!("not a crs".parse::<CRS>().is_err());
        assert!(CRS::UNKNOWN.is_unknown());
    }
}
