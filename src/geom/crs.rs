use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

static UTM_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UTM[_ ]ZONE[_ ](\d{1,2})([NS])").expect("static UTM pattern")
});

/// Coordinate reference system of a geometry set, either a known EPSG code
/// or a raw PROJ.4 definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crs {
    Epsg(u32),
    Proj4(String),
}

impl Crs {
    /// WGS84 lon/lat, the common system after ingestion.
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Build the PROJ.4 string for this CRS.
    pub fn proj4(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Epsg(4326) => Ok("+proj=longlat +datum=WGS84 +no_defs".into()),
            Self::Epsg(4269) => Ok("+proj=longlat +datum=NAD83 +no_defs".into()),
            Self::Epsg(4258) => Ok("+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs".into()),
            Self::Epsg(3857) => Ok(concat!(
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 ",
                "+units=m +nadgrids=@null +no_defs",
            ).into()),
            Self::Epsg(code) => Err(Error::Crs(format!("unsupported EPSG code {code}; pass a PROJ.4 string instead"))),
            Self::Proj4(definition) => Ok(definition.as_str().into()),
        }
    }

    /// Whether coordinates are lon/lat degrees (radians inside proj4rs).
    pub fn is_geographic(&self) -> bool {
        match self {
            Self::Epsg(code) => matches!(code, 4326 | 4269 | 4258),
            Self::Proj4(definition) => definition.split_whitespace()
                .any(|token| matches!(token, "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon")),
        }
    }

    /// Recognize the CRS of an ESRI `.prj` sidecar (WKT1).
    pub fn from_prj_wkt(wkt: &str) -> Result<Self> {
        let upper = wkt.trim().to_ascii_uppercase();
        let mentions = |needle: &str| upper.contains(needle);

        if mentions("WEB_MERCATOR") || mentions("PSEUDO_MERCATOR") || mentions("PSEUDO-MERCATOR") {
            return Ok(Self::Epsg(3857));
        }
        if upper.starts_with("PROJCS") {
            if let Some(utm) = Self::utm_from_wkt(&upper) { return Ok(utm) }
        }
        if upper.starts_with("GEOGCS") {
            if mentions("NORTH_AMERICAN_1983") || mentions("NAD83") { return Ok(Self::Epsg(4269)) }
            if mentions("ETRS") { return Ok(Self::Epsg(4258)) }
            if mentions("WGS_1984") || mentions("WGS 84") || mentions("WGS84") { return Ok(Self::WGS84) }
        }

        let head = wkt.trim().chars().take(60).collect::<String>();
        Err(Error::Crs(format!(
            "unrecognized .prj definition: {head}…; set `ranges.crs` or pass --range-crs with EPSG:<code> or a PROJ.4 string"
        )))
    }

    /// UTM zone on a WGS84 or NAD83 datum, from an upper-cased WKT string.
    fn utm_from_wkt(upper: &str) -> Option<Self> {
        let caps = UTM_ZONE.captures(upper)?;
        let zone = caps[1].parse::<u8>().ok().filter(|zone| (1..=60).contains(zone))?;
        let south = if &caps[2] == "S" { " +south" } else { "" };
        let datum = if ["NORTH_AMERICAN_1983", "NAD_1983", "NAD83"].iter().any(|d| upper.contains(d)) {
            "NAD83"
        } else if ["WGS_1984", "WGS 84", "WGS84"].iter().any(|d| upper.contains(d)) {
            "WGS84"
        } else {
            return None;
        };
        Some(Self::Proj4(format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs")))
    }
}

impl Default for Crs {
    fn default() -> Self { Self::WGS84 }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => write!(f, "EPSG:{code}"),
            Self::Proj4(definition) => f.write_str(definition),
        }
    }
}

impl FromStr for Crs {
    type Err = Error;

    /// Parse `EPSG:4326` (any case) or a `+proj=...` definition.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('+') {
            return Ok(Self::Proj4(s.to_string()));
        }

        let code = s.get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map(|_| &s[5..])
            .ok_or_else(|| Error::Crs(format!("expected `EPSG:<code>` or a PROJ.4 string, got {s:?}")))?;
        code.parse()
            .map(Self::Epsg)
            .map_err(|_| Error::Crs(format!("invalid EPSG code {code:?}")))
    }
}

impl Serialize for Crs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Crs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
