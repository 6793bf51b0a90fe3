//! Time points with the chain's date string forms.
//!
//! Dates print without a timezone suffix and are always UTC:
//! `2018-06-15T19:17:47.500` for microsecond-resolution [`TimePoint`],
//! `2018-06-15T19:17:47` for second-resolution [`TimePointSec`]. Parsing is
//! lenient about an optional fractional part and a trailing `Z`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use sable_codec::{Decode, Decoder, Encode, Encoder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

const FORMAT_MICRO: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const FORMAT_SEC: &str = "%Y-%m-%dT%H:%M:%S";
const FORMAT_PARSE: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn parse_utc(s: &str) -> Result<NaiveDateTime, ParseError> {
    let trimmed = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, FORMAT_PARSE)
        .map_err(|_| ParseError::InvalidTime(s.to_string()))
}

/// Microseconds since the Unix epoch, signed.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(i64);

impl TimePoint {
    pub const fn from_micros(us: i64) -> Self {
        TimePoint(us)
    }

    pub const fn micros(&self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        TimePoint(Utc::now().timestamp_micros())
    }

    fn to_datetime(self) -> DateTime<Utc> {
        // values outside chrono's representable span clamp to its bounds
        DateTime::from_timestamp_micros(self.0).unwrap_or(if self.0 < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format(FORMAT_MICRO))
    }
}

impl FromStr for TimePoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        Ok(TimePoint(parse_utc(s)?.and_utc().timestamp_micros()))
    }
}

impl From<TimePointSec> for TimePoint {
    fn from(tps: TimePointSec) -> Self {
        TimePoint(tps.0 as i64 * 1_000_000)
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimePoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encode for TimePoint {
    fn encode(&self, e: &mut Encoder) {
        e.i64(self.0);
    }
}

impl Decode for TimePoint {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(TimePoint(d.i64()?))
    }
}

/// Whole seconds since the Unix epoch, unsigned.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePointSec(u32);

impl TimePointSec {
    pub const fn from_secs(secs: u32) -> Self {
        TimePointSec(secs)
    }

    pub const fn secs(&self) -> u32 {
        self.0
    }

    pub fn now() -> Self {
        TimePointSec(Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32)
    }

    /// This time point moved forward by `secs`, saturating.
    pub fn after(&self, secs: u32) -> Self {
        TimePointSec(self.0.saturating_add(secs))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = DateTime::from_timestamp(self.0 as i64, 0).expect("u32 seconds are in range");
        write!(f, "{}", dt.format(FORMAT_SEC))
    }
}

impl FromStr for TimePointSec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let timestamp = parse_utc(s)?.and_utc().timestamp();
        if !(0..=u32::MAX as i64).contains(&timestamp) {
            return Err(ParseError::InvalidTime(s.to_string()));
        }
        Ok(TimePointSec(timestamp as u32))
    }
}

impl Serialize for TimePointSec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimePointSec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encode for TimePointSec {
    fn encode(&self, e: &mut Encoder) {
        e.u32(self.0);
    }
}

impl Decode for TimePointSec {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(TimePointSec(d.u32()?))
    }
}
