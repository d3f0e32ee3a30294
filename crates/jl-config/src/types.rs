use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// HumanDuration
// ---------------------------------------------------------------------------

/// A duration written as `"10ms"`, `"2s"`, `"5m"`, `"1h"` or `"1d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(Duration);

impl HumanDuration {
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for HumanDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl From<HumanDuration> for Duration {
    fn from(hd: HumanDuration) -> Self {
        hd.0
    }
}

impl FromStr for HumanDuration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("empty duration string");
        }
        let (num_part, suffix) = split_number_suffix(s)?;
        let value: u64 = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid number in duration: {s:?}"))?;

        let millis = match suffix {
            "ms" => value,
            "s" => value * 1_000,
            "m" => value * 60_000,
            "h" => value * 3_600_000,
            "d" => value * 86_400_000,
            _ => anyhow::bail!(
                "unsupported duration suffix {suffix:?} in {s:?} (expected ms/s/m/h/d)"
            ),
        };
        Ok(Self(Duration::from_millis(millis)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0.as_millis();
        const UNITS: [(u128, &str); 4] = [
            (86_400_000, "d"),
            (3_600_000, "h"),
            (60_000, "m"),
            (1_000, "s"),
        ];
        if ms == 0 {
            return write!(f, "0ms");
        }
        match UNITS.iter().find(|(unit, _)| ms.is_multiple_of(*unit)) {
            Some((unit, suffix)) => write!(f, "{}{}", ms / unit, suffix),
            None => write!(f, "{ms}ms"),
        }
    }
}

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ByteSize
// ---------------------------------------------------------------------------

/// A storage quota written as `"512B"`, `"64KB"`, `"5MB"` or `"1GB"`
/// (case-insensitive, binary multiples).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(usize);

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

impl ByteSize {
    pub fn as_bytes(&self) -> usize {
        self.0
    }
}

impl From<usize> for ByteSize {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

impl FromStr for ByteSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.is_empty() {
            anyhow::bail!("empty byte-size string");
        }
        let (num_part, suffix) = split_number_suffix(&upper)?;
        let value: usize = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid number in byte-size: {s:?}"))?;
        let unit = match suffix {
            "B" => 1,
            "KB" => KB,
            "MB" => MB,
            "GB" => GB,
            _ => anyhow::bail!(
                "unsupported byte-size suffix {suffix:?} in {s:?} (expected B/KB/MB/GB)"
            ),
        };
        value
            .checked_mul(unit)
            .map(Self)
            .ok_or_else(|| anyhow::anyhow!("byte-size {s:?} overflows"))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        match [(GB, "GB"), (MB, "MB"), (KB, "KB")]
            .into_iter()
            .find(|(unit, _)| b != 0 && b.is_multiple_of(*unit))
        {
            Some((unit, suffix)) => write!(f, "{}{}", b / unit, suffix),
            None => write!(f, "{b}B"),
        }
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SettleMode
// ---------------------------------------------------------------------------

/// How long history recording stays suppressed after an undo/redo.
///
/// `"explicit"` waits for the caller to resume recording once its reactive
/// update has settled; a duration string (e.g. `"10ms"`) resumes
/// automatically after that long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettleMode {
    #[default]
    Explicit,
    Delay(HumanDuration),
}

impl FromStr for SettleMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "explicit" => Ok(SettleMode::Explicit),
            other => other
                .parse()
                .map(SettleMode::Delay)
                .map_err(|e| anyhow::anyhow!("settle must be \"explicit\" or a duration: {e}")),
        }
    }
}

impl fmt::Display for SettleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettleMode::Explicit => write!(f, "explicit"),
            SettleMode::Delay(d) => write!(f, "{d}"),
        }
    }
}

impl Serialize for SettleMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SettleMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// StorageBackend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process map that lives as long as the editor session.
    #[default]
    Memory,
    /// One JSON file per key under a session directory.
    File,
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Split `"30ms"` into `("30", "ms")`.
fn split_number_suffix(s: &str) -> anyhow::Result<(&str, &str)> {
    let idx = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("missing suffix in {s:?}"))?;
    if idx == 0 {
        anyhow::bail!("missing numeric part in {s:?}");
    }
    Ok((&s[..idx], &s[idx..]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_units() {
        let cases = [
            ("10ms", Duration::from_millis(10), "10ms"),
            ("1500ms", Duration::from_millis(1500), "1500ms"),
            ("2000ms", Duration::from_secs(2), "2s"),
            ("90s", Duration::from_secs(90), "90s"),
            ("5m", Duration::from_secs(300), "5m"),
            ("48h", Duration::from_secs(48 * 3600), "2d"),
            ("0s", Duration::ZERO, "0ms"),
        ];
        for (input, expected, display) in cases {
            let d: HumanDuration = input.parse().unwrap();
            assert_eq!(d.as_duration(), expected, "{input}");
            assert_eq!(d.to_string(), display, "{input}");
        }
    }

    #[test]
    fn duration_errors() {
        for bad in ["", "30", "30x", "ms", "1.5s"] {
            assert!(bad.parse::<HumanDuration>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn bytesize_units() {
        let b: ByteSize = "5mb".parse().unwrap();
        assert_eq!(b.as_bytes(), 5 * MB);
        assert_eq!(b.to_string(), "5MB");
        let b: ByteSize = "1024B".parse().unwrap();
        assert_eq!(b.to_string(), "1KB");
        let b: ByteSize = "100B".parse().unwrap();
        assert_eq!(b.to_string(), "100B");
        assert_eq!(ByteSize::from(0).to_string(), "0B");
    }

    #[test]
    fn bytesize_errors() {
        assert!("".parse::<ByteSize>().is_err());
        assert!("5TB".parse::<ByteSize>().is_err());
        assert!("KB".parse::<ByteSize>().is_err());
    }

    #[test]
    fn settle_mode_parse() {
        assert_eq!("explicit".parse::<SettleMode>().unwrap(), SettleMode::Explicit);
        assert_eq!(
            "10ms".parse::<SettleMode>().unwrap(),
            SettleMode::Delay(Duration::from_millis(10).into())
        );
        assert!("soon".parse::<SettleMode>().is_err());
    }

    #[test]
    fn serde_roundtrip_settle_mode() {
        let m = SettleMode::Delay("250ms".parse().unwrap());
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"250ms\"");
        let back: SettleMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
