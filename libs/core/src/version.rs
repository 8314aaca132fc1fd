use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use failure_derive::Fail;

/// A release of minecraft, like `1.13.2`.
///
/// The patch version is zero when it's omitted,
/// so `1.14` and `1.14.0` are the same version.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MinecraftVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}
impl MinecraftVersion {
    #[inline]
    pub fn new(major: u32, minor: u32, patch: u32) -> MinecraftVersion {
        MinecraftVersion { major, minor, patch }
    }
}
impl FromStr for MinecraftVersion {
    type Err = InvalidMinecraftVersion;

    fn from_str(s: &str) -> Result<Self, InvalidMinecraftVersion> {
        let error = || InvalidMinecraftVersion(s.into());
        let parts = s.split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(error)?;
        match parts[..] {
            [major, minor] => Ok(MinecraftVersion::new(major, minor, 0)),
            [major, minor, patch] => Ok(MinecraftVersion::new(major, minor, patch)),
            _ => Err(error()),
        }
    }
}
impl Display for MinecraftVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        Ok(())
    }
}
impl Serialize for MinecraftVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where
        S: Serializer {
        serializer.collect_str(self)
    }
}
impl<'de> Deserialize<'de> for MinecraftVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where
        D: Deserializer<'de> {
        struct VersionVisitor;
        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = MinecraftVersion;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a minecraft version")
            }

            fn visit_str<E>(self, v: &str) -> Result<MinecraftVersion, E> where
                E: de::Error, {
                MinecraftVersion::from_str(v).map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(VersionVisitor)
    }
}
#[derive(Debug, Fail)]
#[fail(display = "Invalid minecraft version {:?}", _0)]
pub struct InvalidMinecraftVersion(String);
