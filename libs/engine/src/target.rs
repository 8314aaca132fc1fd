use std::fmt::{self, Display, Formatter, Write};
use std::str::FromStr;

use failure_derive::Fail;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// A naming scheme, with its own name for each class and member
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum MappingSystem {
    /// The obfuscated names, which unify all the other systems
    Obf,
    Srg,
    Mcp,
    Spigot,
    Intermediary,
    Yarn,
}
impl MappingSystem {
    pub const ALL: [MappingSystem; 6] = [
        MappingSystem::Obf,
        MappingSystem::Srg,
        MappingSystem::Mcp,
        MappingSystem::Spigot,
        MappingSystem::Intermediary,
        MappingSystem::Yarn,
    ];
    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            MappingSystem::Obf => "obf",
            MappingSystem::Srg => "srg",
            MappingSystem::Mcp => "mcp",
            MappingSystem::Spigot => "spigot",
            MappingSystem::Intermediary => "intermediary",
            MappingSystem::Yarn => "yarn",
        }
    }
    pub fn from_id(id: &str) -> Option<MappingSystem> {
        MappingSystem::ALL.iter().cloned().find(|system| system.id() == id)
    }
    #[inline]
    pub fn create_target(self, renamed: MappingSystem) -> TargetMapping {
        TargetMapping::new(self, renamed)
    }
}
impl FromStr for MappingSystem {
    type Err = UnknownMappingSystem;

    #[inline]
    fn from_str(s: &str) -> Result<Self, UnknownMappingSystem> {
        MappingSystem::from_id(s).ok_or_else(|| UnknownMappingSystem(s.into()))
    }
}
impl Display for MappingSystem {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Mappings from one system into another, written like `spigot2mcp-onlyobf`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TargetMapping {
    pub original: MappingSystem,
    pub renamed: MappingSystem,
    pub flags: TargetFlags,
}
impl TargetMapping {
    #[inline]
    pub const fn new(original: MappingSystem, renamed: MappingSystem) -> TargetMapping {
        TargetMapping { original, renamed, flags: TargetFlags::default() }
    }
    #[inline]
    pub const fn reversed(self) -> TargetMapping {
        TargetMapping { original: self.renamed, renamed: self.original, flags: self.flags }
    }
    #[inline]
    pub fn with_flags(mut self, flags: TargetFlags) -> TargetMapping {
        self.flags = flags;
        self
    }
    #[inline]
    pub fn with_default_flags(self) -> TargetMapping {
        self.with_flags(TargetFlags::default())
    }
}
impl FromStr for TargetMapping {
    type Err = InvalidTarget;

    fn from_str(s: &str) -> Result<Self, InvalidTarget> {
        let invalid_target = || InvalidTarget::Target(s.into());
        let first_dash = s.find('-');
        let first = first_dash.map_or(s, |index| &s[..index]);
        let mapping_separator = first.find('2').ok_or_else(invalid_target)?;
        let original = MappingSystem::from_id(&first[..mapping_separator])
            .ok_or_else(invalid_target)?;
        let renamed = MappingSystem::from_id(&first[(mapping_separator + 1)..])
            .ok_or_else(invalid_target)?;
        let flags = match first_dash {
            Some(dash) if dash + 1 < s.len() => TargetFlags::from_str(&s[(dash + 1)..])?,
            Some(_) => return Err(InvalidTarget::Flags(String::new())),
            None => TargetFlags::default(),
        };
        Ok(TargetMapping { original, renamed, flags })
    }
}
impl Display for TargetMapping {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}2{}", self.original, self.renamed)?;
        if !self.flags.is_default() {
            write!(f, "-{}", self.flags)?;
        }
        Ok(())
    }
}
impl<'de> Deserialize<'de> for TargetMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where
        D: Deserializer<'de> {
        struct TargetMappingVisitor;
        impl<'de> de::Visitor<'de> for TargetMappingVisitor {
            type Value = TargetMapping;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a target like spigot2mcp-onlyobf")
            }

            #[inline]
            fn visit_str<E>(self, s: &str) -> Result<TargetMapping, E> where
                E: de::Error, {
                TargetMapping::from_str(s).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(TargetMappingVisitor)
    }
}
impl Serialize for TargetMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where
        S: Serializer {
        serializer.collect_str(self)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TargetFlags {
    filter: Option<TargetFilter>,
    only_obf: bool,
}
impl TargetFlags {
    #[inline]
    pub const fn default() -> TargetFlags {
        TargetFlags { filter: None, only_obf: false }
    }
    #[inline]
    pub fn new(filter: Option<TargetFilter>, only_obf: bool) -> TargetFlags {
        TargetFlags { filter, only_obf }
    }
    #[inline]
    pub fn filter(&self) -> Option<TargetFilter> {
        self.filter
    }
    #[inline]
    pub fn only_obf(&self) -> bool {
        self.only_obf
    }
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == TargetFlags::default()
    }
}
impl Default for TargetFlags {
    #[inline]
    fn default() -> Self {
        TargetFlags::default()
    }
}
impl FromStr for TargetFlags {
    type Err = InvalidTarget;

    fn from_str(s: &str) -> Result<TargetFlags, InvalidTarget> {
        let mut result = TargetFlags::default();
        if s.is_empty() { return Ok(result) }
        let invalid_target = || InvalidTarget::Flags(s.into());
        for flag in s.split('-') {
            match flag {
                "classes" | "members" => {
                    if result.filter.is_some() { return Err(invalid_target()) }
                    result.filter = Some(if flag == "classes" {
                        TargetFilter::Classes
                    } else {
                        TargetFilter::Members
                    });
                },
                "onlyobf" => {
                    if result.only_obf { return Err(invalid_target()) }
                    result.only_obf = true;
                },
                _ => return Err(invalid_target())
            }
        }
        Ok(result)
    }
}
impl Display for TargetFlags {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.filter {
            None => {},
            Some(TargetFilter::Classes) => f.write_str("classes")?,
            Some(TargetFilter::Members) => f.write_str("members")?,
        }
        if self.only_obf {
            if self.filter.is_some() { f.write_char('-')? };
            f.write_str("onlyobf")?;
        }
        Ok(())
    }
}
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TargetFilter {
    Classes,
    Members,
}

#[derive(Debug, Fail)]
pub enum InvalidTarget {
    #[fail(display = "Invalid target {:?}", _0)]
    Target(String),
    #[fail(display = "Invalid flags {:?}", _0)]
    Flags(String),
}

#[derive(Debug, Fail)]
#[fail(display = "Unknown mapping system {:?}", _0)]
pub struct UnknownMappingSystem(String);
