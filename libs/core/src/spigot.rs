//! Spigot's mappings, read from a local checkout of its BuildData repository.
use std::fs::{self, File};
use std::path::Path;

use failure::Error;
use failure_derive::Fail;
use indexmap::IndexMap;
use log::debug;
use serde_derive::Deserialize;

use crate::format::{is_ignored_line, CompactSrgMappingsFormat, MappingsFormat};
use crate::mappings::Mappings;

/// The package that classes in the default package are moved into
pub const SERVER_PACKAGE: &str = "net/minecraft/server";

/// Syntax errors in the BuildData files that SpecialSource silently ignores
const BROKEN_LINES: &[&str] = &[
    "IDispenseBehavior a(LISourceBlock;LItemStack;)LItemStack; dispense",
    "nv ServerStatisticManager#",
    "ql ServerStatisticManager#",
    "qn ServerStatisticManager#",
];

fn strip_broken_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !BROKEN_LINES.contains(line) && !line.contains("<init>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip the invalid lines in the 1.8.8 class data, which all contain dots
fn sanitize_class_data(text: &str) -> String {
    text.lines()
        .filter(|line| !line.contains('.'))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Fail)]
#[fail(display = "Not a package: {:?}", _0)]
pub struct InvalidPackageMapping(String);

/// Parse the package renames, converting them into internal names
/// with the trailing slash removed.
///
/// The default package is written as `./`, so it becomes the empty string.
pub fn parse_package_mappings(text: &str) -> Result<IndexMap<String, String>, InvalidPackageMapping> {
    let mut result = IndexMap::new();
    for line in text.lines() {
        if is_ignored_line(line) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 || !parts[0].ends_with('/') || !parts[1].ends_with('/') {
            return Err(InvalidPackageMapping(line.into()));
        }
        let clean = |package: &str| {
            let package = &package[..(package.len() - 1)];
            let package = if package.starts_with('.') { &package[1..] } else { package };
            package.replace('.', "/")
        };
        result.insert(clean(parts[0]), clean(parts[1]));
    }
    Ok(result)
}

/// The `info.json` file at the root of BuildData
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDataInfo {
    pub minecraft_version: String,
    pub class_mappings: String,
    pub member_mappings: String,
    #[serde(default)]
    pub package_mappings: Option<String>,
}

/// Contains all the mappings for a specific version
#[derive(Debug)]
pub struct SpigotMappings {
    pub class_mappings: Mappings,
    pub member_mappings: Mappings,
    pub chained_mappings: Mappings,
}
impl SpigotMappings {
    /// Parse the raw compact SRG class and member data.
    ///
    /// Without explicit package mappings,
    /// the classes in the default package are moved into [`SERVER_PACKAGE`].
    pub fn parse(class_data: &str, member_data: &str, package_data: Option<&str>) -> Result<SpigotMappings, Error> {
        let class_mappings = CompactSrgMappingsFormat::parse_text(
            &sanitize_class_data(&strip_broken_lines(class_data))
        )?;
        let member_mappings = CompactSrgMappingsFormat::parse_text(&strip_broken_lines(member_data))?;
        let packages = match package_data {
            Some(text) => parse_package_mappings(text)?,
            None => {
                let mut packages = IndexMap::new();
                packages.insert(String::new(), SERVER_PACKAGE.to_string());
                packages
            }
        };
        let chained_mappings = class_mappings.chain(&member_mappings)?
            .transform_packages(|package| packages.get(package).cloned())?;
        debug!(
            "Loaded {} spigot classes, {} fields and {} methods",
            chained_mappings.class_count(), chained_mappings.field_count(), chained_mappings.method_count()
        );
        Ok(SpigotMappings { class_mappings, member_mappings, chained_mappings })
    }
    /// Load the mappings from a BuildData checkout, as described by its `info.json`
    pub fn load(build_data: &Path) -> Result<SpigotMappings, Error> {
        let info: BuildDataInfo = ::serde_json::from_reader(File::open(build_data.join("info.json"))?)?;
        debug!("Loading spigot BuildData for {}", info.minecraft_version);
        let mappings = build_data.join("mappings");
        let class_data = fs::read_to_string(mappings.join(&info.class_mappings))?;
        let member_data = fs::read_to_string(mappings.join(&info.member_mappings))?;
        let package_data = match info.package_mappings {
            Some(ref name) => Some(fs::read_to_string(mappings.join(name))?),
            None => None,
        };
        SpigotMappings::parse(&class_data, &member_data, package_data.as_ref().map(String::as_str))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{FieldData, MethodData, MethodSignature, TypeName};

    const CLASSES: &str = "\
# Spigot class mappings
a World
b Entity
c net/minecraft/Thing.Broken
d MinecraftServer
";
    const MEMBERS: &str = "\
World c players
World d (LEntity;)V addEntity
World <init> (LMinecraftServer;)V init
nv ServerStatisticManager#
";

    #[test]
    fn package_mappings() {
        let packages = parse_package_mappings("# packages\n./ net/minecraft/server/\nnet/minecraft/a/ net/minecraft/b/\n").unwrap();
        assert_eq!(packages[""], "net/minecraft/server");
        assert_eq!(packages["net/minecraft/a"], "net/minecraft/b");
        assert!(parse_package_mappings("a b\n").is_err());
    }

    #[test]
    fn chain_classes_and_members() {
        let mappings = SpigotMappings::parse(CLASSES, MEMBERS, None).unwrap();
        assert_eq!(mappings.class_mappings.class_count(), 3);
        assert_eq!(mappings.member_mappings.method_count(), 1);
        let chained = &mappings.chained_mappings;
        let world = TypeName::new("net/minecraft/server/World");
        assert_eq!(chained.get_remapped_class(&TypeName::new("a")), Some(&world));
        assert_eq!(
            chained.get_remapped_field(&FieldData::new(TypeName::new("a"), "c")),
            Some(&FieldData::new(world.clone(), "players"))
        );
        assert_eq!(
            chained.get_remapped_method(&MethodData::new(
                TypeName::new("a"), "d",
                MethodSignature::from_descriptor("(Lb;)V").unwrap()
            )),
            Some(&MethodData::new(
                world.clone(), "addEntity",
                MethodSignature::from_descriptor("(Lnet/minecraft/server/Entity;)V").unwrap()
            ))
        );
    }
}
