use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use failure::Error;
use indexmap::IndexMap;
use log::info;
use mappings::format::tsrg::{from_srg, write_tsrg};
use mappings::prelude::*;
use serde_derive::Serialize;

use super::computer::MappingsTargetComputer;
use super::target::{MappingSystem, TargetMapping};

/// Every target generated for a single minecraft version
pub struct GeneratedMappings {
    pub minecraft_version: MinecraftVersion,
    pub targets: Vec<(TargetMapping, Arc<Mappings>)>,
}
impl GeneratedMappings {
    /// Compute every combination of the loaded systems,
    /// followed by any of the extra targets that aren't already present.
    pub fn generate(computer: &MappingsTargetComputer, extra_targets: &[TargetMapping]) -> Result<GeneratedMappings, Error> {
        let mut targets = computer.complete_mappings()?;
        for &target in extra_targets {
            if !targets.iter().any(|&(existing, _)| existing == target) {
                targets.push((target, computer.compute_target(target)?));
            }
        }
        Ok(GeneratedMappings { minecraft_version: computer.minecraft_version(), targets })
    }
    /// The `obf2{system}` targets, which the combined outputs are built from
    fn base_targets(&self) -> impl Iterator<Item = (MappingSystem, &Mappings)> {
        self.targets.iter()
            .filter(|&&(target, _)| target.original == MappingSystem::Obf && target.flags.is_default())
            .map(|&(target, ref mappings)| (target.renamed, &**mappings))
    }
    pub fn tiny(&self) -> TinyMappings {
        let mut tiny = TinyMappings::new();
        for (system, mappings) in self.base_targets() {
            tiny.add_mappings(system.id(), mappings);
        }
        tiny
    }
    pub fn summary(&self) -> MappingsSummary {
        let mut classes: IndexMap<&TypeName, IndexMap<String, String>> = IndexMap::new();
        let mut fields: IndexMap<&FieldData, IndexMap<String, String>> = IndexMap::new();
        let mut methods: IndexMap<&MethodData, IndexMap<String, String>> = IndexMap::new();
        fn entry<K>(map: &mut IndexMap<K, IndexMap<String, String>>, key: K, obf: String) -> &mut IndexMap<String, String>
            where K: ::std::hash::Hash + Eq {
            map.entry(key).or_insert_with(|| {
                let mut names = IndexMap::new();
                names.insert("obf".to_string(), obf);
                names
            })
        }
        for (system, mappings) in self.base_targets() {
            info!("{}: generating json for {}", self.minecraft_version, system);
            for (obf, renamed) in mappings.classes() {
                entry(&mut classes, obf, obf.simple_name().into())
                    .insert(system.id().into(), renamed.simple_name().into());
            }
            for (obf, renamed) in mappings.fields() {
                entry(&mut fields, obf, member_name(&obf.declaring_type, &obf.name))
                    .insert(system.id().into(), member_name(&renamed.declaring_type, &renamed.name));
            }
            for (obf, renamed) in mappings.methods() {
                entry(&mut methods, obf, member_name(&obf.declaring_type, &obf.name))
                    .insert(system.id().into(), member_name(&renamed.declaring_type, &renamed.name));
            }
        }
        MappingsSummary {
            minecraft_version: self.minecraft_version,
            classes: classes.into_iter().map(|(_, names)| names).collect(),
            fields: fields.into_iter().map(|(_, names)| names).collect(),
            methods: methods.into_iter().map(|(_, names)| names).collect(),
        }
    }
    /// Render every output file, keyed by its file name.
    ///
    /// Each target gets a `.srg` and a `.tsrg` file with identity renames removed,
    /// and the base targets are combined into `{version}.tiny` and `{version}.json`.
    pub fn render(&self) -> Result<IndexMap<String, String>, Error> {
        let mut files = IndexMap::with_capacity(self.targets.len() * 2 + 2);
        for &(target, ref mappings) in &self.targets {
            let srg = SrgMappingsFormat::write_string(&mappings.strip_duplicates());
            let tsrg = write_tsrg(&from_srg(&srg)?);
            files.insert(format!("{}.srg", target), srg);
            files.insert(format!("{}.tsrg", target), tsrg);
        }
        files.insert(format!("{}.tiny", self.minecraft_version), self.tiny().to_text());
        files.insert(
            format!("{}.json", self.minecraft_version),
            ::serde_json::to_string(&self.summary())?
        );
        Ok(files)
    }
    /// Write all the mappings into `{folder}/{version}`, returning the directory.
    ///
    /// Nothing is written unless every file renders successfully.
    pub fn write(&self, folder: &Path) -> Result<PathBuf, Error> {
        let files = self.render()?;
        let output = folder.join(self.minecraft_version.to_string());
        fs::create_dir_all(&output)?;
        for (name, text) in &files {
            info!("{}: writing mappings to {}", self.minecraft_version, name);
            fs::write(output.join(name), text)?;
        }
        Ok(output)
    }
}

#[inline]
fn member_name(declaring_type: &TypeName, name: &str) -> String {
    format!("{}.{}", declaring_type.simple_name(), name)
}

/// The short names of everything in each system, as written to `{version}.json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsSummary {
    pub minecraft_version: MinecraftVersion,
    pub classes: Vec<IndexMap<String, String>>,
    pub fields: Vec<IndexMap<String, String>>,
    pub methods: Vec<IndexMap<String, String>>,
}
