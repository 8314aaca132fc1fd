use std::cell::RefCell;
use std::sync::Arc;

use failure::Error;
use failure_derive::Fail;
use indexmap::IndexMap;
use log::{debug, info};
use mappings::prelude::*;

use super::provider::MappingsProvider;
use super::target::{MappingSystem, TargetFilter, TargetMapping};

/// Computes mappings between any two systems,
/// starting from the `obf2{system}` mappings of each one.
///
/// Everything that's computed is remembered, so each target is only computed once.
pub struct MappingsTargetComputer {
    minecraft_version: MinecraftVersion,
    /// The systems with base mappings, in the order they were added
    systems: Vec<MappingSystem>,
    computed_targets: RefCell<IndexMap<TargetMapping, Arc<Mappings>>>,
}
impl MappingsTargetComputer {
    pub fn new(minecraft_version: MinecraftVersion) -> Self {
        MappingsTargetComputer {
            minecraft_version,
            systems: Vec::new(),
            computed_targets: Default::default(),
        }
    }
    #[inline]
    pub fn minecraft_version(&self) -> MinecraftVersion {
        self.minecraft_version
    }
    #[inline]
    pub fn systems(&self) -> &[MappingSystem] {
        &self.systems
    }
    /// Add the `obf2{system}` mappings every other target involving the system is derived from
    pub fn add_base(&mut self, system: MappingSystem, mappings: Mappings) -> Result<(), Error> {
        if system == MappingSystem::Obf {
            return Err(RedundantTarget(MappingSystem::Obf.create_target(system)).into());
        }
        if self.systems.contains(&system) {
            return Err(DuplicateMappingSystem(system).into());
        }
        info!(
            "{}: loaded {} with {} classes, {} fields and {} methods",
            self.minecraft_version, system,
            mappings.class_count(), mappings.field_count(), mappings.method_count()
        );
        self.systems.push(system);
        self.computed_targets.get_mut()
            .insert(MappingSystem::Obf.create_target(system), Arc::new(mappings));
        Ok(())
    }
    /// Load the base mappings from each provider in turn.
    ///
    /// Providers can depend on the mappings of the ones before them.
    pub fn load(&mut self, providers: &[Box<dyn MappingsProvider>]) -> Result<(), Error> {
        for provider in providers {
            let system = provider.system();
            let mappings = provider.provide(self)
                .map_err(|cause| TargetComputeError { target: MappingSystem::Obf.create_target(system), cause })?;
            self.add_base(system, mappings)?;
        }
        Ok(())
    }
    pub fn compute_target(&self, target: TargetMapping) -> Result<Arc<Mappings>, Error> {
        {
            let computed_targets = self.computed_targets.borrow();
            if let Some(mappings) = computed_targets.get(&target) {
                return Ok(mappings.clone())
            }
        }
        let mappings = self.fallback_compute_target(target)
            .map_err(|cause| TargetComputeError { target, cause })?;
        let mappings = Arc::new(mappings);
        self.computed_targets.borrow_mut().insert(target, mappings.clone());
        Ok(mappings)
    }
    fn fallback_compute_target(&self, target: TargetMapping) -> Result<Mappings, Error> {
        if !target.flags.is_default() {
            let base = self.compute_target(target.with_default_flags())?;
            return self.apply_flags(target, (*base).clone());
        }
        debug!("{}: computing {}", self.minecraft_version, target);
        Ok(match (target.original, target.renamed) {
            (original, renamed) if original == renamed => {
                return Err(RedundantTarget(target).into())
            },
            // The base mappings are always present once they've been loaded
            (MappingSystem::Obf, renamed) => return Err(MissingMappings(renamed).into()),
            (_, MappingSystem::Obf) => {
                self.compute_target(target.reversed())?.inverted()
            },
            (original, renamed) => {
                let original2obf = self.compute_target(original.create_target(MappingSystem::Obf))?;
                let obf2renamed = self.compute_target(MappingSystem::Obf.create_target(renamed))?;
                original2obf.chain(&obf2renamed)?
            },
        })
    }
    fn apply_flags(&self, target: TargetMapping, mappings: Mappings) -> Result<Mappings, Error> {
        let mut mappings = mappings;
        if target.flags.only_obf() && target.original != MappingSystem::Obf {
            /*
             * If the original is obfuscated, the modifier is redundant.
             * Otherwise we only want the new names for things that are still obfuscated.
             */
            let original2obf = self.compute_target(target.original.create_target(MappingSystem::Obf))?;
            let mut builder = mappings.rebuild();
            builder.retain_classes(|original, _| {
                match original2obf.get_remapped_class(original) {
                    Some(obf) => original == obf,
                    None => true,
                }
            });
            /*
             * Members only compare names,
             * so a member of a deobfuscated class can still be renamed.
             */
            builder.retain_fields(|original, _| {
                match original2obf.get_remapped_field(original) {
                    Some(obf) => original.name == obf.name,
                    None => true,
                }
            });
            builder.retain_methods(|original, _| {
                match original2obf.get_remapped_method(original) {
                    Some(obf) => original.name == obf.name,
                    None => true,
                }
            });
            mappings = builder.build();
        }
        match target.flags.filter() {
            None => {},
            Some(TargetFilter::Classes) => {
                let mut builder = mappings.rebuild();
                builder.clear_fields();
                builder.clear_methods();
                mappings = builder.build();
            },
            Some(TargetFilter::Members) => {
                let mut builder = mappings.rebuild();
                builder.clear_classes();
                mappings = builder.build();
            }
        }
        Ok(mappings)
    }
    /// Compute every combination of the loaded systems.
    ///
    /// Each system gives `obf2{a}` and `{a}2obf`,
    /// followed by `{a}2{b}` for every other system, in the order the systems were added.
    pub fn complete_mappings(&self) -> Result<Vec<(TargetMapping, Arc<Mappings>)>, Error> {
        let mut result = Vec::with_capacity(self.systems.len() * (self.systems.len() + 1));
        for &a in &self.systems {
            let mut targets = vec![
                MappingSystem::Obf.create_target(a),
                a.create_target(MappingSystem::Obf),
            ];
            targets.extend(self.systems.iter()
                .filter(|&&b| b != a)
                .map(|&b| a.create_target(b)));
            for target in targets {
                result.push((target, self.compute_target(target)?));
            }
        }
        Ok(result)
    }
}
#[derive(Debug, Fail)]
#[fail(display = "Unable to compute {}: {}", target, cause)]
pub struct TargetComputeError {
    target: TargetMapping,
    cause: Error,
}
#[derive(Debug, Fail)]
#[fail(display = "No mappings were loaded for {}", _0)]
pub struct MissingMappings(pub MappingSystem);
#[derive(Debug, Fail)]
#[fail(display = "Can't load base mappings for {} more than once", _0)]
pub struct DuplicateMappingSystem(pub MappingSystem);
#[derive(Debug, Fail)]
#[fail(display = "Redundant target {}", _0)]
pub struct RedundantTarget(pub TargetMapping);

#[cfg(test)]
mod test {
    use super::*;
    use crate::target::TargetFlags;

    fn class(name: &str) -> TypeName {
        TypeName::new(name)
    }
    fn field(owner: &str, name: &str) -> FieldData {
        FieldData::new(class(owner), name)
    }
    fn obf2srg() -> Mappings {
        let mut builder = MappingsBuilder::default();
        builder.insert_class(class("a"), class("net/minecraft/World")).unwrap();
        builder.insert_class(class("b"), class("net/minecraft/Entity")).unwrap();
        builder.insert_field(field("a", "c"), field("net/minecraft/World", "field_1_c")).unwrap();
        builder.insert_field(field("b", "d"), field("net/minecraft/Entity", "field_2_d")).unwrap();
        builder.build()
    }
    fn obf2spigot() -> Mappings {
        let mut builder = MappingsBuilder::default();
        builder.insert_class(class("a"), class("net/minecraft/server/World")).unwrap();
        builder.insert_class(class("b"), class("b")).unwrap();
        builder.insert_field(field("a", "c"), field("net/minecraft/server/World", "players")).unwrap();
        builder.insert_field(field("b", "d"), field("b", "d")).unwrap();
        builder.build()
    }
    fn computer() -> MappingsTargetComputer {
        let mut computer = MappingsTargetComputer::new(MinecraftVersion::new(1, 12, 2));
        computer.add_base(MappingSystem::Srg, obf2srg()).unwrap();
        computer.add_base(MappingSystem::Spigot, obf2spigot()).unwrap();
        computer
    }

    #[test]
    fn complete_combinations() {
        let computer = computer();
        let names: Vec<String> = computer.complete_mappings().unwrap()
            .iter()
            .map(|&(target, _)| target.to_string())
            .collect();
        assert_eq!(names, vec![
            "obf2srg", "srg2obf", "srg2spigot",
            "obf2spigot", "spigot2obf", "spigot2srg",
        ]);
    }

    #[test]
    fn chain_through_obf() {
        let computer = computer();
        let srg2spigot = computer.compute_target("srg2spigot".parse().unwrap()).unwrap();
        assert_eq!(
            srg2spigot.get_remapped_class(&class("net/minecraft/World")),
            Some(&class("net/minecraft/server/World"))
        );
        assert_eq!(
            srg2spigot.get_remapped_field(&field("net/minecraft/World", "field_1_c")),
            Some(&field("net/minecraft/server/World", "players"))
        );
        let spigot2obf = computer.compute_target("spigot2obf".parse().unwrap()).unwrap();
        assert_eq!(*spigot2obf, obf2spigot().inverted());
    }

    #[test]
    fn only_obf() {
        let computer = computer();
        let target = "spigot2srg-onlyobf".parse().unwrap();
        let mappings = computer.compute_target(target).unwrap();
        // Spigot already renamed `a`, so only the still obfuscated `b` gets a new name
        assert_eq!(mappings.get_remapped_class(&class("net/minecraft/server/World")), None);
        assert_eq!(mappings.get_remapped_class(&class("b")), Some(&class("net/minecraft/Entity")));
        assert_eq!(mappings.get_remapped_field(&field("net/minecraft/server/World", "players")), None);
        assert_eq!(
            mappings.get_remapped_field(&field("b", "d")),
            Some(&field("net/minecraft/Entity", "field_2_d"))
        );
    }

    #[test]
    fn filters() {
        let computer = computer();
        let classes = computer.compute_target(
            TargetMapping::new(MappingSystem::Obf, MappingSystem::Srg)
                .with_flags(TargetFlags::new(Some(TargetFilter::Classes), false))
        ).unwrap();
        assert_eq!((classes.class_count(), classes.field_count()), (2, 0));
        let members = computer.compute_target("obf2srg-members".parse().unwrap()).unwrap();
        assert_eq!((members.class_count(), members.field_count()), (0, 2));
    }

    #[test]
    fn invalid_targets() {
        let mut computer = computer();
        assert!(computer.compute_target("srg2srg".parse().unwrap()).is_err());
        assert!(computer.compute_target("obf2mcp".parse().unwrap()).is_err());
        assert!(computer.compute_target("mcp2spigot".parse().unwrap()).is_err());
        assert!(computer.add_base(MappingSystem::Srg, Mappings::empty()).is_err());
        assert!(computer.add_base(MappingSystem::Obf, Mappings::empty()).is_err());
    }
}
