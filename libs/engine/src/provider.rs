//! Sources of the base `obf2{system}` mappings, which everything else is computed from.
//!
//! Downloading the upstream data is left to the caller,
//! so every provider reads files that are already on disk.
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use failure::Error;
use failure_derive::Fail;
use log::info;
use mappings::mcp::McpNames;
use mappings::prelude::*;
use mappings::spigot::SpigotMappings;

use super::computer::MappingsTargetComputer;
use super::target::{MappingSystem, TargetMapping};

const OBF2SRG: TargetMapping = TargetMapping::new(MappingSystem::Obf, MappingSystem::Srg);

pub trait MappingsProvider {
    /// The system these mappings rename the obfuscated names into
    fn system(&self) -> MappingSystem;
    /// Give the `obf2{system}` mappings
    fn provide(&self, computer: &MappingsTargetComputer) -> Result<Mappings, Error>;
}

/// Mappings stored in a single file, whose format is given by its extension.
///
/// Tiny files give the namespace with the same name as the system.
#[derive(Clone, Debug)]
pub struct FileProvider {
    system: MappingSystem,
    path: PathBuf,
}
impl FileProvider {
    #[inline]
    pub fn new(system: MappingSystem, path: PathBuf) -> FileProvider {
        FileProvider { system, path }
    }
}
impl MappingsProvider for FileProvider {
    #[inline]
    fn system(&self) -> MappingSystem {
        self.system
    }
    fn provide(&self, computer: &MappingsTargetComputer) -> Result<Mappings, Error> {
        if self.path.extension().map_or(false, |extension| extension == "tiny") {
            return TinyProvider::new(self.system, self.path.clone()).provide(computer);
        }
        info!("Reading {} mappings from {}", self.system, self.path.display());
        parse_file(&self.path)
    }
}
/// Parses `{system}={path}`
impl FromStr for FileProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<FileProvider, Error> {
        let index = s.find('=').ok_or_else(|| InvalidSource(s.into()))?;
        let system = s[..index].parse::<MappingSystem>()?;
        let path = &s[(index + 1)..];
        if path.is_empty() {
            return Err(InvalidSource(s.into()).into());
        }
        Ok(FileProvider::new(system, PathBuf::from(path)))
    }
}

/// Parse a `.srg`, `.tsrg` or `.csrg` file
pub fn parse_file(path: &Path) -> Result<Mappings, Error> {
    let text = fs::read_to_string(path)?;
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("srg") => SrgMappingsFormat::parse_text(&text),
        Some("tsrg") => TSrgMappingsFormat::parse_text(&text),
        Some("csrg") => CompactSrgMappingsFormat::parse_text(&text),
        _ => Err(UnknownFormat(path.to_path_buf()).into()),
    }
}

/// MCP's names for the members of the srg mappings, which must already be loaded
#[derive(Clone, Debug)]
pub struct McpProvider {
    /// Either a directory containing the CSV files, or an exported zip
    names: PathBuf,
}
impl McpProvider {
    #[inline]
    pub fn new(names: PathBuf) -> McpProvider {
        McpProvider { names }
    }
}
impl MappingsProvider for McpProvider {
    #[inline]
    fn system(&self) -> MappingSystem {
        MappingSystem::Mcp
    }
    fn provide(&self, computer: &MappingsTargetComputer) -> Result<Mappings, Error> {
        let obf2srg = computer.compute_target(OBF2SRG)?;
        info!("Reading MCP names from {}", self.names.display());
        let names = if self.names.is_dir() {
            McpNames::load_dir(&self.names)?
        } else {
            McpNames::from_archive(&fs::read(&self.names)?)?
        };
        Ok(names.apply(&obf2srg)?)
    }
}

#[derive(Clone, Debug)]
pub struct SpigotProvider {
    build_data: PathBuf,
}
impl SpigotProvider {
    #[inline]
    pub fn new(build_data: PathBuf) -> SpigotProvider {
        SpigotProvider { build_data }
    }
}
impl MappingsProvider for SpigotProvider {
    #[inline]
    fn system(&self) -> MappingSystem {
        MappingSystem::Spigot
    }
    fn provide(&self, _computer: &MappingsTargetComputer) -> Result<Mappings, Error> {
        info!("Reading spigot BuildData from {}", self.build_data.display());
        Ok(SpigotMappings::load(&self.build_data)?.chained_mappings)
    }
}

/// One namespace of a tiny file, like those yarn is distributed as
#[derive(Clone, Debug)]
pub struct TinyProvider {
    system: MappingSystem,
    path: PathBuf,
}
impl TinyProvider {
    #[inline]
    pub fn new(system: MappingSystem, path: PathBuf) -> TinyProvider {
        TinyProvider { system, path }
    }
}
impl MappingsProvider for TinyProvider {
    #[inline]
    fn system(&self) -> MappingSystem {
        self.system
    }
    fn provide(&self, _computer: &MappingsTargetComputer) -> Result<Mappings, Error> {
        info!("Reading {} from {}", self.system, self.path.display());
        let tiny = TinyMappings::parse(&fs::read_to_string(&self.path)?)?;
        let mut namespaces = tiny.to_mappings()?;
        namespaces.swap_remove(self.system.id())
            .ok_or_else(|| MissingNamespace(self.system, self.path.clone()).into())
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Invalid mappings source {:?}, expected system=path", _0)]
pub struct InvalidSource(String);
#[derive(Debug, Fail)]
#[fail(display = "Unknown mappings format for {:?}", _0)]
pub struct UnknownFormat(PathBuf);
#[derive(Debug, Fail)]
#[fail(display = "Missing the {} namespace in {:?}", _0, _1)]
pub struct MissingNamespace(MappingSystem, PathBuf);

#[cfg(test)]
mod test {
    use super::*;
    use std::env;
    use std::process;

    /// A scratch directory that's unique to the test
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("mappings-provider-{}-{}", name, process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_sources() {
        let provider: FileProvider = "spigot=BuildData/mappings/bukkit.csrg".parse().unwrap();
        assert_eq!(provider.system(), MappingSystem::Spigot);
        assert_eq!(provider.path, PathBuf::from("BuildData/mappings/bukkit.csrg"));
        assert!("spigot".parse::<FileProvider>().is_err());
        assert!("spigot=".parse::<FileProvider>().is_err());
        assert!("named=yarn.tiny".parse::<FileProvider>().is_err());
    }

    #[test]
    fn load_providers() {
        let dir = scratch_dir("load");
        let srg = dir.join("joined.tsrg");
        fs::write(&srg, "a net/minecraft/World\n\tb field_1_b\n\tc (La;)V func_2_c\n").unwrap();
        let names = dir.join("mcp");
        fs::create_dir_all(&names).unwrap();
        fs::write(names.join("fields.csv"), "searge,name,side,desc\nfield_1_b,players,2,\n").unwrap();
        fs::write(names.join("methods.csv"), "searge,name,side,desc\nfunc_2_c,tick,2,\n").unwrap();
        let yarn = dir.join("mappings.tiny");
        fs::write(&yarn, "v1\tofficial\tintermediary\tnamed\nCLASS\ta\tnet/minecraft/class_1\tnet/minecraft/World\n").unwrap();

        let providers: Vec<Box<dyn MappingsProvider>> = vec![
            Box::new(FileProvider::new(MappingSystem::Srg, srg)),
            Box::new(McpProvider::new(names)),
            Box::new(TinyProvider::new(MappingSystem::Yarn, yarn.clone())),
            Box::new(FileProvider::new(MappingSystem::Intermediary, yarn)),
        ];
        let mut computer = MappingsTargetComputer::new(MinecraftVersion::new(1, 13, 2));
        computer.load(&providers).unwrap();
        assert_eq!(computer.systems(), &[
            MappingSystem::Srg, MappingSystem::Mcp,
            MappingSystem::Yarn, MappingSystem::Intermediary,
        ][..]);
        let obf2mcp = computer.compute_target("obf2mcp".parse().unwrap()).unwrap();
        assert_eq!(
            obf2mcp.get_remapped_field(&FieldData::new(TypeName::new("a"), "b")),
            Some(&FieldData::new(TypeName::new("net/minecraft/World"), "players"))
        );
        let obf2yarn = computer.compute_target("obf2yarn".parse().unwrap()).unwrap();
        assert_eq!(obf2yarn.class_count(), 1);
        let yarn2intermediary = computer.compute_target("yarn2intermediary".parse().unwrap()).unwrap();
        assert_eq!(
            yarn2intermediary.get_remapped_class(&TypeName::new("net/minecraft/World")),
            Some(&TypeName::new("net/minecraft/class_1"))
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn mcp_needs_srg() {
        let providers: Vec<Box<dyn MappingsProvider>> = vec![
            Box::new(McpProvider::new(PathBuf::from("missing"))),
        ];
        let mut computer = MappingsTargetComputer::new(MinecraftVersion::new(1, 13, 2));
        assert!(computer.load(&providers).is_err());
        assert!(computer.systems().is_empty());
    }

    #[test]
    fn unknown_extension() {
        let dir = scratch_dir("extension");
        let path = dir.join("mappings.txt");
        fs::write(&path, "CL: a b\n").unwrap();
        let error = parse_file(&path).unwrap_err();
        assert!(error.downcast_ref::<UnknownFormat>().is_some());
        fs::remove_dir_all(&dir).unwrap();
    }
}
