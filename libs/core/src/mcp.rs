//! MCP's human readable names, which are keyed by SRG member names.
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use failure::Error;
use failure_derive::Fail;
use indexmap::IndexMap;
use log::debug;
use serde_derive::Deserialize;
use zip::ZipArchive;

use crate::bimap::RenameError;
use crate::mappings::Mappings;

#[derive(Debug, Fail)]
#[fail(display = "MCP names are missing their {}", _0)]
pub struct MissingMcpNames(&'static str);

/// The srg -> mcp names of fields and methods
#[derive(Clone, Debug, Default)]
pub struct McpNames {
    pub fields: IndexMap<String, String>,
    pub methods: IndexMap<String, String>,
}
impl McpNames {
    /// Load the `fields.csv` and `methods.csv` files from a directory
    pub fn load_dir(directory: &Path) -> Result<McpNames, Error> {
        McpNames::from_readers(
            File::open(directory.join("fields.csv"))?,
            File::open(directory.join("methods.csv"))?,
        )
    }
    /// Load the names from an exported MCP zip archive
    pub fn from_archive(buffer: &[u8]) -> Result<McpNames, Error> {
        let mut archive = ZipArchive::new(Cursor::new(buffer))?;
        let fields = load_record_map(&mut ::csv::Reader::from_reader(archive.by_name("fields.csv")?))?;
        let methods = load_record_map(&mut ::csv::Reader::from_reader(archive.by_name("methods.csv")?))?;
        McpNames::from_maps(fields, methods)
    }
    pub fn from_readers<F: Read, M: Read>(fields: F, methods: M) -> Result<McpNames, Error> {
        let fields = load_record_map(&mut ::csv::Reader::from_reader(fields))?;
        let methods = load_record_map(&mut ::csv::Reader::from_reader(methods))?;
        McpNames::from_maps(fields, methods)
    }
    fn from_maps(
        fields: IndexMap<String, String>,
        methods: IndexMap<String, String>
    ) -> Result<McpNames, Error> {
        if fields.is_empty() {
            return Err(MissingMcpNames("fields").into());
        }
        if methods.is_empty() {
            return Err(MissingMcpNames("methods").into());
        }
        debug!("Loaded {} MCP field names and {} method names", fields.len(), methods.len());
        Ok(McpNames { fields, methods })
    }
    /// Rename the members of the obf -> srg mappings, giving obf -> mcp.
    ///
    /// Classes keep their srg names, as do any members MCP hasn't named.
    pub fn apply(&self, obf2srg: &Mappings) -> Result<Mappings, RenameError> {
        obf2srg.transform(
            |class| class.clone(),
            |method| self.methods.get(&method.name).cloned().unwrap_or_else(|| method.name.clone()),
            |field| self.fields.get(&field.name).cloned().unwrap_or_else(|| field.name.clone()),
        )
    }
}
fn load_record_map<R: Read>(
    reader: &mut ::csv::Reader<R>
) -> Result<IndexMap<String, String>, ::csv::Error> {
    reader.deserialize::<MappingEntry>()
        .map(|result| result.map(|entry| (entry.searge, entry.name)))
        .collect()
}
/// A row of `fields.csv` or `methods.csv`, which also have `side` and `desc` columns
#[derive(Debug, Deserialize)]
struct MappingEntry {
    searge: String,
    name: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    use crate::mappings::MappingsBuilder;
    use crate::types::{FieldData, MethodData, MethodSignature, TypeName};

    const FIELDS: &str = "searge,name,side,desc\nfield_1_b,players,2,\n";
    const METHODS: &str = "searge,name,side,desc\nfunc_2_c,tick,2,Ticks the world\n";

    fn obf2srg() -> Mappings {
        let world = TypeName::new("net/minecraft/World");
        let mut builder = MappingsBuilder::default();
        builder.insert_class(TypeName::new("a"), world.clone()).unwrap();
        builder.insert_field(FieldData::new(TypeName::new("a"), "b"), FieldData::new(world.clone(), "field_1_b")).unwrap();
        builder.insert_field(FieldData::new(TypeName::new("a"), "d"), FieldData::new(world.clone(), "field_3_d")).unwrap();
        builder.insert_method(
            MethodData::new(TypeName::new("a"), "c", MethodSignature::from_descriptor("(La;)V").unwrap()),
            MethodData::new(world, "func_2_c", MethodSignature::from_descriptor("(Lnet/minecraft/World;)V").unwrap()),
        ).unwrap();
        builder.build()
    }

    #[test]
    fn apply_names() {
        let names = McpNames::from_readers(FIELDS.as_bytes(), METHODS.as_bytes()).unwrap();
        assert_eq!(names.fields["field_1_b"], "players");
        let obf2mcp = names.apply(&obf2srg()).unwrap();
        let world = TypeName::new("net/minecraft/World");
        assert_eq!(obf2mcp.get_remapped_class(&TypeName::new("a")), Some(&world));
        assert_eq!(
            obf2mcp.get_remapped_field(&FieldData::new(TypeName::new("a"), "b")),
            Some(&FieldData::new(world.clone(), "players"))
        );
        // Unnamed members keep their srg names
        assert_eq!(
            obf2mcp.get_remapped_field(&FieldData::new(TypeName::new("a"), "d")),
            Some(&FieldData::new(world.clone(), "field_3_d"))
        );
        let method = MethodData::new(TypeName::new("a"), "c", MethodSignature::from_descriptor("(La;)V").unwrap());
        assert_eq!(obf2mcp.get_remapped_method(&method).unwrap().name, "tick");
    }

    #[test]
    fn load_from_archive() {
        let mut buffer = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::FileOptions::default();
            writer.start_file("fields.csv", options).unwrap();
            writer.write_all(FIELDS.as_bytes()).unwrap();
            writer.start_file("methods.csv", options).unwrap();
            writer.write_all(METHODS.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        let names = McpNames::from_archive(&buffer).unwrap();
        assert_eq!(names.methods["func_2_c"], "tick");
    }

    #[test]
    fn empty_names_are_rejected() {
        let error = McpNames::from_readers("searge,name,side,desc\n".as_bytes(), METHODS.as_bytes()).unwrap_err();
        assert!(error.downcast_ref::<MissingMcpNames>().is_some());
    }
}
