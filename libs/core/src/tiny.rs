//! The multi-namespace Tiny (v1) table.
//!
//! Every entry is keyed by its obfuscated ("official") identity,
//! and carries one name for each namespace that's been added to the table.
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::bimap::RenameError;
use crate::format::{is_ignored_line, ParseError};
use crate::mappings::{Mappings, MappingsBuilder};
use crate::types::{FieldData, MethodData, MethodSignature, TypeName};

/// The descriptor given to fields, since most mappings don't know their types.
///
/// Two fields with the same owner and name but different types
/// will end up sharing a single entry.
pub const FIELD_PLACEHOLDER_DESCRIPTOR: &str = "Lunk;";
/// The namespace of the obfuscated names every entry is keyed by
pub const OFFICIAL_NAMESPACE: &str = "official";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
    Class,
    Field,
    Method,
}
impl EntryKind {
    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            EntryKind::Class => "CLASS",
            EntryKind::Field => "FIELD",
            EntryKind::Method => "METHOD",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberKey {
    pub declaring_class: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassEntry {
    pub source: String,
    pub names: IndexMap<String, String>,
}
impl ClassEntry {
    /// The name in the specified namespace, falling back to the obfuscated name
    #[inline]
    pub fn name(&self, namespace: &str) -> &str {
        self.names.get(namespace).map_or(self.source.as_str(), String::as_str)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberEntry {
    pub key: MemberKey,
    pub names: IndexMap<String, String>,
}
impl MemberEntry {
    #[inline]
    pub fn name(&self, namespace: &str) -> &str {
        self.names.get(namespace).map_or(self.key.name.as_str(), String::as_str)
    }
}

/// A borrowed entry of any kind
#[derive(Copy, Clone, Debug)]
pub enum TinyEntry<'a> {
    Class(&'a ClassEntry),
    Field(&'a MemberEntry),
    Method(&'a MemberEntry),
}
impl<'a> TinyEntry<'a> {
    #[inline]
    pub fn kind(&self) -> EntryKind {
        match *self {
            TinyEntry::Class(_) => EntryKind::Class,
            TinyEntry::Field(_) => EntryKind::Field,
            TinyEntry::Method(_) => EntryKind::Method,
        }
    }
    pub fn name(&self, namespace: &str) -> &'a str {
        match *self {
            TinyEntry::Class(entry) => entry.name(namespace),
            TinyEntry::Field(entry) | TinyEntry::Method(entry) => entry.name(namespace),
        }
    }
    /// Render this entry as a line, with a column for each of the specified namespaces
    fn to_line(&self, namespaces: &[String]) -> String {
        let mut columns: Vec<&str> = vec![self.kind().tag()];
        match *self {
            TinyEntry::Class(entry) => columns.push(&entry.source),
            TinyEntry::Field(entry) | TinyEntry::Method(entry) => {
                columns.push(&entry.key.declaring_class);
                columns.push(&entry.key.descriptor);
                columns.push(&entry.key.name);
            }
        }
        columns.extend(namespaces.iter().map(|namespace| self.name(namespace)));
        columns.join("\t").replace('.', "/")
    }
}

#[derive(Clone, Debug, Default)]
pub struct TinyMappings {
    namespaces: Vec<String>,
    classes: IndexMap<String, ClassEntry>,
    fields: IndexMap<MemberKey, MemberEntry>,
    methods: IndexMap<MemberKey, MemberEntry>,
}
impl TinyMappings {
    #[inline]
    pub fn new() -> TinyMappings {
        TinyMappings::default()
    }
    #[inline]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }
    /// Add the names of the specified obf -> namespace mappings to the table
    pub fn add_mappings(&mut self, namespace: &str, mappings: &Mappings) {
        info!("Adding {} to the tiny mappings", namespace);
        self.add_namespace(namespace);
        for (obf, renamed) in mappings.classes() {
            self.class_entry(obf.internal_name())
                .names.insert(namespace.into(), renamed.internal_name().into());
        }
        for (obf, renamed) in mappings.fields() {
            let key = MemberKey {
                declaring_class: obf.declaring_type.internal_name().into(),
                name: obf.name.clone(),
                descriptor: FIELD_PLACEHOLDER_DESCRIPTOR.into(),
            };
            self.field_entry(key).names.insert(namespace.into(), renamed.name.clone());
        }
        for (obf, renamed) in mappings.methods() {
            let key = MemberKey {
                declaring_class: obf.declaring_type.internal_name().into(),
                name: obf.name.clone(),
                descriptor: obf.signature.descriptor(),
            };
            self.method_entry(key).names.insert(namespace.into(), renamed.name.clone());
        }
        debug!(
            "Tiny mappings now have {} classes, {} fields and {} methods",
            self.classes.len(), self.fields.len(), self.methods.len()
        );
    }
    fn add_namespace(&mut self, namespace: &str) {
        if !self.namespaces.iter().any(|existing| existing == namespace) {
            self.namespaces.push(namespace.into());
        }
    }
    /// Get the entry for the specified obfuscated class, creating it if it's missing
    pub fn class_entry(&mut self, source: &str) -> &mut ClassEntry {
        self.classes.entry(source.into()).or_insert_with(|| ClassEntry {
            source: source.into(),
            names: IndexMap::new(),
        })
    }
    pub fn field_entry(&mut self, key: MemberKey) -> &mut MemberEntry {
        self.fields.entry(key.clone()).or_insert_with(|| MemberEntry { key, names: IndexMap::new() })
    }
    pub fn method_entry(&mut self, key: MemberKey) -> &mut MemberEntry {
        self.methods.entry(key.clone()).or_insert_with(|| MemberEntry { key, names: IndexMap::new() })
    }
    /// Every entry in the table, classes first, in the order they were added
    pub fn entries(&self) -> impl Iterator<Item = TinyEntry<'_>> {
        self.classes.values().map(TinyEntry::Class)
            .chain(self.fields.values().map(TinyEntry::Field))
            .chain(self.methods.values().map(TinyEntry::Method))
    }
    /// Serialize the table, including the header and a trailing newline
    pub fn to_text(&self) -> String {
        let mut header = vec!["v1", OFFICIAL_NAMESPACE];
        header.extend(self.namespaces.iter().map(String::as_str));
        let mut result = header.join("\t");
        result.push('\n');
        for entry in self.entries() {
            result.push_str(&entry.to_line(&self.namespaces));
            result.push('\n');
        }
        result
    }
    /// Parse a tiny v1 table.
    ///
    /// Every row must have exactly one column for each namespace in the header.
    pub fn parse(text: &str) -> Result<TinyMappings, ParseError> {
        let mut result = TinyMappings::new();
        let mut lines = text.lines().enumerate().filter(|&(_, line)| !is_ignored_line(line));
        let namespaces: Vec<String> = match lines.next() {
            Some((_, line)) if line == "v1" || line.starts_with("v1\t") => {
                line.split('\t').skip(2).map(String::from).collect()
            }
            Some((index, line)) => return Err(ParseError::malformed(index + 1, line)),
            None => return Ok(result),
        };
        for namespace in &namespaces {
            result.add_namespace(namespace);
        }
        for (index, line) in lines {
            let malformed = || ParseError::malformed(index + 1, line);
            let parts: Vec<&str> = line.split('\t').collect();
            let (names, entry) = match parts[0] {
                "CLASS" => {
                    if parts.len() != 2 + namespaces.len() {
                        return Err(malformed());
                    }
                    (&parts[2..], &mut result.class_entry(parts[1]).names)
                }
                "FIELD" | "METHOD" => {
                    if parts.len() != 4 + namespaces.len() {
                        return Err(malformed());
                    }
                    let key = MemberKey {
                        declaring_class: parts[1].into(),
                        name: parts[3].into(),
                        descriptor: parts[2].into(),
                    };
                    let entry = if parts[0] == "FIELD" {
                        result.field_entry(key)
                    } else {
                        result.method_entry(key)
                    };
                    (&parts[4..], &mut entry.names)
                }
                _ => return Err(malformed()),
            };
            for (namespace, &name) in namespaces.iter().zip(names) {
                if namespace != OFFICIAL_NAMESPACE {
                    entry.insert(namespace.clone(), name.into());
                }
            }
        }
        Ok(result)
    }
    /// Reconstruct the obf -> namespace mappings for one namespace.
    ///
    /// Member owners and method signatures are renamed through the class table,
    /// and methods whose descriptors can't be parsed are skipped.
    pub fn mappings_for(&self, namespace: &str) -> Result<Mappings, RenameError> {
        let mut builder = MappingsBuilder::default();
        for class in self.classes.values() {
            builder.insert_class(TypeName::new(class.source.as_str()), TypeName::new(class.name(namespace)))?;
        }
        for field in self.fields.values() {
            let original = FieldData::new(TypeName::new(field.key.declaring_class.as_str()), field.key.name.as_str());
            let renamed = FieldData::new(builder.remap_class(&original.declaring_type), field.name(namespace));
            builder.insert_field(original, renamed)?;
        }
        for method in self.methods.values() {
            let signature = match MethodSignature::from_descriptor(&method.key.descriptor) {
                Ok(signature) => signature,
                Err(cause) => {
                    warn!(
                        "Skipping {} method {}/{}: {}",
                        namespace, method.key.declaring_class, method.key.name, cause
                    );
                    continue;
                }
            };
            let original = MethodData::new(
                TypeName::new(method.key.declaring_class.as_str()),
                method.key.name.as_str(),
                signature,
            );
            let renamed = MethodData::new(
                builder.remap_class(&original.declaring_type),
                method.name(namespace),
                original.signature.map_classes(|name| builder.get_remapped_class(name).cloned()),
            );
            builder.insert_method(original, renamed)?;
        }
        Ok(builder.build())
    }
    /// Reconstruct the mappings of every namespace, calling the `named` namespace `yarn`
    pub fn to_mappings(&self) -> Result<IndexMap<String, Mappings>, RenameError> {
        let mut result = IndexMap::with_capacity(self.namespaces.len());
        for namespace in &self.namespaces {
            let mappings = self.mappings_for(namespace)?;
            let name = match namespace.as_str() {
                "named" => "yarn",
                other => other,
            };
            result.insert(name.to_string(), mappings);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn class(name: &str) -> TypeName {
        TypeName::new(name)
    }
    fn obf2srg() -> Mappings {
        let mut builder = MappingsBuilder::default();
        builder.insert_class(class("a"), class("b")).unwrap();
        builder.insert_field(
            FieldData::new(class("a"), "c"),
            FieldData::new(class("b"), "field_1_c"),
        ).unwrap();
        builder.insert_method(
            MethodData::new(class("a"), "d", MethodSignature::from_descriptor("(La;)V").unwrap()),
            MethodData::new(class("b"), "func_2_d", MethodSignature::from_descriptor("(Lb;)V").unwrap()),
        ).unwrap();
        builder.build()
    }

    #[test]
    fn missing_names_fall_back_to_source() {
        let mut tiny = TinyMappings::new();
        tiny.add_mappings("srg", &obf2srg());
        tiny.add_mappings("mcp", &Mappings::empty());
        let text = tiny.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "v1\tofficial\tsrg\tmcp",
            "CLASS\ta\tb\ta",
            "FIELD\ta\tLunk;\tc\tfield_1_c\tc",
            "METHOD\ta\t(La;)V\td\tfunc_2_d\td",
        ]);
        assert_eq!(tiny.entries().map(|entry| entry.kind()).collect::<Vec<_>>(), vec![
            EntryKind::Class, EntryKind::Field, EntryKind::Method
        ]);
    }

    #[test]
    fn repeated_namespaces_are_merged() {
        let mut tiny = TinyMappings::new();
        tiny.add_mappings("srg", &obf2srg());
        tiny.add_mappings("srg", &obf2srg());
        assert_eq!(tiny.namespaces(), &["srg".to_string()][..]);
        assert_eq!(tiny.entries().count(), 3);
    }

    #[test]
    fn text_round_trip() {
        let mut tiny = TinyMappings::new();
        tiny.add_mappings("srg", &obf2srg());
        let parsed = TinyMappings::parse(&tiny.to_text()).unwrap();
        assert_eq!(parsed.namespaces(), tiny.namespaces());
        assert_eq!(parsed.to_text(), tiny.to_text());
        let srg = parsed.mappings_for("srg").unwrap();
        assert_eq!(srg, obf2srg());
    }

    #[test]
    fn yarn_namespaces() {
        let text = "\
v1\tofficial\tintermediary\tnamed
CLASS\ta\tnet/minecraft/class_1\tnet/minecraft/World
FIELD\ta\tI\tb\tfield_2\ttime
METHOD\ta\t(La;)V\tc\tmethod_3\tmerge
METHOD\ta\t(1)V\td\tmethod_4\tbroken
";
        let tiny = TinyMappings::parse(text).unwrap();
        let mappings = tiny.to_mappings().unwrap();
        assert_eq!(mappings.keys().collect::<Vec<_>>(), vec!["intermediary", "yarn"]);
        let yarn = &mappings["yarn"];
        assert_eq!(yarn.get_remapped_class(&class("a")), Some(&class("net/minecraft/World")));
        assert_eq!(
            yarn.get_remapped_field(&FieldData::new(class("a"), "b")),
            Some(&FieldData::new(class("net/minecraft/World"), "time"))
        );
        assert_eq!(
            yarn.get_remapped_method(&MethodData::new(
                class("a"), "c",
                MethodSignature::from_descriptor("(La;)V").unwrap()
            )),
            Some(&MethodData::new(
                class("net/minecraft/World"), "merge",
                MethodSignature::from_descriptor("(Lnet/minecraft/World;)V").unwrap()
            ))
        );
        // The malformed method is dropped instead of failing everything
        assert_eq!(yarn.method_count(), 1);
    }

    #[test]
    fn malformed_rows() {
        assert_eq!(TinyMappings::parse("CLASS\ta\tb\n").unwrap_err().line(), 1);
        assert_eq!(
            TinyMappings::parse("v1\tofficial\tsrg\nCLASS\ta\tb\tc\n").unwrap_err(),
            ParseError::MalformedRecord { line: 2, text: "CLASS\ta\tb\tc".into() }
        );
        assert_eq!(TinyMappings::parse("v1\tofficial\tsrg\nFIELD\ta\tI\tb\n").unwrap_err().line(), 2);
        assert_eq!(TinyMappings::parse("v1\tofficial\tsrg\n\nPACKAGE\ta\tb\n").unwrap_err().line(), 3);
    }
}
