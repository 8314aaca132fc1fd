//! The tree-shaped TSRG format.
//!
//! Each unindented line opens a class, and the indented lines that follow are its members:
//! `obf deobf` for a field and `obf obfSignature deobf` for a method.
//! Method lines only give the obfuscated signature,
//! so the renamed one has to be derived from the classes in the same file.
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use failure::Error;
use indexmap::IndexMap;

use super::srg::{sorted_lines, SrgRecord};
use super::{is_ignored_line, MappingsFormat, ParseError, SrgMappingsFormat};
use crate::mappings::Mappings;
use crate::types::remap_descriptor;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TSrgClass {
    pub obf: String,
    pub deobf: String,
    pub fields: Vec<TSrgField>,
    pub methods: Vec<TSrgMethod>,
}
impl TSrgClass {
    #[inline]
    pub fn new<S: Into<String>>(obf: S, deobf: S) -> TSrgClass {
        TSrgClass { obf: obf.into(), deobf: deobf.into(), fields: Vec::new(), methods: Vec::new() }
    }
}
impl Display for TSrgClass {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.obf, self.deobf)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TSrgField {
    pub obf: String,
    pub deobf: String,
}
impl Display for TSrgField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.obf, self.deobf)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TSrgMethod {
    pub obf: String,
    pub obf_signature: String,
    pub deobf: String,
}
impl TSrgMethod {
    /// Derive the renamed signature, using the specified table of class renames.
    ///
    /// Classes missing from the table keep their obfuscated names.
    pub fn deobf_signature(&self, class_names: &HashMap<&str, &str>) -> String {
        remap_descriptor(&self.obf_signature, |name| class_names.get(name).cloned())
    }
}
impl Display for TSrgMethod {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.obf, self.obf_signature, self.deobf)
    }
}

/// Parse the classes of a TSRG file, in the order they're declared
pub fn parse_tsrg(text: &str) -> Result<Vec<TSrgClass>, ParseError> {
    let mut classes = Vec::new();
    let mut current: Option<TSrgClass> = None;
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if is_ignored_line(line) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if line.starts_with('\t') || line.starts_with(' ') {
            let class = match current {
                Some(ref mut class) => class,
                None => return Err(ParseError::UnresolvedReference { line: line_number, text: line.into() }),
            };
            match parts.len() {
                2 => class.fields.push(TSrgField { obf: parts[0].into(), deobf: parts[1].into() }),
                3 => class.methods.push(TSrgMethod {
                    obf: parts[0].into(),
                    obf_signature: parts[1].into(),
                    deobf: parts[2].into(),
                }),
                _ => return Err(ParseError::malformed(line_number, line)),
            }
        } else {
            if parts.len() != 2 {
                return Err(ParseError::malformed(line_number, line));
            }
            classes.extend(current.take());
            current = Some(TSrgClass::new(parts[0], parts[1]));
        }
    }
    classes.extend(current);
    Ok(classes)
}

/// Convert the classes into sorted SRG lines, joined without a trailing newline.
///
/// Class lines are only emitted for classes that are actually renamed,
/// but every member gets a line.
pub fn to_srg(classes: &[TSrgClass]) -> String {
    let class_names: HashMap<&str, &str> = classes.iter()
        .map(|class| (class.obf.as_str(), class.deobf.as_str()))
        .collect();
    let mut records = Vec::new();
    for class in classes {
        if class.obf != class.deobf {
            records.push(SrgRecord::Class { obf: class.obf.clone(), deobf: class.deobf.clone() });
        }
        for field in &class.fields {
            records.push(SrgRecord::Field {
                obf_class: class.obf.clone(),
                obf: field.obf.clone(),
                deobf_class: class.deobf.clone(),
                deobf: field.deobf.clone(),
            });
        }
        for method in &class.methods {
            records.push(SrgRecord::Method {
                obf_class: class.obf.clone(),
                obf: method.obf.clone(),
                obf_signature: method.obf_signature.clone(),
                deobf_class: class.deobf.clone(),
                deobf: method.deobf.clone(),
                deobf_signature: method.deobf_signature(&class_names),
            });
        }
    }
    sorted_lines(&records).join("\n")
}

/// Group SRG records into classes, in the order they first appear.
///
/// Members are attached to the most recent class with the same pair of names,
/// and a class is synthesized for members that come before (or without) their class line.
pub fn tree_from_records<I>(records: I) -> Vec<TSrgClass>
where
    I: IntoIterator<Item = SrgRecord>,
{
    let mut classes: Vec<TSrgClass> = Vec::new();
    let mut by_names: IndexMap<(String, String), usize> = IndexMap::new();
    let mut known_obf: HashSet<String> = HashSet::new();
    {
        let mut class_index = |classes: &mut Vec<TSrgClass>, obf: String, deobf: String| {
            let key = (obf, deobf);
            if let Some(&index) = by_names.get(&key) {
                return index;
            }
            let index = classes.len();
            classes.push(TSrgClass::new(key.0.clone(), key.1.clone()));
            by_names.insert(key, index);
            index
        };
        for record in records {
            match record {
                SrgRecord::Class { obf, deobf } => {
                    if known_obf.insert(obf.clone()) {
                        class_index(&mut classes, obf, deobf);
                    }
                }
                SrgRecord::Field { obf_class, obf, deobf_class, deobf } => {
                    known_obf.insert(obf_class.clone());
                    let index = class_index(&mut classes, obf_class, deobf_class);
                    classes[index].fields.push(TSrgField { obf, deobf });
                }
                SrgRecord::Method { obf_class, obf, obf_signature, deobf_class, deobf, .. } => {
                    known_obf.insert(obf_class.clone());
                    let index = class_index(&mut classes, obf_class, deobf_class);
                    classes[index].methods.push(TSrgMethod { obf, obf_signature, deobf });
                }
            }
        }
    }
    classes
}

/// Parse SRG text into the TSRG tree, tolerating members that come before their class
pub fn from_srg(text: &str) -> Result<Vec<TSrgClass>, ParseError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        records.extend(SrgRecord::parse(index + 1, line)?);
    }
    Ok(tree_from_records(records))
}

/// Write out the classes, with each member on its own tab-indented line
pub fn write_tsrg(classes: &[TSrgClass]) -> String {
    let mut result = String::new();
    for class in classes {
        result.push_str(&format!("{}\n", class));
        for field in &class.fields {
            result.push_str(&format!("\t{}\n", field));
        }
        for method in &class.methods {
            result.push_str(&format!("\t{}\n", method));
        }
    }
    result
}

pub struct TSrgMappingsFormat;
impl MappingsFormat for TSrgMappingsFormat {
    fn parse_text(text: &str) -> Result<Mappings, Error> {
        let classes = parse_tsrg(text)?;
        SrgMappingsFormat::parse_text(&to_srg(&classes))
    }

    fn write_string(mappings: &Mappings) -> String {
        let mut records = SrgRecord::from_mappings(mappings);
        records.sort_by_cached_key(ToString::to_string);
        write_tsrg(&tree_from_records(records))
    }
}
