//! The flat SRG format, with one `CL:`, `FD:` or `MD:` record per line.
use std::fmt::{self, Display, Formatter};

use failure::Error;
use itertools::Itertools;
use log::warn;

use super::{is_ignored_line, split_member, MappingsFormat, ParseError};
use crate::bimap::RenameError;
use crate::mappings::{Mappings, MappingsBuilder};
use crate::types::{FieldData, MethodData, MethodSignature, TypeName};

/// A single renaming line of an SRG file, kept in its textual form
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SrgRecord {
    Class {
        obf: String,
        deobf: String,
    },
    Field {
        obf_class: String,
        obf: String,
        deobf_class: String,
        deobf: String,
    },
    Method {
        obf_class: String,
        obf: String,
        obf_signature: String,
        deobf_class: String,
        deobf: String,
        deobf_signature: String,
    },
}
impl SrgRecord {
    /// Parse a line of an SRG file, giving `None` for lines without any renames.
    ///
    /// Package (`PK:`) lines are skipped, since the packages are already part of the class names.
    pub fn parse(line_number: usize, line: &str) -> Result<Option<SrgRecord>, ParseError> {
        if is_ignored_line(line) {
            return Ok(None);
        }
        let malformed = || ParseError::malformed(line_number, line);
        let (kind, rest) = match (line.get(..4), line.get(4..)) {
            (Some(kind), Some(rest)) => (kind, rest),
            _ => return Err(malformed()),
        };
        let parts: Vec<&str> = rest.split_whitespace().collect();
        Ok(Some(match kind {
            "PK: " => return Ok(None),
            "CL: " => {
                if parts.len() != 2 {
                    return Err(malformed());
                }
                SrgRecord::Class { obf: parts[0].into(), deobf: parts[1].into() }
            }
            "FD: " => {
                // Some variants also specify the field's type after each name
                let (obf, deobf) = match parts.len() {
                    2 => (parts[0], parts[1]),
                    4 => (parts[0], parts[2]),
                    _ => return Err(malformed()),
                };
                let (obf_class, obf) = split_member(obf).ok_or_else(malformed)?;
                let (deobf_class, deobf) = split_member(deobf).ok_or_else(malformed)?;
                SrgRecord::Field {
                    obf_class: obf_class.into(),
                    obf: obf.into(),
                    deobf_class: deobf_class.into(),
                    deobf: deobf.into(),
                }
            }
            "MD: " => {
                if parts.len() != 4 {
                    return Err(malformed());
                }
                let (obf_class, obf) = split_member(parts[0]).ok_or_else(malformed)?;
                let (deobf_class, deobf) = split_member(parts[2]).ok_or_else(malformed)?;
                SrgRecord::Method {
                    obf_class: obf_class.into(),
                    obf: obf.into(),
                    obf_signature: parts[1].into(),
                    deobf_class: deobf_class.into(),
                    deobf: deobf.into(),
                    deobf_signature: parts[3].into(),
                }
            }
            _ => return Err(malformed()),
        }))
    }
    /// List the records of the specified mappings, in no particular order
    pub fn from_mappings(mappings: &Mappings) -> Vec<SrgRecord> {
        let mut result = Vec::with_capacity(
            mappings.class_count() + mappings.field_count() + mappings.method_count()
        );
        for (original, renamed) in mappings.classes() {
            result.push(SrgRecord::Class {
                obf: original.internal_name().into(),
                deobf: renamed.internal_name().into(),
            });
        }
        for (original, renamed) in mappings.fields() {
            result.push(SrgRecord::Field {
                obf_class: original.declaring_type.internal_name().into(),
                obf: original.name.clone(),
                deobf_class: renamed.declaring_type.internal_name().into(),
                deobf: renamed.name.clone(),
            });
        }
        for (original, renamed) in mappings.methods() {
            result.push(SrgRecord::Method {
                obf_class: original.declaring_type.internal_name().into(),
                obf: original.name.clone(),
                obf_signature: original.signature.descriptor(),
                deobf_class: renamed.declaring_type.internal_name().into(),
                deobf: renamed.name.clone(),
                deobf_signature: renamed.signature.descriptor(),
            });
        }
        result
    }
    /// Add this record to the builder, skipping methods with unparseable signatures
    fn add_to(&self, line_number: usize, builder: &mut MappingsBuilder) -> Result<(), RenameError> {
        match *self {
            SrgRecord::Class { ref obf, ref deobf } => {
                builder.insert_class(TypeName::new(obf.as_str()), TypeName::new(deobf.as_str()))
            }
            SrgRecord::Field { ref obf_class, ref obf, ref deobf_class, ref deobf } => {
                builder.insert_field(
                    FieldData::new(TypeName::new(obf_class.as_str()), obf.as_str()),
                    FieldData::new(TypeName::new(deobf_class.as_str()), deobf.as_str()),
                )
            }
            SrgRecord::Method {
                ref obf_class, ref obf, ref obf_signature,
                ref deobf_class, ref deobf, ref deobf_signature
            } => {
                let signatures = MethodSignature::from_descriptor(obf_signature)
                    .and_then(|obf| Ok((obf, MethodSignature::from_descriptor(deobf_signature)?)));
                let (obf_signature, deobf_signature) = match signatures {
                    Ok(signatures) => signatures,
                    Err(cause) => {
                        warn!("Skipping method {}/{} on line {}: {}", obf_class, obf, line_number, cause);
                        return Ok(());
                    }
                };
                builder.insert_method(
                    MethodData::new(TypeName::new(obf_class.as_str()), obf.as_str(), obf_signature),
                    MethodData::new(TypeName::new(deobf_class.as_str()), deobf.as_str(), deobf_signature),
                )
            }
        }
    }
}
impl Display for SrgRecord {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            SrgRecord::Class { ref obf, ref deobf } => write!(f, "CL: {} {}", obf, deobf),
            SrgRecord::Field { ref obf_class, ref obf, ref deobf_class, ref deobf } => {
                write!(f, "FD: {}/{} {}/{}", obf_class, obf, deobf_class, deobf)
            }
            SrgRecord::Method {
                ref obf_class, ref obf, ref obf_signature,
                ref deobf_class, ref deobf, ref deobf_signature
            } => write!(
                f, "MD: {}/{} {} {}/{} {}",
                obf_class, obf, obf_signature,
                deobf_class, deobf, deobf_signature
            ),
        }
    }
}

/// Render the records as sorted lines, dropping any blanks
pub(crate) fn sorted_lines<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SrgRecord>,
{
    records.into_iter()
        .map(ToString::to_string)
        .filter(|line| !line.is_empty())
        .sorted()
        .collect()
}

pub struct SrgMappingsFormat;
impl MappingsFormat for SrgMappingsFormat {
    fn parse_text(text: &str) -> Result<Mappings, Error> {
        let mut builder = MappingsBuilder::default();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if let Some(record) = SrgRecord::parse(line_number, line)? {
                record.add_to(line_number, &mut builder)?;
            }
        }
        Ok(builder.build())
    }

    fn write_string(mappings: &Mappings) -> String {
        let records = SrgRecord::from_mappings(mappings);
        let mut result = sorted_lines(&records).join("\n");
        if !result.is_empty() {
            result.push('\n');
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SRG: &str = "\
PK: ./ net/minecraft/server
CL: a net/minecraft/server/World
CL: b net/minecraft/server/Entity
FD: a/c net/minecraft/server/World/field_1_c
MD: a/d (Lb;I)La; net/minecraft/server/World/func_2_d (Lnet/minecraft/server/Entity;I)Lnet/minecraft/server/World;
";

    #[test]
    fn parse_records() {
        assert_eq!(SrgRecord::parse(1, "CL: a b").unwrap(), Some(SrgRecord::Class { obf: "a".into(), deobf: "b".into() }));
        assert_eq!(SrgRecord::parse(1, "# comment").unwrap(), None);
        assert_eq!(SrgRecord::parse(1, "PK: ./ net/minecraft/server").unwrap(), None);
        assert_eq!(
            SrgRecord::parse(1, "FD: a/b I c/d I").unwrap(),
            Some(SrgRecord::Field { obf_class: "a".into(), obf: "b".into(), deobf_class: "c".into(), deobf: "d".into() })
        );
        assert_eq!(
            SrgRecord::parse(7, "CL: a b c").unwrap_err(),
            ParseError::MalformedRecord { line: 7, text: "CL: a b c".into() }
        );
        assert_eq!(SrgRecord::parse(2, "MD: a/b ()V c/d").unwrap_err().line(), 2);
        assert!(SrgRecord::parse(3, "FD: ab cd").is_err());
        assert!(SrgRecord::parse(4, "XX: a b").is_err());
        assert!(SrgRecord::parse(5, "CL:").is_err());
    }

    #[test]
    fn parse_mappings() {
        let mappings = SrgMappingsFormat::parse_text(SRG).unwrap();
        assert_eq!(mappings.class_count(), 2);
        assert_eq!(
            mappings.get_remapped_field(&FieldData::new(TypeName::new("a"), "c")),
            Some(&FieldData::new(TypeName::new("net/minecraft/server/World"), "field_1_c"))
        );
        let method = MethodData::new(
            TypeName::new("a"), "d",
            MethodSignature::from_descriptor("(Lb;I)La;").unwrap()
        );
        assert_eq!(mappings.get_remapped_method(&method).unwrap().name, "func_2_d");
    }

    #[test]
    fn malformed_descriptors_are_skipped() {
        let mappings = SrgMappingsFormat::parse_text("CL: a b\nMD: a/c (1)V b/d (1)V\n").unwrap();
        assert_eq!(mappings.class_count(), 1);
        assert_eq!(mappings.method_count(), 0);
    }

    #[test]
    fn ambiguous_mappings_are_rejected() {
        let error = SrgMappingsFormat::parse_text("CL: a c\nCL: b c\n").unwrap_err();
        match error.downcast_ref::<RenameError>() {
            Some(RenameError::Ambiguous { .. }) => {}
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn write_sorted() {
        let mappings = SrgMappingsFormat::parse_text(SRG).unwrap();
        let written = SrgMappingsFormat::write_string(&mappings);
        assert_eq!(written, "\
CL: a net/minecraft/server/World
CL: b net/minecraft/server/Entity
FD: a/c net/minecraft/server/World/field_1_c
MD: a/d (Lb;I)La; net/minecraft/server/World/func_2_d (Lnet/minecraft/server/Entity;I)Lnet/minecraft/server/World;
");
        assert_eq!(SrgMappingsFormat::parse_text(&written).unwrap(), mappings);
    }
}
