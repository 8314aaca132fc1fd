//! The compact SRG format used by Spigot's BuildData.
//!
//! Classes are `obf deobf`, fields `owner obf deobf` and methods `owner obf signature deobf`.
//! Members never change their declaring class.
use failure::Error;
use itertools::Itertools;
use log::warn;

use super::{is_ignored_line, MappingsFormat, ParseError};
use crate::mappings::{Mappings, MappingsBuilder};
use crate::types::{FieldData, MethodData, MethodSignature, TypeName};

pub struct CompactSrgMappingsFormat;
impl MappingsFormat for CompactSrgMappingsFormat {
    fn parse_text(text: &str) -> Result<Mappings, Error> {
        let mut builder = MappingsBuilder::default();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if is_ignored_line(line) {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.len() {
                2 => builder.insert_class(TypeName::new(parts[0]), TypeName::new(parts[1]))?,
                3 => builder.set_field_name(FieldData::new(TypeName::new(parts[0]), parts[1]), parts[2])?,
                4 => {
                    let signature = match MethodSignature::from_descriptor(parts[2]) {
                        Ok(signature) => signature,
                        Err(cause) => {
                            warn!("Skipping method {}/{} on line {}: {}", parts[0], parts[1], line_number, cause);
                            continue;
                        }
                    };
                    let original = MethodData::new(TypeName::new(parts[0]), parts[1], signature);
                    builder.set_method_name(original, parts[3])?;
                }
                _ => return Err(ParseError::malformed(line_number, line).into()),
            }
        }
        Ok(builder.build())
    }

    fn write_string(mappings: &Mappings) -> String {
        let classes = mappings.classes()
            .map(|(original, renamed)| format!("{} {}", original, renamed));
        let fields = mappings.fields().map(|(original, renamed)| {
            format!("{} {} {}", original.declaring_type, original.name, renamed.name)
        });
        let methods = mappings.methods().map(|(original, renamed)| {
            format!(
                "{} {} {} {}",
                original.declaring_type, original.name,
                original.signature, renamed.name
            )
        });
        let mut result = classes.chain(fields).chain(methods).sorted().join("\n");
        if !result.is_empty() {
            result.push('\n');
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_compact() {
        let text = "# BuildData\na World\nWorld b players\nWorld c (LWorld;I)V tick\n";
        let mappings = CompactSrgMappingsFormat::parse_text(text).unwrap();
        let world = TypeName::new("World");
        assert_eq!(mappings.get_remapped_class(&TypeName::new("a")), Some(&world));
        assert_eq!(
            mappings.get_remapped_field(&FieldData::new(world.clone(), "b")),
            Some(&FieldData::new(world.clone(), "players"))
        );
        let signature = MethodSignature::from_descriptor("(LWorld;I)V").unwrap();
        assert_eq!(
            mappings.get_remapped_method(&MethodData::new(world.clone(), "c", signature.clone())),
            Some(&MethodData::new(world.clone(), "tick", signature))
        );
        assert_eq!(CompactSrgMappingsFormat::write_string(&mappings), "\
World b players
World c (LWorld;I)V tick
a World
");
    }

    #[test]
    fn malformed_lines() {
        let error = CompactSrgMappingsFormat::parse_text("a b\na b c d e\n").unwrap_err();
        assert_eq!(error.downcast_ref::<ParseError>().map(ParseError::line), Some(2));
        let mappings = CompactSrgMappingsFormat::parse_text("World c (Lbroken)V tick\n").unwrap();
        assert!(mappings.is_empty());
    }
}
