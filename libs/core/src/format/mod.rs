use std::io::{BufRead, Read, Write};

use failure::Error;
use failure_derive::Fail;

use crate::mappings::Mappings;

pub mod csrg;
pub mod srg;
pub mod tsrg;

pub use self::csrg::CompactSrgMappingsFormat;
pub use self::srg::SrgMappingsFormat;
pub use self::tsrg::TSrgMappingsFormat;

/// A textual format that a complete [`Mappings`] can be read from and written to
pub trait MappingsFormat {
    fn parse_text(text: &str) -> Result<Mappings, Error>;
    /// Serialize the mappings, with the lines in a canonical (sorted) order
    fn write_string(mappings: &Mappings) -> String;
    fn parse_stream<R: BufRead>(mut reader: R) -> Result<Mappings, Error> {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        Self::parse_text(&buffer)
    }
    fn write<W: Write>(mappings: &Mappings, mut writer: W) -> Result<(), Error> {
        writer.write_all(Self::write_string(mappings).as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Fail, Clone, Eq, PartialEq)]
pub enum ParseError {
    #[fail(display = "Malformed record on line {}: {:?}", line, text)]
    MalformedRecord { line: usize, text: String },
    #[fail(display = "Member on line {} has no declaring class: {:?}", line, text)]
    UnresolvedReference { line: usize, text: String },
}
impl ParseError {
    #[inline]
    pub(crate) fn malformed(line: usize, text: &str) -> ParseError {
        ParseError::MalformedRecord { line, text: text.into() }
    }
    #[inline]
    pub fn line(&self) -> usize {
        match *self {
            ParseError::MalformedRecord { line, .. } |
            ParseError::UnresolvedReference { line, .. } => line,
        }
    }
}

/// Split a `class/member` reference on the final slash
pub(crate) fn split_member(reference: &str) -> Option<(&str, &str)> {
    let index = reference.rfind('/')?;
    let (class, member) = (&reference[..index], &reference[(index + 1)..]);
    if class.is_empty() || member.is_empty() {
        return None;
    }
    Some((class, member))
}

#[inline]
pub(crate) fn is_ignored_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_member_reference() {
        assert_eq!(split_member("net/minecraft/World/tick"), Some(("net/minecraft/World", "tick")));
        assert_eq!(split_member("a/b"), Some(("a", "b")));
        assert_eq!(split_member("ab"), None);
        assert_eq!(split_member("a/"), None);
        assert_eq!(split_member("/b"), None);
    }
}
