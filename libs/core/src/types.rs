//! The symbols a mapping renames: classes, fields and methods.
//!
//! Class names are always kept in their internal form (`net/minecraft/server/World`),
//! and converted to the dotted form only when asked for.
use std::fmt::{self, Display, Formatter};

use failure_derive::Fail;

/// A fully qualified class name.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeName(String);
impl TypeName {
    /// Create a type name from either its internal or its dotted form
    #[inline]
    pub fn new<S: Into<String>>(name: S) -> TypeName {
        let name = name.into();
        if name.contains('.') {
            TypeName(name.replace('.', "/"))
        } else {
            TypeName(name)
        }
    }
    #[inline]
    pub fn internal_name(&self) -> &str {
        &self.0
    }
    /// The dotted form of this name
    #[inline]
    pub fn name(&self) -> String {
        self.0.replace('/', ".")
    }
    /// The final segment of the name, without any package
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(index) => &self.0[(index + 1)..],
            None => &self.0,
        }
    }
    /// The internal name of the package, which is empty for the default package
    pub fn package(&self) -> &str {
        match self.0.rfind('/') {
            Some(index) => &self.0[..index],
            None => "",
        }
    }
    pub fn with_package(&self, package: &str) -> TypeName {
        if package.is_empty() {
            TypeName(self.simple_name().into())
        } else {
            TypeName(format!("{}/{}", package, self.simple_name()))
        }
    }
    #[inline]
    pub fn descriptor(&self) -> String {
        format!("L{};", self.0)
    }
}
impl Display for TypeName {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
}
impl PrimitiveType {
    pub fn from_descriptor(c: char) -> Option<PrimitiveType> {
        Some(match c {
            'B' => PrimitiveType::Byte,
            'C' => PrimitiveType::Char,
            'D' => PrimitiveType::Double,
            'F' => PrimitiveType::Float,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'S' => PrimitiveType::Short,
            'Z' => PrimitiveType::Boolean,
            'V' => PrimitiveType::Void,
            _ => return None,
        })
    }
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Double => 'D',
            PrimitiveType::Float => 'F',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Short => 'S',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Void => 'V',
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum JavaType {
    Primitive(PrimitiveType),
    Class(TypeName),
    Array(Box<JavaType>),
}
impl JavaType {
    pub fn from_descriptor(descriptor: &str) -> Result<JavaType, InvalidDescriptor> {
        let (result, remaining) = parse_type(descriptor, descriptor)?;
        if !remaining.is_empty() {
            return Err(InvalidDescriptor(descriptor.into()));
        }
        Ok(result)
    }
    #[inline]
    pub fn is_void(&self) -> bool {
        *self == JavaType::Primitive(PrimitiveType::Void)
    }
    pub fn descriptor(&self) -> String {
        let mut result = String::new();
        self.write_descriptor(&mut result);
        result
    }
    fn write_descriptor(&self, buffer: &mut String) {
        match *self {
            JavaType::Primitive(primitive) => buffer.push(primitive.descriptor()),
            JavaType::Class(ref name) => {
                buffer.push('L');
                buffer.push_str(name.internal_name());
                buffer.push(';');
            }
            JavaType::Array(ref element) => {
                buffer.push('[');
                element.write_descriptor(buffer);
            }
        }
    }
    /// Rename every class this type references, keeping the ones `func` doesn't know about
    pub fn map_classes<F>(&self, func: &mut F) -> JavaType
    where
        F: FnMut(&TypeName) -> Option<TypeName>,
    {
        match *self {
            JavaType::Primitive(primitive) => JavaType::Primitive(primitive),
            JavaType::Class(ref name) => JavaType::Class(func(name).unwrap_or_else(|| name.clone())),
            JavaType::Array(ref element) => JavaType::Array(Box::new(element.map_classes(func))),
        }
    }
}

/// Parse a single type from the start of `remaining`, returning whatever is left over
fn parse_type<'a>(descriptor: &str, remaining: &'a str) -> Result<(JavaType, &'a str), InvalidDescriptor> {
    let error = || InvalidDescriptor(descriptor.into());
    let first = remaining.chars().next().ok_or_else(error)?;
    match first {
        'L' => {
            let end = remaining.find(';').ok_or_else(error)?;
            let name = &remaining[1..end];
            if name.is_empty() {
                return Err(error());
            }
            Ok((JavaType::Class(TypeName::new(name)), &remaining[(end + 1)..]))
        }
        '[' => {
            let (element, remaining) = parse_type(descriptor, &remaining[1..])?;
            if element.is_void() {
                return Err(error());
            }
            Ok((JavaType::Array(Box::new(element)), remaining))
        }
        c => {
            let primitive = PrimitiveType::from_descriptor(c).ok_or_else(error)?;
            Ok((JavaType::Primitive(primitive), &remaining[c.len_utf8()..]))
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodSignature {
    parameters: Vec<JavaType>,
    return_type: JavaType,
}
impl MethodSignature {
    #[inline]
    pub fn new(parameters: Vec<JavaType>, return_type: JavaType) -> MethodSignature {
        MethodSignature { parameters, return_type }
    }
    pub fn from_descriptor(descriptor: &str) -> Result<MethodSignature, InvalidDescriptor> {
        let error = || InvalidDescriptor(descriptor.into());
        if !descriptor.starts_with('(') {
            return Err(error());
        }
        let mut remaining = &descriptor[1..];
        let mut parameters = Vec::new();
        loop {
            if remaining.starts_with(')') {
                remaining = &remaining[1..];
                break;
            }
            let (parameter, rest) = parse_type(descriptor, remaining)?;
            if parameter.is_void() {
                return Err(error());
            }
            parameters.push(parameter);
            remaining = rest;
        }
        let (return_type, remaining) = parse_type(descriptor, remaining)?;
        if !remaining.is_empty() {
            return Err(error());
        }
        Ok(MethodSignature { parameters, return_type })
    }
    #[inline]
    pub fn parameters(&self) -> &[JavaType] {
        &self.parameters
    }
    #[inline]
    pub fn return_type(&self) -> &JavaType {
        &self.return_type
    }
    pub fn descriptor(&self) -> String {
        let mut result = String::with_capacity(16);
        result.push('(');
        for parameter in &self.parameters {
            parameter.write_descriptor(&mut result);
        }
        result.push(')');
        self.return_type.write_descriptor(&mut result);
        result
    }
    pub fn map_classes<F>(&self, mut func: F) -> MethodSignature
    where
        F: FnMut(&TypeName) -> Option<TypeName>,
    {
        MethodSignature {
            parameters: self.parameters.iter().map(|parameter| parameter.map_classes(&mut func)).collect(),
            return_type: self.return_type.map_classes(&mut func),
        }
    }
}
impl Display for MethodSignature {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldData {
    pub declaring_type: TypeName,
    pub name: String,
}
impl FieldData {
    #[inline]
    pub fn new<S: Into<String>>(declaring_type: TypeName, name: S) -> FieldData {
        FieldData { declaring_type, name: name.into() }
    }
    #[inline]
    pub fn with_name<S: Into<String>>(&self, name: S) -> FieldData {
        FieldData::new(self.declaring_type.clone(), name)
    }
}
impl Display for FieldData {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.declaring_type, self.name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodData {
    pub declaring_type: TypeName,
    pub name: String,
    pub signature: MethodSignature,
}
impl MethodData {
    #[inline]
    pub fn new<S: Into<String>>(declaring_type: TypeName, name: S, signature: MethodSignature) -> MethodData {
        MethodData { declaring_type, name: name.into(), signature }
    }
    #[inline]
    pub fn with_name<S: Into<String>>(&self, name: S) -> MethodData {
        MethodData::new(self.declaring_type.clone(), name, self.signature.clone())
    }
}
impl Display for MethodData {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{} {}", self.declaring_type, self.name, self.signature)
    }
}

/// Rewrite the class references embedded in a raw descriptor.
///
/// Only the text between an `L` and the following `;` is considered a class,
/// and names `lookup` doesn't know about are left alone.
/// Unlike going through [`MethodSignature`] this never fails,
/// so it's usable on descriptors we can't otherwise parse.
pub fn remap_descriptor<'a, F>(descriptor: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut result = String::with_capacity(descriptor.len());
    let mut remaining = descriptor;
    while let Some(start) = remaining.find('L') {
        result.push_str(&remaining[..start]);
        let class = &remaining[(start + 1)..];
        match class.find(';') {
            Some(end) => {
                let name = &class[..end];
                result.push('L');
                result.push_str(lookup(name).unwrap_or(name));
                result.push(';');
                remaining = &class[(end + 1)..];
            }
            None => {
                // Unterminated, so there's nothing to rename
                result.push_str(&remaining[start..]);
                remaining = "";
            }
        }
    }
    result.push_str(remaining);
    result
}

/// The category of a renamed symbol
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SymbolKind {
    Class,
    Field,
    Method,
}
impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            SymbolKind::Class => "class",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
        })
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Invalid descriptor {:?}", _0)]
pub struct InvalidDescriptor(pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_signature() {
        let signature = MethodSignature::from_descriptor("(I[JLa;[[Ljava/lang/String;)Lb;").unwrap();
        assert_eq!(signature.parameters(), &[
            JavaType::Primitive(PrimitiveType::Int),
            JavaType::Array(Box::new(JavaType::Primitive(PrimitiveType::Long))),
            JavaType::Class(TypeName::new("a")),
            JavaType::Array(Box::new(JavaType::Array(Box::new(
                JavaType::Class(TypeName::new("java/lang/String"))
            )))),
        ][..]);
        assert_eq!(*signature.return_type(), JavaType::Class(TypeName::new("b")));
        assert_eq!(signature.descriptor(), "(I[JLa;[[Ljava/lang/String;)Lb;");
    }

    #[test]
    fn invalid_signatures() {
        for descriptor in &["", "V", "(", "(I", "()", "(V)V", "(1)V", "(La)V", "(L;)V", "()VV", "([V)V"] {
            assert!(
                MethodSignature::from_descriptor(descriptor).is_err(),
                "Expected {:?} to be invalid", descriptor
            );
        }
    }

    #[test]
    fn field_descriptor() {
        assert_eq!(
            JavaType::from_descriptor("[Lnet/minecraft/server/World;").unwrap(),
            JavaType::Array(Box::new(JavaType::Class(TypeName::new("net.minecraft.server.World"))))
        );
        assert!(JavaType::from_descriptor("Lunk;I").is_err());
    }

    #[test]
    fn map_signature_classes() {
        let signature = MethodSignature::from_descriptor("(La;[Lb;I)La;").unwrap();
        let renamed = signature.map_classes(|name| {
            if name.internal_name() == "a" { Some(TypeName::new("World")) } else { None }
        });
        assert_eq!(renamed.descriptor(), "(LWorld;[Lb;I)LWorld;");
    }

    #[test]
    fn type_names() {
        let name = TypeName::new("net.minecraft.server.World");
        assert_eq!(name.internal_name(), "net/minecraft/server/World");
        assert_eq!(name.name(), "net.minecraft.server.World");
        assert_eq!(name.simple_name(), "World");
        assert_eq!(name.package(), "net/minecraft/server");
        assert_eq!(TypeName::new("a").package(), "");
        assert_eq!(TypeName::new("a").with_package("net/minecraft/server").internal_name(), "net/minecraft/server/a");
        assert_eq!(name.with_package("").internal_name(), "World");
    }

    #[test]
    fn remap_descriptor_classes() {
        let names = [("a", "b"), ("GLX", "Graphics")];
        let lookup = |name: &str| names.iter()
            .find(|&&(original, _)| original == name)
            .map(|&(_, renamed)| renamed);
        assert_eq!(remap_descriptor("(La;)V", lookup), "(Lb;)V");
        assert_eq!(remap_descriptor("(ILGLX;[La;)Lc;", lookup), "(ILGraphics;[Lb;)Lc;");
        // Renames are applied once, never chained
        let chained = |name: &str| match name {
            "a" => Some("b"),
            "b" => Some("c"),
            _ => None,
        };
        assert_eq!(remap_descriptor("(La;Lb;)V", chained), "(Lb;Lc;)V");
    }

    #[test]
    fn remap_descriptor_without_names() {
        for descriptor in &["(La;)V", "(IJ[Ljava/lang/Object;)Lb;", "()V", "(Lbroken"] {
            assert_eq!(remap_descriptor(descriptor, |_| None), *descriptor);
        }
    }
}
