//! Deobfuscation mappings for minecraft, and the formats they're stored in.
pub mod bimap;
pub mod format;
pub mod mappings;
pub mod mcp;
pub mod spigot;
pub mod tiny;
pub mod types;
mod version;

pub use self::version::{InvalidMinecraftVersion, MinecraftVersion};

pub mod prelude {
    pub use crate::bimap::RenameError;
    pub use crate::format::{
        CompactSrgMappingsFormat, MappingsFormat, ParseError,
        SrgMappingsFormat, TSrgMappingsFormat,
    };
    pub use crate::mappings::{Mappings, MappingsBuilder};
    pub use crate::tiny::TinyMappings;
    pub use crate::types::{FieldData, JavaType, MethodData, MethodSignature, TypeName};
    pub use crate::MinecraftVersion;
}
