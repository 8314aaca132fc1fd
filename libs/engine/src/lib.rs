//! Any combination of the following mapping systems are supported for any given minecraft version:
//! - `srg` - MCP's unique srg mappings, which are the same for each minecraft version.
//! - `mcp` - MCP's crowd sourced deobfuscated names for the srg members,
//!   read from an exported zip or a directory of CSV files.
//! - `spigot` - Spigot's deobfuscation mappings, held in the `BuildData` git repo
//!   - These are significantly lower quality than the MCP mappings, and most member names are still obfuscated
//! - `intermediary` and `yarn` - Fabric's stable intermediary names and its deobfuscated names,
//!   both distributed as tiny files.
//! - `obf` - The obfuscated mojang names, which are internally used to unify the different mappings systems
//!
//! Mapping targets have a string representation of the form `{original}2{renamed}` with optional flags at the end.
//! For example, `spigot2mcp` specifies mappings from the spigot names into the MCP names.
//! Three flags are supported:
//! - `classes` - Restricts the mappings to just class names.
//! - `members` - Restricts the mappings to just member names.
//! - `onlyobf` - Restricts the mappings to just names that are still obfuscated.
//!   - The motivating example is `spigot2mcp-onlyobf`,
//!     which would take advantage of the MCP mappings
//!     without changing names spigot already deobfuscated.
mod computer;
mod output;
mod provider;
mod target;

pub use self::computer::{
    DuplicateMappingSystem, MappingsTargetComputer, MissingMappings,
    RedundantTarget, TargetComputeError,
};
pub use self::output::{GeneratedMappings, MappingsSummary};
pub use self::provider::{
    parse_file, FileProvider, InvalidSource, McpProvider, MappingsProvider,
    MissingNamespace, SpigotProvider, TinyProvider, UnknownFormat,
};
pub use self::target::{
    InvalidTarget, MappingSystem, TargetFilter, TargetFlags,
    TargetMapping, UnknownMappingSystem,
};
