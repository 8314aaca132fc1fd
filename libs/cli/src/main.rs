#[macro_use]
extern crate clap;

use std::path::{Path, PathBuf};
use std::fs;

use failure::{bail, Error};
use log::info;

use mappings::format::tsrg::{from_srg, write_tsrg};
use mappings::prelude::*;
use engine::{
    parse_file, FileProvider, GeneratedMappings, McpProvider, MappingSystem,
    MappingsProvider, MappingsTargetComputer, SpigotProvider, TargetMapping, TinyProvider,
};

fn app() -> clap::App<'static, 'static> {
    clap_app!(mappings_generator =>
        (version: crate_version!())
        (author: crate_authors!())
        (about: crate_description!())
        (@setting SubcommandRequiredElseHelp)
        (@subcommand generate =>
            (about: "Generate mappings between every pair of the loaded systems")
            (@arg out: --out +takes_value default_value[mappings] "The directory to place the version's mappings in")
            (@arg mcp: --mcp +takes_value "MCP's names, either an exported zip or a directory of CSV files")
            (@arg spigot: --spigot +takes_value "A local checkout of spigot's BuildData")
            (@arg yarn: --yarn +takes_value "A tiny file with the yarn names")
            (@arg targets: --target +takes_value +multiple number_of_values(1) "Additional targets to generate, like spigot2mcp-onlyobf")
            (@arg minecraft_version: +required "The minecraft version to generate the mappings for")
            (@arg sources: +multiple "Base mappings from the obfuscated names, given as system=path")
        )
        (@subcommand convert =>
            (about: "Convert mappings into another format, based on the file extensions")
            (@arg input: +required "The srg, tsrg or csrg file to read")
            (@arg output: +required "The srg, tsrg or csrg file to write")
        )
    )
}

fn generate(matches: &clap::ArgMatches) -> Result<(), Error> {
    let minecraft_version = value_t!(matches, "minecraft_version", MinecraftVersion)
        .unwrap_or_else(|e| e.exit());
    let targets: Vec<TargetMapping> = if matches.is_present("targets") {
        values_t!(matches, "targets", TargetMapping).unwrap_or_else(|e| e.exit())
    } else {
        Vec::new()
    };
    let mut providers: Vec<Box<dyn MappingsProvider>> = Vec::new();
    if matches.is_present("sources") {
        for source in values_t!(matches, "sources", FileProvider).unwrap_or_else(|e| e.exit()) {
            providers.push(Box::new(source));
        }
    }
    if let Some(mcp) = matches.value_of("mcp") {
        providers.push(Box::new(McpProvider::new(PathBuf::from(mcp))));
    }
    if let Some(spigot) = matches.value_of("spigot") {
        providers.push(Box::new(SpigotProvider::new(PathBuf::from(spigot))));
    }
    if let Some(yarn) = matches.value_of("yarn") {
        providers.push(Box::new(TinyProvider::new(MappingSystem::Yarn, PathBuf::from(yarn))));
    }
    if providers.is_empty() {
        bail!("No mappings given for {}", minecraft_version);
    }
    let mut computer = MappingsTargetComputer::new(minecraft_version);
    computer.load(&providers)?;
    let generated = GeneratedMappings::generate(&computer, &targets)?;
    let out = PathBuf::from(matches.value_of("out").unwrap_or("mappings"));
    let location = generated.write(&out)?;
    info!("{}: wrote {} targets to {}", minecraft_version, generated.targets.len(), location.display());
    Ok(())
}

fn convert(input: &Path, output: &Path) -> Result<(), Error> {
    let text = match (extension(input), extension(output)) {
        // Keep the class order when going straight from srg to tsrg
        (Some("srg"), Some("tsrg")) => write_tsrg(&from_srg(&fs::read_to_string(input)?)?),
        (_, Some("srg")) => SrgMappingsFormat::write_string(&parse_file(input)?),
        (_, Some("tsrg")) => TSrgMappingsFormat::write_string(&parse_file(input)?),
        (_, Some("csrg")) => CompactSrgMappingsFormat::write_string(&parse_file(input)?),
        _ => bail!("Unknown mappings format for {}", output.display()),
    };
    info!("Converted {} into {}", input.display(), output.display());
    fs::write(output, text)?;
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|extension| extension.to_str())
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = app().get_matches();
    match matches.subcommand() {
        ("generate", Some(matches)) => generate(matches),
        ("convert", Some(matches)) => {
            let input = PathBuf::from(matches.value_of("input").unwrap_or_default());
            let output = PathBuf::from(matches.value_of("output").unwrap_or_default());
            convert(&input, &output)
        },
        _ => unreachable!(),
    }
}
