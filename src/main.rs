//! nhkit CLI - Command-line tool for Animal Crossing: New Horizons files.
//!
//! This is the main entry point for the nhkit command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use nhkit::prelude::*;

/// nhkit - Animal Crossing: New Horizons asset and save tool
#[derive(Parser)]
#[command(name = "nhkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a BYAML document as a tree or JSON
    ByamlDump {
        /// Input BYAML file
        #[arg(short, long, env = "INPUT_BYAML")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit JSON instead of the tree view
        #[arg(long)]
        json: bool,
    },

    /// Find every value stored under a key in a BYAML document
    ByamlFind {
        /// Input BYAML file
        #[arg(short, long, env = "INPUT_BYAML")]
        input: PathBuf,

        /// Hash key to search for
        key: String,
    },

    /// Resolve a field offset from a save-layout document
    LayoutOffset {
        /// Layout BYAML file
        #[arg(short, long, env = "INPUT_BYAML")]
        input: PathBuf,

        /// Type name, e.g. GSavePlayer
        type_name: String,

        /// Field path below the type
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// List contents of a SARC archive
    SarcList {
        /// Path to the SARC file (.sarc, .pack, .zs)
        #[arg(short, long, env = "INPUT_SARC")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract files from a SARC archive
    SarcExtract {
        /// Path to the SARC file (.sarc, .pack, .zs)
        #[arg(short, long, env = "INPUT_SARC")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print a BCSV table
    BcsvDump {
        /// Input BCSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the messages of an MSBT file
    MsbtDump {
        /// Input MSBT file
        #[arg(short, long)]
        input: PathBuf,

        /// Strip inline control tags
        #[arg(short, long)]
        plain: bool,
    },

    /// Encrypt or decrypt a save file with its header
    SaveCrypt {
        /// Save header file (e.g. mainHeader.dat)
        #[arg(long, env = "SAVE_HEADER")]
        header: PathBuf,

        /// Save data file (e.g. main.dat)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decode an encrypted integer
    EncInt {
        /// Packed 64-bit value (hex with 0x prefix, or decimal)
        value: String,
    },

    /// Decrypt a BFTTF/BFOTF font
    BfttfDecrypt {
        /// Input font file
        #[arg(short, long)]
        input: PathBuf,

        /// Output TTF/OTF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt a TTF/OTF font into BFTTF form
    BfttfEncrypt {
        /// Input font file
        #[arg(short, long)]
        input: PathBuf,

        /// Output BFTTF file
        #[arg(short, long)]
        output: PathBuf,

        /// Target platform
        #[arg(short, long, value_enum, default_value_t = FontPlatform::Switch)]
        platform: FontPlatform,
    },

    /// Print the MurmurHash3 of strings
    Hash {
        /// Strings to hash
        #[arg(required = true)]
        strings: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FontPlatform {
    Windows,
    Switch,
    WiiU,
}

impl From<FontPlatform> for Platform {
    fn from(p: FontPlatform) -> Self {
        match p {
            FontPlatform::Windows => Platform::Windows,
            FontPlatform::Switch => Platform::Switch,
            FontPlatform::WiiU => Platform::WiiU,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::ByamlDump { input, output, json } => {
            cmd_byaml_dump(&input, output.as_deref(), json)?;
        }
        Commands::ByamlFind { input, key } => {
            cmd_byaml_find(&input, &key)?;
        }
        Commands::LayoutOffset { input, type_name, path } => {
            cmd_layout_offset(&input, &type_name, &path)?;
        }
        Commands::SarcList { archive, filter, detailed } => {
            cmd_sarc_list(&archive, filter.as_deref(), detailed)?;
        }
        Commands::SarcExtract { archive, output, filter } => {
            cmd_sarc_extract(&archive, &output, filter.as_deref())?;
        }
        Commands::BcsvDump { input } => {
            cmd_bcsv_dump(&input)?;
        }
        Commands::MsbtDump { input, plain } => {
            cmd_msbt_dump(&input, plain)?;
        }
        Commands::SaveCrypt { header, input, output } => {
            cmd_save_crypt(&header, &input, &output)?;
        }
        Commands::EncInt { value } => {
            cmd_enc_int(&value)?;
        }
        Commands::BfttfDecrypt { input, output } => {
            cmd_bfttf_decrypt(&input, &output)?;
        }
        Commands::BfttfEncrypt { input, output, platform } => {
            cmd_bfttf_encrypt(&input, &output, platform.into())?;
        }
        Commands::Hash { strings } => {
            for s in &strings {
                println!("{:08x}  {}", murmur::hash_str(s), s);
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_byaml_dump(input: &Path, output: Option<&Path>, json: bool) -> Result<()> {
    let doc = Byaml::open(input).context("Failed to parse BYAML document")?;

    let text = if json {
        doc.to_json_string(true).context("Failed to serialize JSON")?
    } else {
        doc.to_text()
    };

    match output {
        Some(path) => {
            fs::write(path, text).context("Failed to write output file")?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

fn cmd_byaml_find(input: &Path, key: &str) -> Result<()> {
    let doc = Byaml::open(input).context("Failed to parse BYAML document")?;

    let results = doc.find(key);
    for node in &results {
        print!("{}", node.tree());
    }
    println!("\nTotal: {} values", results.len());

    Ok(())
}

fn cmd_layout_offset(input: &Path, type_name: &str, path: &[String]) -> Result<()> {
    let doc = Byaml::open(input).context("Failed to parse layout document")?;
    let layout = Layout::new(&doc).context("Failed to index layout document")?;

    let type_hash = murmur::hash_str(type_name);
    let fields: Vec<u32> = path.iter().map(|f| murmur::hash_str(f)).collect();
    tracing::debug!(type_hash, ?fields, "resolving layout path");

    let offset = layout.offset_of(type_hash, &fields)?;
    let size = layout.size_of(type_hash, &fields)?;
    println!("{}.{}: offset {:#x}, size {:#x}", type_name, path.join("."), offset, size);

    Ok(())
}

fn open_archive(path: &Path) -> Result<Sarc> {
    Sarc::open(path).with_context(|| format!("Failed to open SARC archive {}", path.display()))
}

fn glob_filter(filter: Option<&str>) -> Result<Option<glob::Pattern>> {
    filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")
}

fn cmd_sarc_list(path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = open_archive(path)?;
    let pattern = glob_filter(filter)?;

    let mut count = 0;
    for entry in archive.entries() {
        if let Some(pattern) = &pattern {
            if !pattern.matches(entry.name()) {
                continue;
            }
        }

        if detailed {
            println!("{:>12} {:08x} {}", entry.size(), entry.name_hash(), entry.name());
        } else {
            println!("{}", entry.name());
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_sarc_extract(path: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    println!("Opening SARC archive: {}", path.display());

    let start = Instant::now();
    let archive = open_archive(path)?;
    println!("Loaded {} entries in {:?}", archive.len(), start.elapsed());

    let pattern = glob_filter(filter)?;
    let entries: Vec<&SarcEntry> = archive
        .entries()
        .iter()
        .filter(|e| pattern.as_ref().map_or(true, |p| p.matches(e.name())))
        .collect();

    println!("Extracting {} entries...", entries.len());

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    for entry in entries {
        let out_path = nhkit::sarc::output_path(output, entry.name());
        archive
            .extract(entry.name(), &out_path)
            .with_context(|| format!("Failed to extract {}", entry.name()))?;
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

fn cmd_bcsv_dump(input: &Path) -> Result<()> {
    let table = Bcsv::open(input).context("Failed to parse BCSV table")?;
    print!("{table}");
    Ok(())
}

fn cmd_msbt_dump(input: &Path, plain: bool) -> Result<()> {
    let msbt = Msbt::open(input).context("Failed to parse MSBT file")?;

    for message in msbt.iter() {
        let label = message.label.as_deref().unwrap_or("-");
        let text = if plain { &message.plain } else { &message.text };
        println!("{label}\t{}", text.replace('\n', "\\n"));
    }

    Ok(())
}

fn cmd_save_crypt(header: &Path, input: &Path, output: &Path) -> Result<()> {
    println!("Crypting save: {} -> {}", input.display(), output.display());

    let header = SaveHeader::open(header).context("Failed to read save header")?;
    let mut data = fs::read(input).context("Failed to read save file")?;

    let start = Instant::now();
    header.crypt(&mut data);
    fs::write(output, data).context("Failed to write output file")?;

    println!("Done in {:?}", start.elapsed());

    Ok(())
}

fn cmd_enc_int(value: &str) -> Result<()> {
    let raw = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    }
    .context("Invalid packed value")?;

    let packed = EncryptedInt::from_raw(raw);
    let decoded = packed.decrypt()?;
    println!(
        "{decoded} (adjust {:#06x}, shift {}, checksum {:#04x})",
        packed.adjust(),
        packed.shift(),
        packed.checksum()
    );

    Ok(())
}

fn cmd_bfttf_decrypt(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let platform = bfttf::detect(&data)?;
    let font = bfttf::decrypt(&data).context("Failed to decrypt font")?;
    fs::write(output, font).context("Failed to write output file")?;

    println!("Decrypted {platform} font: {}", output.display());

    Ok(())
}

fn cmd_bfttf_encrypt(input: &Path, output: &Path, platform: Platform) -> Result<()> {
    let font = fs::read(input).context("Failed to read input file")?;
    fs::write(output, bfttf::encrypt(&font, platform)).context("Failed to write output file")?;

    println!("Encrypted {platform} font: {}", output.display());

    Ok(())
}
