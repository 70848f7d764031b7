use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use rulebook::{Config, Document, LogoLoader};

#[derive(Parser)]
#[command(name = "rulebook")]
#[command(version)]
#[command(about = "Render a championship regulation document to PDF")]
struct Cli {
    /// Document descriptor (JSON)
    input: PathBuf,

    /// Output file or directory (defaults to the sanitized regulation name in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendering settings (TOML); built-in defaults are used if the file does not exist
    #[arg(short, long, default_value = "rulebook.toml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Svg,
    Typst,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Svg => "svg",
            Format::Typst => "typ",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> rulebook::Result<()> {
    let config = Config::load(&cli.config)?;
    let doc = Document::from_json(&fs::read_to_string(&cli.input)?)?;
    let base = cli.input.parent().unwrap_or(Path::new("."));
    let loader = LogoLoader::new(base);

    let output = output_path(cli.output.as_deref(), &doc.filename(&config.output), cli.format);
    log::info!(
        "rendering {} section(s) from {}",
        doc.sections.len(),
        cli.input.display()
    );

    match cli.format {
        Format::Pdf => {
            let bytes = rulebook::render_pdf(&doc, &config, &loader)?;
            fs::write(&output, bytes)?;
            println!("Created {}", output.display());
        }
        Format::Svg => {
            let svg = rulebook::render_svg(&doc, &config, &loader)?;
            let stem = output
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "page".to_string());
            for (index, page) in svg.pages.iter().enumerate() {
                let path = output.with_file_name(format!("{stem}-{}.svg", index + 1));
                fs::write(&path, page)?;
                println!("Created {}", path.display());
            }
        }
        Format::Typst => {
            let typst = rulebook::document_to_typst(&doc, &config, &loader);
            fs::write(&output, typst.source)?;
            if let Some(logo) = typst.logo {
                let path = output.with_file_name(&logo.name);
                fs::write(&path, logo.bytes)?;
            }
            println!("Created {}", output.display());
        }
    }

    Ok(())
}

/// Resolve the output path: an explicit file, a directory to place the
/// default name in, or the default name in the current directory.
fn output_path(output: Option<&Path>, filename: &str, format: Format) -> PathBuf {
    let default_name = Path::new(filename).with_extension(format.extension());
    match output {
        Some(dir) if dir.is_dir() => dir.join(default_name),
        Some(file) => file.to_path_buf(),
        None => default_name,
    }
}
