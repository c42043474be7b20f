use std::path::PathBuf;

use anyhow::Context;
use badgecomp::{placeholder, Catalog, Compositor, CompositorConfig, DefaultLoader, ImageSource};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "badgecomp", version, about = "Combine badge images side by side into one PNG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite the selected badges and save the PNG
    Combine(CombineArgs),
    /// Render the placeholder badge images
    Placeholders {
        #[arg(long, default_value = "badges")]
        out_dir: PathBuf,
    },
    /// List the badge names in the catalog
    Catalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CombineArgs {
    /// Tier badge name from the catalog (e.g. gold)
    #[arg(long)]
    tier: Option<String>,
    /// Value badge name from the catalog (e.g. empathize)
    #[arg(long)]
    value: Option<String>,
    /// Prepend the catalog's anchor logo at native size
    #[arg(long)]
    logo: bool,
    /// Extra image sources: paths, http(s) URLs or data: URLs (repeatable)
    #[arg(long = "file")]
    files: Vec<String>,
    /// JSON catalog (defaults to the built-in badges/ layout)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Directory or URL to resolve relative catalog entries against
    #[arg(long)]
    base: Option<String>,
    /// JSON compositor configuration
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Output file name (overrides the configuration)
    #[arg(long)]
    filename: Option<String>,
    /// Per-image load timeout in milliseconds (overrides the configuration)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => Catalog::from_json_file(p).with_context(|| format!("loading catalog {}", p.display())),
        None => Ok(Catalog::default()),
    }
}

async fn combine(args: CombineArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            serde_json::from_str::<CompositorConfig>(&text)
                .map_err(|e| badgecomp::Error::ConfigError(e.to_string()))
                .with_context(|| format!("parsing {}", p.display()))?
        }
        None => CompositorConfig::default(),
    };
    if let Some(name) = args.filename {
        config.output_filename = name;
    }
    if let Some(ms) = args.timeout_ms {
        config.load_timeout_ms = ms;
    }

    let mut catalog = load_catalog(args.catalog.as_ref())?;
    if let Some(base) = args.base {
        catalog = catalog.with_base(base);
    }

    let mut selection = Vec::new();
    if let Some(tier) = &args.tier {
        selection.push(catalog.tier(tier)?);
    }
    if let Some(value) = &args.value {
        selection.push(catalog.value(value)?);
    }
    for f in &args.files {
        selection.push(ImageSource::parse(f)?);
    }
    let anchor = if args.logo { Some(catalog.anchor()?) } else { None };

    let compositor = Compositor::new(config);
    let loader = DefaultLoader::new(compositor.config())?;
    let result = compositor.composite_sources(&loader, &selection, anchor.as_ref()).await?;
    if let Some(path) = compositor.export_as_download(&args.out_dir)? {
        println!("{} ({}x{})", path.display(), result.width, result.height);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Combine(args) => combine(args).await,
        Command::Placeholders { out_dir } => {
            let written = placeholder::generate_placeholders(&out_dir)
                .with_context(|| format!("writing placeholders to {}", out_dir.display()))?;
            for p in written {
                println!("{}", p.display());
            }
            Ok(())
        }
        Command::Catalog { catalog } => {
            let catalog = load_catalog(catalog.as_ref())?;
            println!("tiers:  {}", catalog.tiers.keys().cloned().collect::<Vec<_>>().join(", "));
            println!("values: {}", catalog.values.keys().cloned().collect::<Vec<_>>().join(", "));
            if let Some(anchor) = &catalog.anchor {
                println!("anchor: {}", anchor);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()).await {
        let kind = err
            .downcast_ref::<badgecomp::Error>()
            .map(|e| e.kind())
            .unwrap_or("Error");
        eprintln!("{}: {:#}", kind, err);
        std::process::exit(1);
    }
}
