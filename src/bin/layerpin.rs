use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use layerpin::{
    ArtifactSet, ArtifactStore, CharacterDescription, Config, DirLayerSource, LayerSource,
    MemoryStore, PipelineOpts, PublishPipeline, ReplacePolicy, ThumbnailSpec, encode_png,
    pin_file_name, render_character,
};

#[derive(Parser, Debug)]
#[command(name = "layerpin", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a character and publish the image and profile thumbnail.
    Publish(PublishArgs),
    /// Composite a character from local layers and write both PNGs.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PublishArgs {
    /// Character description JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Read layers from this directory instead of `PINATA_ENDPOINT`.
    #[arg(long)]
    layers_dir: Option<PathBuf>,

    /// Publish to an in-process store instead of Pinata.
    #[arg(long)]
    dry_run: bool,

    /// How to treat assets already published under the same names.
    #[arg(long, value_enum, default_value_t = ReplaceChoice::Strict)]
    replace: ReplaceChoice,

    /// Publish only the profile thumbnail.
    #[arg(long)]
    thumbnail_only: bool,

    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = layerpin::THUMBNAIL_SIZE)]
    thumbnail_size: u32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Character description JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory holding `<layer name>.png` files.
    #[arg(long)]
    layers_dir: PathBuf,

    /// Output directory for `<userId>.png` and `<userId>Profile.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = layerpin::THUMBNAIL_SIZE)]
    thumbnail_size: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReplaceChoice {
    Strict,
    Soft,
    Skip,
}

impl From<ReplaceChoice> for ReplacePolicy {
    fn from(c: ReplaceChoice) -> Self {
        match c {
            ReplaceChoice::Strict => ReplacePolicy::Strict,
            ReplaceChoice::Soft => ReplacePolicy::Soft,
            ReplaceChoice::Skip => ReplacePolicy::Skip,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Publish(args) => cmd_publish(args),
        Command::Render(args) => cmd_render(args).map(|()| ExitCode::SUCCESS),
    }
}

fn cmd_publish(args: PublishArgs) -> anyhow::Result<ExitCode> {
    let config = Config::from_env()?;
    let client = config.http_client()?;

    let layers: Box<dyn LayerSource> = match &args.layers_dir {
        Some(dir) => Box::new(DirLayerSource::new(dir)),
        None => Box::new(config.layer_source(client.clone())),
    };
    let store: Box<dyn ArtifactStore> = if args.dry_run {
        Box::new(MemoryStore::new())
    } else {
        Box::new(config.pinata_store(client)?)
    };
    let workspaces = config.workspaces();

    let opts = PipelineOpts {
        thumbnail: ThumbnailSpec::with_size(args.thumbnail_size),
        replace: args.replace.into(),
        artifacts: if args.thumbnail_only {
            ArtifactSet::ThumbnailOnly
        } else {
            ArtifactSet::Both
        },
    };
    let pipeline = PublishPipeline::new(
        layers.as_ref(),
        store.as_ref(),
        &workspaces,
        config.gateway(),
        opts,
    );

    let result = CharacterDescription::from_path(&args.in_path).and_then(|desc| pipeline.run(&desc));
    match result {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let resp = err.to_response();
            println!("{}", serde_json::to_string_pretty(&resp)?);
            tracing::error!(status = resp.status, error = %err, "publish failed");
            Ok(if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let desc = CharacterDescription::from_path(&args.in_path)?;
    desc.validate()?;

    let layers = DirLayerSource::new(&args.layers_dir);
    let rendered = render_character(&layers, &desc, &ThumbnailSpec::with_size(args.thumbnail_size))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for (name, img) in [
        (desc.character_asset_name(), &rendered.character),
        (desc.thumbnail_asset_name(), &rendered.thumbnail),
    ] {
        let path = args.out_dir.join(pin_file_name(&name));
        std::fs::write(&path, encode_png(img)?)
            .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
