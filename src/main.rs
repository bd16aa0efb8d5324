use clap::{Parser, Subcommand};
use simple_places::{config, generate, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simple-places")]
#[command(about = "Static site generator for points-of-interest directories")]
#[command(long_about = "\
Static site generator for points-of-interest directories

A CSV of places becomes a home page, one page per city and one page per
place, plus robots.txt and sitemap.xml. Every run is a full rebuild.

Project structure:

  my-site/
  ├── config.toml          # site_name, base_url, labels, optional remote CSV
  ├── templates/
  │   ├── base.html        # page frame: {{PAGE_TITLE}} {{CONTENT}} {{BASE_PATH}} ...
  │   ├── index.html       # home: {{CITY_CARDS}}
  │   ├── city.html        # city index: {{CITY}} {{CARDS}}
  │   └── page.html        # detail: {{NAME}} {{ADDRESS}} {{HOURS}} ...
  ├── assets/style.css     # copied to <output>/assets/
  └── data/points.csv      # name,city,address,hours,features,photo_url,website_url,lat,lon

Run 'simple-places gen-config' to print a documented config.toml.
Set RUST_LOG=debug for detailed logs.")]
#[command(version)]
struct Cli {
    /// Project root (config.toml, templates/, assets/, data/)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory (overrides build.output_dir; relative to the current directory)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the full site (default)
    Build,
    /// Validate config, templates, assets and dataset without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let site_config = config::load_config(&cli.root)?;
            let output_dir = cli
                .output
                .unwrap_or_else(|| cli.root.join(&site_config.build.output_dir));

            println!("==> Building {} → {}", site_config.site_name, output_dir.display());
            let report = generate::generate(
                &site_config,
                &cli.root,
                &output_dir,
                &generate::BuildContext::now(),
            )?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let site = generate::plan(&site_config, &cli.root)?;
            output::print_check_output(&site);
            println!("==> Project is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
