use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-page")]
#[command(about = "Extracts product name/price/image from an e-commerce page into CSV")]
#[command(version)]
pub struct Args {
    /// URL of the catalog page to crawl
    pub url: String,

    /// Username for the optional login step
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for the optional login step
    #[arg(short, long)]
    pub password: Option<String>,

    /// Maximum number of catalog rows to emit
    #[arg(short, long, default_value_t = 500)]
    pub max_items: usize,

    /// Wait between scroll steps, in milliseconds
    #[arg(long, default_value_t = 800)]
    pub scroll_delay: u64,

    /// Destination path for the CSV artifact
    #[arg(long, default_value = "produtos.csv")]
    pub csv: PathBuf,

    /// Directory for downloaded product images
    #[arg(long, default_value = "imagens")]
    pub img_dir: PathBuf,

    /// WebDriver endpoint to drive the headless browser
    #[arg(long, default_value = "http://localhost:4444")]
    pub webdriver_url: String,
}
