use catalog_page::Crawl;
use clap::Parser;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!("Starting catalog crawl for URL: {}", args.url);

    println!("Note: Crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
    );

    let mut crawl = Crawl::new(&args.url)
        .with_max_items(args.max_items)
        .with_scroll_delay_ms(args.scroll_delay)
        .with_csv_path(args.csv.clone())
        .with_img_dir(args.img_dir.clone())
        .with_webdriver_url(&args.webdriver_url);

    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        crawl = crawl.with_credentials(username, password);
    }

    let start_time = std::time::Instant::now();
    match crawl.run().await {
        Ok(result) => {
            let duration = start_time.elapsed();
            ::log::info!(
                "Crawl complete - wrote {} rows in {:.2} seconds",
                result.item_count,
                duration.as_secs_f64()
            );
            println!("{} items written to {}", result.item_count, args.csv.display());
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}
