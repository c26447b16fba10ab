use clap::Parser;
use statscraper::core::Pipeline;
use statscraper::utils::error::ErrorSeverity;
use statscraper::utils::{logger, validation::Validate};
use statscraper::{
    BoeRequest, BoeSource, CliConfig, EtlEngine, HttpFetcher, ImfRequest, ImfSource, LocalStorage,
    OnsRequest, OnsSource, Result, ScrapeError, ScraperConfig, SourceCommand, SourceIo,
    TableReader,
};

type CliIo = SourceIo<HttpFetcher, TableReader, LocalStorage>;

fn source_io(config: &ScraperConfig) -> Result<CliIo> {
    let fetcher = HttpFetcher::try_from(&config.http)?;
    let decoder = TableReader::new(config.imf.na_values.clone());
    let storage = LocalStorage::new(config.load.output_path.clone());
    Ok(SourceIo::new(
        fetcher,
        decoder,
        storage,
        config.load.output_path.clone(),
        config.load.format,
    ))
}

async fn run_pipeline<P: Pipeline>(pipeline: P) -> Result<Option<String>> {
    EtlEngine::new(pipeline).run().await
}

async fn run(cli: &CliConfig, config: &ScraperConfig) -> Result<Option<String>> {
    let io = source_io(config)?;

    match &cli.command {
        SourceCommand::Ons {
            dataset,
            series,
            freq,
        } => {
            let request = OnsRequest::new(dataset, series, freq)?;
            let source = OnsSource::new(io, config.ons.base_url.clone(), request);
            if cli.print_url {
                println!("{}", source.url()?);
            }
            run_pipeline(source).await
        }
        SourceCommand::Boe {
            series,
            date_from,
            vpd,
            ..
        } => {
            let request = BoeRequest::new(series, *date_from, config.boe.years_back, *vpd)?;
            let source = BoeSource::new(io, config.boe.base_url.clone(), request);
            if cli.print_url {
                println!("{}", source.url()?);
            }
            run_pipeline(source).await
        }
        SourceCommand::Imf {
            dataset,
            series,
            countries,
        } => {
            let series = (!series.is_empty()).then(|| series.clone());
            let countries = (!countries.is_empty()).then(|| countries.clone());
            let request = ImfRequest::new(dataset, series, countries)?;
            let source = ImfSource::new(
                io,
                config.imf.clone(),
                config.panel.duplicate_policy,
                request,
            );
            if cli.print_url {
                println!("{}", source.url());
            }
            run_pipeline(source).await
        }
    }
}

fn exit_with(e: &ScrapeError) -> ! {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting statscraper CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    match run(&cli, &config).await {
        Ok(Some(output_path)) => {
            tracing::info!("✅ Scrape completed successfully!");
            println!("✅ Scrape completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Ok(None) => {
            println!("That frequency is unavailable for your series.");
        }
        Err(e) => exit_with(&e),
    }
}
