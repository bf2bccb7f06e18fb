use clap::Parser;
use dicom_testkit::config::{BurnArgs, TomlConfig};
use dicom_testkit::core::batch::run_banner;
use dicom_testkit::domain::model::BatchReport;
use dicom_testkit::domain::ports::OutputStorage;
use dicom_testkit::utils::error::TestkitError;
use dicom_testkit::utils::monitor::RunMonitor;
use dicom_testkit::utils::{logger, validation::Validate};
use dicom_testkit::{BatchBurner, InPlaceStorage, LocalStorage, Result, TextBurner, TextRenderer};
use std::path::{Path, PathBuf};

fn main() {
    let args = BurnArgs::parse();

    let mut config = match TomlConfig::load(args.config_path()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    args.apply_to(&mut config);

    // 初始化日誌
    logger::init_cli_logger(args.verbose, config.log_format().unwrap_or_default());
    tracing::info!("Starting dicom-testkit");
    tracing::debug!("Burn config: {:?}", config.burn);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    println!(
        "{}",
        run_banner(Path::new(&config.burn.directory), &config.burn.text)
    );

    if config.monitoring.enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&config) {
        Ok(report) => {
            if let Some(report_path) = &args.report {
                if let Err(e) = write_report(&report, Path::new(report_path)) {
                    fail(&e);
                }
                println!("📄 Report written to {}", report_path);
            }
            tracing::info!(
                "Done: {} burned, {} skipped, {} failed in {:?}",
                report.burned.len(),
                report.skipped.len(),
                report.failed.len(),
                report.elapsed
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Burn run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e);
        }
    }
}

fn run(config: &TomlConfig) -> Result<BatchReport> {
    let directory = PathBuf::from(&config.burn.directory);
    let renderer = TextRenderer::load(config.burn.font_path.as_deref().map(Path::new));
    tracing::debug!("Bitmap font: {}", renderer.is_bitmap());

    let burner = TextBurner::new(renderer, config.burn_options());
    let monitor = RunMonitor::new(config.monitoring.enabled);

    match &config.burn.output_dir {
        Some(output_dir) => {
            tracing::info!("📁 Writing burned files to {}", output_dir);
            let storage = LocalStorage::new(&directory, output_dir);
            burn_directory(burner, storage, config, monitor, &directory)
        }
        None => burn_directory(burner, InPlaceStorage, config, monitor, &directory),
    }
}

fn burn_directory<S: OutputStorage>(
    burner: TextBurner,
    storage: S,
    config: &TomlConfig,
    monitor: RunMonitor,
    directory: &Path,
) -> Result<BatchReport> {
    BatchBurner::new(burner, storage)
        .with_recursive(config.burn.recursive)
        .with_monitor(monitor)
        .process_directory(directory)
}

fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn fail(e: &TestkitError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = e.severity().exit_code();
    std::process::exit(exit_code);
}
