use clap::Parser;
use dicom_testkit::adapters::export::{write_scans_csv, write_scans_json};
use dicom_testkit::adapters::xnat::mask_session;
use dicom_testkit::config::{ScanArgs, TomlConfig};
use dicom_testkit::core::scan_finder::render_summary;
use dicom_testkit::utils::error::TestkitError;
use dicom_testkit::utils::logger::{self, LogFormat};
use dicom_testkit::utils::validation::Validate;
use dicom_testkit::{Result, ScanFinder, XnatClient};
use std::path::Path;

#[tokio::main]
async fn main() {
    let args = ScanArgs::parse();

    let mut config = match TomlConfig::load(args.config_path()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    args.apply_to(&mut config);

    logger::init_cli_logger(
        args.verbose,
        config.log_format().unwrap_or(LogFormat::Compact),
    );

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    println!("Finding a smaller scan for testing...\n");

    let client = match XnatClient::login(
        &config.archive.server,
        &config.credentials(),
        config.request_timeout(),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            println!("Login failed: {}", e);
            tracing::error!("❌ Login to {} failed: {}", config.archive.server, e);
            fail(&e);
        }
    };
    println!(
        "✓ Logged in (JSESSIONID: {}...)\n",
        mask_session(client.session_id())
    );

    let finder = ScanFinder::new(client, config.search_limits());
    let result = search(&finder, &config, &args).await;

    // 不論搜尋成功與否都要登出
    if let Err(e) = finder.api().logout().await {
        tracing::warn!("Logout failed: {}", e);
    }

    if let Err(e) = result {
        tracing::error!(
            "❌ Scan search failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        fail(&e);
    }
}

async fn search(finder: &ScanFinder<XnatClient>, config: &TomlConfig, args: &ScanArgs) -> Result<()> {
    let scans = finder.find().await?;

    print!(
        "{}",
        render_summary(&scans, &config.viewer.base_url, config.archive.top)
    );

    if let Some(csv_path) = &args.csv {
        write_scans_csv(&scans, &config.viewer.base_url, Path::new(csv_path))?;
        println!("📄 CSV written to {}", csv_path);
    }
    if let Some(json_path) = &args.json {
        write_scans_json(&scans, Path::new(json_path))?;
        println!("📄 JSON written to {}", json_path);
    }

    Ok(())
}

fn fail(e: &TestkitError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}
