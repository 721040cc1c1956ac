use ratewatch::application::system::{Application, SystemHandle};
use ratewatch::config::Config;
use ratewatch::domain::series::{SeriesDescriptor, SourceLocator};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const FRED_SAMPLE: &str = "\
Title line
DATE        VALUE
2024-01-05  6.62
2024-01-12  6.60
2024-01-19  .
";

/// Sample value for an unlabelled metric in Prometheus text format.
fn scraped_value(exposition: &str, metric: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.rsplit_once(' '))
        .find(|(name, _)| *name == metric)
        .and_then(|(_, value)| value.parse().ok())
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn start_exporter(file: &NamedTempFile) -> anyhow::Result<SystemHandle> {
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        refresh_interval: Duration::from_secs(3600),
        fetch_timeout: Duration::from_secs(5),
        series: vec![SeriesDescriptor::new(
            "mortgage30us",
            "30-Year Fixed Rate Mortgage Average in the United States",
            SourceLocator::Path(file.path().to_path_buf()),
        )],
        ..Config::default()
    };

    Application::build(config)?.start().await
}

#[tokio::test]
async fn test_scrape_reports_warm_gauge() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", FRED_SAMPLE)?;

    let handle = start_exporter(&file).await?;

    let response = client()
        .get(format!("http://{}/metrics", handle.local_addr))
        .send()
        .await?;
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await?;
    assert_eq!(scraped_value(&body, "mortgage30us"), Some(6.60));
    assert!(body.contains("# TYPE mortgage30us gauge"));

    handle.server.abort();
    handle.scheduler.abort();
    Ok(())
}

#[tokio::test]
async fn test_health_and_unknown_paths() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", FRED_SAMPLE)?;

    let handle = start_exporter(&file).await?;

    let health = client()
        .get(format!("http://{}/health", handle.local_addr))
        .send()
        .await?;
    assert_eq!(health.status().as_u16(), 200);
    assert_eq!(health.text().await?, "OK");

    let missing = client()
        .get(format!("http://{}/nope", handle.local_addr))
        .send()
        .await?;
    assert_eq!(missing.status().as_u16(), 404);

    handle.server.abort();
    handle.scheduler.abort();
    Ok(())
}

#[tokio::test]
async fn test_bind_failure_is_fatal() -> anyhow::Result<()> {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0")?;
    let taken = occupied.local_addr()?;

    let config = Config {
        listen_addr: taken,
        ..Config::default()
    };
    let result = Application::build(config)?.start().await;

    assert!(result.is_err());
    Ok(())
}
