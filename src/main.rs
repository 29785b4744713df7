use anyhow::Result;
use tracing::{error, info};
use weatherpane_core::{AppError, Config};
use weatherpane_page::{Page, Renderer, RevealSchedule};
use weatherpane_weather::{resolve_location, WeatherProvider};

#[tokio::main]
async fn main() -> Result<()> {
    weatherpane_core::init()?;

    if let Err(e) = run().await {
        error!(error = %e, "weatherpane failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run() -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;

    let coordinates = resolve_location(&config.location).await?;
    info!(
        "Located at {}, {}",
        coordinates.latitude, coordinates.longitude
    );

    let provider = WeatherProvider::new(&config.weather)?;
    let report = provider.fetch_report(coordinates).await?;

    let page = Page::new(&config.output.container_class).shared();
    let renderer = Renderer::new(
        RevealSchedule::from(&config.reveal),
        config.weather.temperature_unit,
    );

    let mut reveal = renderer.render(&page, &report)?;
    while let Some(fragment) = reveal.next_event().await {
        println!("{}", fragment.html);
    }
    let revealed = reveal.wait().await?;
    info!("Revealed {} forecast days", revealed);

    if let Some(path) = &config.output.path {
        let html = page.lock().to_html();
        std::fs::write(path, html)?;
        info!("Wrote page to {}", path.display());
    }

    Ok(())
}
