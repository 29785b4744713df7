//! End-to-end rendering of a report into a page.

use std::time::Duration;

use weatherpane_core::TemperatureUnit;
use weatherpane_page::{Page, Renderer, RevealSchedule};
use weatherpane_weather::{Coordinates, CurrentObservation, ForecastDay, PressureTrend, WeatherReport};

fn report(highs: &[&str]) -> WeatherReport {
    WeatherReport {
        coordinates: Coordinates::new(51.5, -0.12),
        current: CurrentObservation {
            location_name: "London, United Kingdom".into(),
            observation_time: "Last Updated on October 18, 9:50 PM BST".into(),
            temperature: "12".into(),
            feels_like: "10".into(),
            condition: "Light Rain".into(),
            relative_humidity: "87%".into(),
            visibility_mi: "6.2".into(),
            uv: "0".into(),
            wind_mph: "11".into(),
            wind_dir: "SW".into(),
            wind_description: "From the SW at 11 MPH".into(),
            pressure_in: "29.65".into(),
            pressure_trend: PressureTrend("-".into()),
        },
        forecast: highs
            .iter()
            .enumerate()
            .map(|(i, high)| ForecastDay {
                day: 18 + i as u32,
                month_short: "Oct".into(),
                high: (*high).into(),
                low: "8".into(),
                condition: "Rain".into(),
                avg_humidity: "85".into(),
                avg_wind_mph: "9".into(),
                precip_in: "0.31".into(),
            })
            .collect(),
        fetched_at: chrono::Utc::now(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_document_after_reveal() {
    let page = Page::new("mainContainer").shared();
    let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Celsius);

    let handle = renderer
        .render(&page, &report(&["13", "14", "15"]))
        .unwrap();
    assert_eq!(handle.wait().await.unwrap(), 2);

    let html = page.lock().to_html();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>London, United Kingdom</h1>"));
    assert!(html.contains("<h3>Pressure: -29.65 in.</h3>"));
    assert!(html.contains("<h2>Hi: 14°C</h2>"));
    assert!(html.contains("<h2>Hi: 15°C</h2>"));
    assert!(!html.contains("Hi: 13°C"));

    let current = html.find("currentWeatherContainer").unwrap();
    let first_day = html.find("Oct 19").unwrap();
    let second_day = html.find("Oct 20").unwrap();
    assert!(current < first_day && first_day < second_day);
}

#[tokio::test(start_paused = true)]
async fn test_custom_schedule_is_used() {
    let page = Page::new("weather").shared();
    let schedule = RevealSchedule::new(Duration::from_millis(100), Duration::from_millis(10));
    let renderer = Renderer::new(schedule, TemperatureUnit::Fahrenheit);

    let mut handle = renderer.render(&page, &report(&["60", "61"])).unwrap();

    let current = handle.next_event().await.unwrap();
    assert_eq!(current.position, 0);
    assert!(current.html.starts_with("<div class=\"currentWeatherContainer\">"));

    let day = handle.next_event().await.unwrap();
    assert_eq!(day.position, 1);
    assert_eq!(day.delay, Duration::from_millis(110));
    assert!(day.html.contains("<h2>Hi: 61°F</h2>"));

    assert!(handle.next_event().await.is_none());
}
