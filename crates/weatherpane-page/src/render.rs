//! Presentation fragments for current conditions and forecast days.

use weatherpane_core::TemperatureUnit;
use weatherpane_weather::{CurrentObservation, ForecastDay};

use crate::dom::{append, make, populate, set_attrs, text_element, Element, Pipeline};

pub const CURRENT_CONTAINER_CLASS: &str = "currentWeatherContainer";
pub const FORECAST_CONTAINER_CLASS: &str = "forecastContainer";
pub const DIVIDER_CLASS: &str = "vertical-divide";

const DEGREE: char = '\u{00b0}';

fn temperature(value: &str, unit: TemperatureUnit) -> String {
    format!("{value}{DEGREE}{}", unit.symbol())
}

fn with_class(class: &str, element: Element) -> Element {
    set_attrs(&[("class", class)], element)
}

/// `div.currentWeatherContainer` for the present conditions
pub fn render_current(obs: &CurrentObservation, unit: TemperatureUnit) -> Element {
    let wind_box = with_class(
        "windBox",
        populate(
            vec![
                text_element("h3", &format!("Wind: {} {}", obs.wind_mph, obs.wind_dir)),
                text_element("h4", &obs.wind_description),
            ],
            make("div"),
        ),
    );

    let pressure = format!(
        "Pressure: {}{} in.",
        obs.pressure_trend.sign(),
        obs.pressure_in
    );

    populate(
        vec![
            text_element("h1", &obs.location_name),
            text_element("h4", &obs.observation_time),
            text_element("h2", &temperature(&obs.temperature, unit)),
            text_element("h3", &obs.condition),
            text_element(
                "h3",
                &format!("feels like: {}", temperature(&obs.feels_like, unit)),
            ),
            text_element("h3", &format!("UV: {}", obs.uv)),
            wind_box,
            text_element("h3", &pressure),
        ],
        with_class(CURRENT_CONTAINER_CLASS, make("div")),
    )
}

/// Two-line box: a label heading followed by a value heading
fn labelled_box(tag: &str, class: &str, label: &str, value: String) -> Element {
    with_class(
        class,
        populate(
            vec![text_element("h3", label), text_element("h3", &value)],
            make(tag),
        ),
    )
}

/// Class the container, then add the decorative divider
pub fn forecast_container_setup() -> Pipeline<Element> {
    Pipeline::new()
        .then(|el| with_class(FORECAST_CONTAINER_CLASS, el))
        .then(|el| append(with_class(DIVIDER_CLASS, make("div")), el))
}

/// `div.forecastContainer` for one forecast day
pub fn render_forecast_day(day: &ForecastDay, unit: TemperatureUnit) -> Element {
    render_forecast_with(day, unit, &forecast_container_setup())
}

fn render_forecast_with(
    day: &ForecastDay,
    unit: TemperatureUnit,
    setup: &Pipeline<Element>,
) -> Element {
    let temp_box = with_class(
        "tempBox",
        populate(
            vec![
                text_element("h2", &format!("Hi: {}", temperature(&day.high, unit))),
                text_element("h2", &format!("Lo: {}", temperature(&day.low, unit))),
            ],
            make("div"),
        ),
    );

    populate(
        vec![
            text_element("h1", &day.date_label()),
            temp_box,
            labelled_box("div", "windBox", "Wind: ", format!("{} mph", day.avg_wind_mph)),
            labelled_box(
                "h3",
                "humidityBox",
                "Avg Humidity: ",
                format!("{}%", day.avg_humidity),
            ),
            labelled_box("div", "precipBox", "Precip: ", format!("{} in.", day.precip_in)),
        ],
        setup.run(make("div")),
    )
}

/// Fragments for every day after the first, in the order received.
///
/// The first day is today and is already covered by current conditions.
pub fn forecast_fragments(days: &[ForecastDay], unit: TemperatureUnit) -> Vec<Element> {
    let setup = forecast_container_setup();
    days.iter()
        .skip(1)
        .map(|day| render_forecast_with(day, unit, &setup))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherpane_weather::PressureTrend;

    fn observation(trend: &str) -> CurrentObservation {
        CurrentObservation {
            location_name: "New York, NY".into(),
            observation_time: "Last Updated on October 18, 4:53 PM EDT".into(),
            temperature: "66.3".into(),
            feels_like: "66".into(),
            condition: "Partly Cloudy".into(),
            relative_humidity: "65%".into(),
            visibility_mi: "10.0".into(),
            uv: "4".into(),
            wind_mph: "7.2".into(),
            wind_dir: "NW".into(),
            wind_description: "From the NW at 7.2 MPH".into(),
            pressure_in: "30.01".into(),
            pressure_trend: PressureTrend(trend.into()),
        }
    }

    fn day(n: u32) -> ForecastDay {
        ForecastDay {
            day: n,
            month_short: "Oct".into(),
            high: "68".into(),
            low: "52".into(),
            condition: "Clear".into(),
            avg_humidity: "60".into(),
            avg_wind_mph: "5".into(),
            precip_in: "0.12".into(),
        }
    }

    fn texts(el: &Element) -> Vec<String> {
        el.child_elements().map(|c| c.text_content()).collect()
    }

    #[test]
    fn test_current_fragment_layout() {
        let el = render_current(&observation("+"), TemperatureUnit::Fahrenheit);

        assert!(el.has_class(CURRENT_CONTAINER_CLASS));
        let tags: Vec<_> = el.child_elements().map(|c| c.tag()).collect();
        assert_eq!(tags, ["h1", "h4", "h2", "h3", "h3", "h3", "div", "h3"]);
        assert_eq!(
            texts(&el),
            [
                "New York, NY",
                "Last Updated on October 18, 4:53 PM EDT",
                "66.3°F",
                "Partly Cloudy",
                "feels like: 66°F",
                "UV: 4",
                "Wind: 7.2 NWFrom the NW at 7.2 MPH",
                "Pressure: +30.01 in.",
            ]
        );
        assert!(el.find_by_class("windBox").is_some());
    }

    #[test]
    fn test_steady_pressure_has_no_sign() {
        let el = render_current(&observation("0"), TemperatureUnit::Fahrenheit);
        assert_eq!(texts(&el).last().map(String::as_str), Some("Pressure: 30.01 in."));
    }

    #[test]
    fn test_falling_pressure_sign() {
        let el = render_current(&observation("-"), TemperatureUnit::Fahrenheit);
        assert_eq!(texts(&el).last().map(String::as_str), Some("Pressure: -30.01 in."));
    }

    #[test]
    fn test_celsius_symbol() {
        let el = render_current(&observation("0"), TemperatureUnit::Celsius);
        assert_eq!(texts(&el)[2], "66.3°C");
    }

    #[test]
    fn test_forecast_fragment_layout() {
        let el = render_forecast_day(&day(19), TemperatureUnit::Fahrenheit);

        assert!(el.has_class(FORECAST_CONTAINER_CLASS));
        let first = el.child_elements().next().unwrap();
        assert!(first.has_class(DIVIDER_CLASS));
        assert_eq!(
            texts(&el),
            [
                "",
                "Oct 19",
                "Hi: 68°FLo: 52°F",
                "Wind: 5 mph",
                "Avg Humidity: 60%",
                "Precip: 0.12 in.",
            ]
        );
        assert_eq!(el.find_by_class("humidityBox").map(|e| e.tag()), Some("h3"));
        assert_eq!(el.find_by_class("precipBox").map(|e| e.tag()), Some("div"));
        assert!(el.find_by_class("tempBox").is_some());
    }

    #[test]
    fn test_first_day_dropped_order_kept() {
        let days: Vec<_> = (18..22).map(day).collect();
        let fragments = forecast_fragments(&days, TemperatureUnit::Fahrenheit);

        assert_eq!(fragments.len(), 3);
        let labels: Vec<_> = fragments
            .iter()
            .map(|f| f.child_elements().nth(1).unwrap().text_content())
            .collect();
        assert_eq!(labels, ["Oct 19", "Oct 20", "Oct 21"]);
    }

    #[test]
    fn test_no_fragments_for_single_or_empty_forecast() {
        assert!(forecast_fragments(&[day(18)], TemperatureUnit::Fahrenheit).is_empty());
        assert!(forecast_fragments(&[], TemperatureUnit::Fahrenheit).is_empty());
    }
}
