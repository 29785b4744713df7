//! Staggered reveal: current conditions go in immediately, forecast days
//! follow on a timer, one after another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use weatherpane_core::{RenderError, RevealConfig, TemperatureUnit};
use weatherpane_weather::WeatherReport;

use crate::dom::{Element, Node};
use crate::page::SharedPage;
use crate::render::{forecast_fragments, render_current};

/// When each forecast day appears, relative to the render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSchedule {
    base: Duration,
    step: Duration,
}

impl RevealSchedule {
    pub fn new(base: Duration, step: Duration) -> Self {
        Self { base, step }
    }

    /// Delay for the forecast day at 1-based `position`
    pub fn delay_for(&self, position: usize) -> Duration {
        let position = u32::try_from(position).unwrap_or(u32::MAX);
        self.base.saturating_add(self.step.saturating_mul(position))
    }
}

impl Default for RevealSchedule {
    fn default() -> Self {
        Self::from(&RevealConfig::default())
    }
}

impl From<&RevealConfig> for RevealSchedule {
    fn from(config: &RevealConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.step_delay_ms),
        )
    }
}

/// A fragment that has just been appended to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    /// 0 for current conditions, then the forecast day's 1-based position
    pub position: usize,
    /// Scheduled offset from the render call
    pub delay: Duration,
    pub html: String,
}

/// Progress of a running reveal.
///
/// Dropping the handle leaves the reveal running.
#[derive(Debug)]
pub struct RevealHandle {
    events: mpsc::UnboundedReceiver<Reveal>,
    task: JoinHandle<usize>,
}

impl RevealHandle {
    /// Next fragment to appear, or `None` once every fragment is in
    pub async fn next_event(&mut self) -> Option<Reveal> {
        self.events.recv().await
    }

    /// Wait for the last forecast day; yields how many were appended
    pub async fn wait(self) -> Result<usize, RenderError> {
        self.task
            .await
            .map_err(|e| RenderError::RevealInterrupted(e.to_string()))
    }
}

/// Renders a weather report into a page.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    schedule: RevealSchedule,
    unit: TemperatureUnit,
}

impl Renderer {
    pub fn new(schedule: RevealSchedule, unit: TemperatureUnit) -> Self {
        Self { schedule, unit }
    }

    pub fn schedule(&self) -> RevealSchedule {
        self.schedule
    }

    /// Append current conditions now and schedule the forecast days.
    ///
    /// Must be called from within a tokio runtime. Fails without touching
    /// the page when it has no main container.
    pub fn render(
        &self,
        page: &SharedPage,
        report: &WeatherReport,
    ) -> Result<RevealHandle, RenderError> {
        let current = render_current(&report.current, self.unit);
        let fragments = forecast_fragments(&report.forecast, self.unit);
        let (tx, events) = mpsc::unbounded_channel();

        {
            let mut page = page.lock();
            let container = page.main_container_mut()?;
            let html = current.to_string();
            container.push(Node::Element(current));
            let _ = tx.send(Reveal {
                position: 0,
                delay: Duration::ZERO,
                html,
            });
        }
        info!(
            location = %report.current.location_name,
            forecast_days = fragments.len(),
            "Rendered current conditions"
        );

        let start = Instant::now();
        let schedule = self.schedule;
        let page = Arc::clone(page);
        let task = tokio::spawn(async move {
            let mut revealed = 0;
            for (index, fragment) in fragments.into_iter().enumerate() {
                let position = index + 1;
                let delay = schedule.delay_for(position);
                tokio::time::sleep_until(start + delay).await;

                let html = fragment.to_string();
                if let Err(e) = append_fragment(&page, fragment) {
                    warn!(error = %e, position, "Stopping reveal");
                    break;
                }
                debug!(position, ?delay, "Revealed forecast day");
                revealed += 1;
                let _ = tx.send(Reveal {
                    position,
                    delay,
                    html,
                });
            }
            revealed
        });

        Ok(RevealHandle { events, task })
    }
}

fn append_fragment(page: &SharedPage, fragment: Element) -> Result<(), RenderError> {
    let mut page = page.lock();
    page.main_container_mut()?.push(Node::Element(fragment));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::render::{CURRENT_CONTAINER_CLASS, FORECAST_CONTAINER_CLASS};
    use weatherpane_weather::{Coordinates, CurrentObservation, ForecastDay, PressureTrend};

    fn report(days: u32) -> WeatherReport {
        WeatherReport {
            coordinates: Coordinates::new(40.0, -73.0),
            current: CurrentObservation {
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
                pressure_trend: PressureTrend("0".into()),
            },
            forecast: (0..days)
                .map(|i| ForecastDay {
                    day: 18 + i,
                    month_short: "Oct".into(),
                    high: "68".into(),
                    low: "52".into(),
                    condition: "Clear".into(),
                    avg_humidity: "60".into(),
                    avg_wind_mph: "5".into(),
                    precip_in: "0.1".into(),
                })
                .collect(),
            fetched_at: chrono::Utc::now(),
        }
    }

    fn child_count(page: &SharedPage) -> usize {
        page.lock().main_container().map_or(0, |c| c.children().len())
    }

    #[test]
    fn test_default_schedule_delays() {
        let schedule = RevealSchedule::default();
        assert_eq!(schedule.delay_for(1), Duration::from_millis(860));
        assert_eq!(schedule.delay_for(2), Duration::from_millis(920));
        assert_eq!(schedule.delay_for(3), Duration::from_millis(980));
    }

    #[test]
    fn test_schedule_from_config() {
        let config = RevealConfig {
            base_delay_ms: 100,
            step_delay_ms: 10,
        };
        assert_eq!(
            RevealSchedule::from(&config).delay_for(2),
            Duration::from_millis(120)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_appended_before_any_delay() {
        let page = Page::new("mainContainer").shared();
        let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Fahrenheit);

        let _handle = renderer.render(&page, &report(4)).unwrap();

        let guard = page.lock();
        let container = guard.main_container().unwrap();
        assert_eq!(container.children().len(), 1);
        assert!(guard.find_by_class(CURRENT_CONTAINER_CLASS).is_some());
        assert!(guard.find_by_class(FORECAST_CONTAINER_CLASS).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forecast_days_appear_on_schedule() {
        let page = Page::new("mainContainer").shared();
        let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Fahrenheit);
        let _handle = renderer.render(&page, &report(4)).unwrap();

        tokio::time::sleep(Duration::from_millis(859)).await;
        assert_eq!(child_count(&page), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(child_count(&page), 2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(child_count(&page), 3);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(child_count(&page), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_arrive_in_order() {
        let page = Page::new("mainContainer").shared();
        let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Fahrenheit);
        let mut handle = renderer.render(&page, &report(4)).unwrap();

        let mut seen = Vec::new();
        while let Some(reveal) = handle.next_event().await {
            seen.push((reveal.position, reveal.delay.as_millis()));
        }

        assert_eq!(seen, [(0, 0), (1, 860), (2, 920), (3, 980)]);
        assert_eq!(handle.wait().await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_appends_nothing() {
        let page = Page::without_container("mainContainer").shared();
        let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Fahrenheit);

        let result = renderer.render(&page, &report(4));

        assert!(matches!(result, Err(RenderError::ContainerMissing(_))));
        assert!(page.lock().find_by_class(CURRENT_CONTAINER_CLASS).is_none());
    }

    #[tokio::test]
    async fn test_failed_reveal_task_is_interrupted() {
        let (_tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(std::future::pending::<usize>());
        task.abort();
        let handle = RevealHandle { events, task };

        assert!(matches!(
            handle.wait().await,
            Err(RenderError::RevealInterrupted(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_day_forecast_reveals_nothing_later() {
        let page = Page::new("mainContainer").shared();
        let renderer = Renderer::new(RevealSchedule::default(), TemperatureUnit::Fahrenheit);

        let handle = renderer.render(&page, &report(1)).unwrap();

        assert_eq!(handle.wait().await.unwrap(), 0);
        assert_eq!(child_count(&page), 1);
    }
}
