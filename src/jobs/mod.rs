//! Background timer loops: scheduled report runs and the bounded retry
//! sweeps for email and report logs.

use crate::{config::AppConfig, handlers::AppServices, models::ReportType};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Spawns all background loops. Each loop waits one full period before
/// its first run and skips missed ticks, so a slow run never stacks a
/// backlog of overlapping executions.
pub fn start(services: AppServices, config: &AppConfig) {
    spawn_report_loop(
        services.clone(),
        ReportType::Daily,
        config.reports.daily_interval_secs,
    );
    spawn_report_loop(
        services.clone(),
        ReportType::Weekly,
        config.reports.weekly_interval_secs,
    );
    spawn_email_retry_loop(services.clone(), config.mail.retry_interval_secs);
    spawn_report_retry_loop(services, config.reports.retry_interval_secs);
    info!("background jobs started");
}

fn spawn_report_loop(services: AppServices, report_type: ReportType, period_secs: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(period_secs);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            // Generation failures are recorded in the report log and
            // retried by the sweep; only database errors land here.
            if let Err(e) = services.reports.generate_and_send(report_type).await {
                error!(error = %e, report_type = %report_type, "scheduled report run failed");
            }
        }
    });
}

fn spawn_email_retry_loop(services: AppServices, period_secs: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(period_secs);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = services.emails.retry_failed().await {
                error!(error = %e, "email retry sweep failed");
            }
        }
    });
}

fn spawn_report_retry_loop(services: AppServices, period_secs: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(period_secs);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = services.reports.retry_failed().await {
                error!(error = %e, "report retry sweep failed");
            }
        }
    });
}
