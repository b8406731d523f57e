use std::future::Future;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};
use tokio::task::JoinHandle;

/// 00:00 UTC on the first day of the month following `now`.
pub fn next_month_start(now: OffsetDateTime) -> OffsetDateTime {
    let now = now.to_offset(time::UtcOffset::UTC);
    let (year, month) = match now.month() {
        Month::December => (now.year() + 1, Month::January),
        m => (now.year(), m.next()),
    };

    // Day 1 exists in every month.
    let date = Date::from_calendar_date(year, month, 1).unwrap_or(now.date());
    PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc()
}

/// Runs `job` at the start of every month, forever.
pub fn spawn_monthly<F, Fut>(name: &'static str, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = OffsetDateTime::now_utc();
            let next = next_month_start(now);
            let wait = (next - now).unsigned_abs();

            tracing::info!(job = name, next_run = %next, "Scheduled next run");
            tokio::time::sleep(wait).await;

            job().await;
        }
    })
}
