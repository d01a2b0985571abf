use std::thread;
use std::time::Duration;

use log::{error, info};

use crate::watcher::{RunOutcome, Watcher};

/// Runs the watcher every `interval`, forever when `max_runs` is `None`.
/// A failed run is logged and the loop carries on.
pub fn run_loop(watcher: &Watcher, interval: Duration, max_runs: Option<usize>) -> usize {
    let mut runs = 0;
    loop {
        match watcher.run_once() {
            Ok(RunOutcome::Checked { new, failed_sends, .. }) if new > 0 => {
                info!("run finished: {new} new events, {failed_sends} failed sends")
            }
            Ok(outcome) => info!("run finished: {outcome:?}"),
            Err(err) => error!("run failed: {err:#}"),
        }
        runs += 1;

        if max_runs.map(|max| runs >= max).unwrap_or(false) {
            return runs;
        }
        info!("sleeping {}s", interval.as_secs());
        thread::sleep(interval);
    }
}
