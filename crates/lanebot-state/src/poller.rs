use lanebot_client::LiveStateClient;
use lanebot_controller::WindowProbe;
use lanebot_types::Result;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::Duration,
};
use tracing::debug;

use crate::tracker::MatchTracker;

/// Runs the tracker at a fixed cadence until shut down or a fatal error.
///
/// The returned handle resolves with the fatal error if one occurs; the
/// driver joins it on every exit path so no polling outlives a match.
/// Staleness of up to one interval is deliberate; decisions made on a
/// slightly old snapshot read as human reaction lag.
pub fn spawn_poll_loop<C, W>(
    mut tracker: MatchTracker<C, W>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<()>>
where
    C: LiveStateClient + 'static,
    W: WindowProbe + 'static,
{
    tokio::spawn(async move {
        loop {
            let previous_ratio = tracker.current().health_ratio;
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("poll loop shutting down");
                        return Ok(());
                    }
                }
                applied = tracker.update(interval) => {
                    if applied? {
                        let delta = previous_ratio - tracker.current().health_ratio;
                        tracker.set_health_delta(delta);
                    }
                }
            }
        }
    })
}
