use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Global minimum-interval gate for outbound Codeforces calls.
///
/// Codeforces allows roughly one API call every two seconds, so every fetch
/// funnels through a single gate regardless of which resource it requests.
/// A caller locks the gate, sleeps out whatever remains of the interval
/// since the previous call, stamps the clock, and only then issues its
/// request. Holding the lock across the sleep serializes waiting callers in
/// arrival order.
pub struct RateGate {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Suspend until at least `interval` has passed since the previous
    /// caller was released, then stamp the clock.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                time::sleep(self.interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
