use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

/// How many pings a connection attempt sends before giving up, and how long it
/// waits in between. Long-term retrying belongs to the storage supervisor.
#[derive(Debug, Clone, Copy)]
pub struct PingSchedule {
    attempts: u32,
    first_delay: Duration,
    max_delay: Duration,
}

impl PingSchedule {
    /// Used once at boot, when the server may still be starting next to us.
    pub const STARTUP: Self = Self {
        attempts: 5,
        first_delay: Duration::from_millis(200),
        max_delay: Duration::from_secs(2),
    };

    /// Used by reconnects, which the supervisor already repeats.
    pub const RECONNECT: Self = Self {
        attempts: 1,
        first_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    fn backoff(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// Build a client and wait until the server answers a ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
    schedule: PingSchedule,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut delay = schedule.first_delay;
    for attempt in 1..=schedule.attempts {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok((client, database)),
            Err(source) if attempt == schedule.attempts => {
                return Err(MongoDaoError::PingExhausted {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(attempt, database = database_name, error = %err, "room store ping failed");
                sleep(delay).await;
                delay = schedule.backoff(delay);
            }
        }
    }

    Err(MongoDaoError::NoPingAttempts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_backoff_is_capped() {
        let schedule = PingSchedule::STARTUP;
        let mut delay = schedule.first_delay;
        for _ in 0..schedule.attempts {
            delay = schedule.backoff(delay);
        }
        assert_eq!(delay, Duration::from_secs(2));
    }

    #[test]
    fn reconnect_pings_once() {
        assert_eq!(PingSchedule::RECONNECT.attempts, 1);
    }
}
