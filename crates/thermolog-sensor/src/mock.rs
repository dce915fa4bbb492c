//! Mock sensor implementation for testing.
//!
//! Lets tests script a sequence of outcomes (readings, absent results,
//! hard faults) and then fall through to a steady-state reading, so
//! poller behavior can be exercised without hardware.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use thermolog_types::Reading;

use crate::error::{Error, Result};
use crate::traits::Sensor;

/// One scripted outcome for the mock.
enum Scripted {
    Reading(Reading),
    Absent,
    Fault(String),
}

/// A scriptable sensor for tests.
///
/// Outcomes queued with the `then_*` builders are consumed in order;
/// once the queue is empty every read returns the steady-state value
/// (a fixed reading, or absent if none was set).
///
/// # Example
///
/// ```
/// use thermolog_sensor::{MockSensor, Sensor};
///
/// #[tokio::main]
/// async fn main() {
///     let sensor = MockSensor::new()
///         .then_absent()
///         .then_reading(21.0, 40.0);
///
///     assert!(sensor.read().await.unwrap().is_none());
///     assert!(sensor.read().await.unwrap().is_some());
///     assert_eq!(sensor.read_count(), 2);
/// }
/// ```
pub struct MockSensor {
    script: Mutex<VecDeque<Scripted>>,
    steady: Option<Reading>,
    read_count: AtomicU32,
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSensor {
    /// Create a mock with an empty script and no steady-state reading.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            steady: None,
            read_count: AtomicU32::new(0),
        }
    }

    /// Create a mock that always returns the given reading.
    #[must_use]
    pub fn steady(temperature: f64, humidity: f64) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            steady: Some(Reading::new(temperature, humidity)),
            read_count: AtomicU32::new(0),
        }
    }

    /// Queue a successful reading.
    #[must_use]
    pub fn then_reading(self, temperature: f64, humidity: f64) -> Self {
        self.push(Scripted::Reading(Reading::new(temperature, humidity)));
        self
    }

    /// Queue a transient absent result.
    #[must_use]
    pub fn then_absent(self) -> Self {
        self.push(Scripted::Absent);
        self
    }

    /// Queue a hard fault with the given message.
    #[must_use]
    pub fn then_fault(self, message: &str) -> Self {
        self.push(Scripted::Fault(message.to_string()));
        self
    }

    /// How many times `read` has been called.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }

    fn push(&self, outcome: Scripted) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(outcome);
    }
}

#[async_trait]
impl Sensor for MockSensor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read(&self) -> Result<Option<Reading>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();

        match scripted {
            Some(Scripted::Reading(r)) => Ok(Some(r)),
            Some(Scripted::Absent) => Ok(None),
            Some(Scripted::Fault(msg)) => Err(Error::Hardware(msg)),
            None => Ok(self.steady),
        }
    }
}
