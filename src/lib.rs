#![warn(clippy::pedantic, clippy::nursery, clippy::cargo, clippy::perf)]

//! # `dogstatsd_demo`
//!
//! A small demo of reporting metrics to a DogStatsD sidecar through the `metrics` facade.
//!
//! The binary reads `DEMO_*` environment variables, connects a buffered UDP client to the
//! sidecar, converts a handful of strings to integers and reports counters and gauges about it:
//!
//! | Metric            | Kind    | Tags                    |
//! |-------------------|---------|-------------------------|
//! | `value.count`     | gauge   |                         |
//! | `conversion.error`| counter |                         |
//! | `converted.count` | gauge   |                         |
//! | `task.happened`   | counter | `type:<category>`       |
//! | `task.complete`   | counter |                         |
//!
//! Every metric also carries the `account` and `environment` tags picked from
//! `DEMO_ENVIRONMENT`, and is prefixed with `DEMO_DD_NAMESPACE`.
//!
//! The recorder is never installed globally. Callers pass it to each function, which installs it
//! locally for the duration of the call:
//!
//! ```no_run
//! use dogstatsd_demo::{Config, DogStatsdRecorderBuilder, tasks};
//!
//! let config = Config::from_lookup(|key| std::env::var(key).ok())?;
//! let recorder = DogStatsdRecorderBuilder::from(&config).build()?;
//! tasks::run(&recorder, &tasks::DEFAULT_VALUES);
//! recorder.flush();
//! # Ok::<(), dogstatsd_demo::Error>(())
//! ```
//!
//! [`tasks::start_with`] does all of the above in one call and is what the binary runs.

pub mod config;
mod environment;
mod error;
mod events;
mod recorder;
pub mod tasks;

pub use config::Config;
pub use environment::Environment;
pub use error::Error;
pub use recorder::{DogStatsdRecorder, DogStatsdRecorderBuilder};
