//! The demo workload: convert a fixed list of strings to integers and report what happened.
//!
//! Every function takes the recorder explicitly and installs it only for the duration of the
//! call, so nothing here depends on a global recorder.

use crate::{config::Config, error::Error, recorder::DogStatsdRecorderBuilder};
use metrics::{Recorder, counter, gauge};

/// The values converted by the binary. One of them is deliberately not a number.
pub const DEFAULT_VALUES: [&str; 5] = ["1", "2", "3ag", "4", "5"];

#[allow(clippy::cast_precision_loss)]
fn as_gauge(len: usize) -> f64 {
    len as f64
}

/// Parses each value as a base-10 integer, skipping the ones that fail.
///
/// Emits `value.count` before converting, one `conversion.error` per failed value and
/// `converted.count` at the end. A failed value is logged and never stops the loop.
pub fn convert_values<S: AsRef<str>>(recorder: &dyn Recorder, values: &[S]) -> Vec<i64> {
    metrics::with_local_recorder(recorder, || {
        gauge!("value.count").set(as_gauge(values.len()));

        let mut converted = Vec::with_capacity(values.len());
        for value in values.iter().map(AsRef::as_ref) {
            match value.parse::<i64>() {
                Ok(v) => converted.push(v),
                Err(e) => {
                    log::warn!("error converting value: {value}: {e}");
                    counter!("conversion.error").increment(1);
                }
            }
        }

        gauge!("converted.count").set(as_gauge(converted.len()));
        converted
    })
}

fn task_happened(recorder: &dyn Recorder, kind: &'static str) {
    metrics::with_local_recorder(recorder, || {
        counter!("task.happened", "type" => kind).increment(1);
    });
}

pub fn something_normal(recorder: &dyn Recorder) {
    log::info!("Doing something normal");
    task_happened(recorder, "somethingNormal");
}

pub fn something_special(recorder: &dyn Recorder) {
    log::info!("Doing something special");
    task_happened(recorder, "somethingspecial");
}

/// Runs the whole workload once and returns the converted values.
///
/// `task.complete` is emitted last, after both labeled tasks.
pub fn run<S: AsRef<str>>(recorder: &dyn Recorder, values: &[S]) -> Vec<i64> {
    let converted = convert_values(recorder, values);

    something_normal(recorder);
    something_special(recorder);

    metrics::with_local_recorder(recorder, || counter!("task.complete").increment(1));
    converted
}

/// Loads the configuration through `lookup`, connects to the sidecar, runs the workload over
/// [`DEFAULT_VALUES`] and flushes the client.
///
/// Nothing is emitted unless both the configuration and the client are valid.
///
/// # Errors
/// Returns an error if the configuration is malformed or the client cannot be set up.
pub fn start_with<F>(lookup: F) -> Result<Vec<i64>, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    log::debug!("loaded config: {config:?}");

    let recorder = DogStatsdRecorderBuilder::from(&config).build()?;
    log::info!("sending metrics to dogstatsd at {}", config.address());

    let converted = run(&recorder, &DEFAULT_VALUES);
    recorder.flush();
    Ok(converted)
}
