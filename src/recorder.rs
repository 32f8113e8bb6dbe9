use crate::{
    config::Config,
    environment::Environment,
    error::Error,
    events::{MetricData, MetricOperation},
};
use std::{
    io,
    net::{ToSocketAddrs, UdpSocket},
    sync::{Arc, Mutex, PoisonError},
};

/// Largest payload sent in one datagram, sized to fit a typical 1500 byte MTU.
pub(crate) const MAX_DATAGRAM_SIZE: usize = 1432;
const SAMPLE_RATE: f64 = 1.0;

#[derive(Debug, Default)]
struct Buffer {
    payload: String,
    messages: usize,
}

#[derive(Debug)]
struct Sink {
    socket: UdpSocket,
    namespace: String,
    constant_tags: Vec<String>,
    max_messages: usize,
    buffer: Mutex<Buffer>,
}

impl Sink {
    fn write_event(&self, metric: &MetricData) {
        let line = metric.encode(&self.namespace, &self.constant_tags);
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);

        if buffer.messages > 0 && buffer.payload.len() + 1 + line.len() > MAX_DATAGRAM_SIZE {
            self.send(&mut buffer);
        }
        if buffer.messages > 0 {
            buffer.payload.push('\n');
        }
        buffer.payload.push_str(&line);
        buffer.messages += 1;

        if buffer.messages >= self.max_messages {
            self.send(&mut buffer);
        }
    }

    fn send(&self, buffer: &mut Buffer) {
        if buffer.messages == 0 {
            return;
        }
        // delivery is best effort, a lost datagram is not an error for the caller
        if let Err(e) = self.socket.send(buffer.payload.as_bytes()) {
            log::debug!("dropped {} dogstatsd message(s): {e}", buffer.messages);
        }
        buffer.payload.clear();
        buffer.messages = 0;
    }

    fn flush(&self) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        self.send(&mut buffer);
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        self.flush();
    }
}

#[derive(Debug)]
struct Handle {
    key: metrics::Key,
    sink: Arc<Sink>,
}

impl Handle {
    const fn new(key: metrics::Key, sink: Arc<Sink>) -> Self {
        Self { key, sink }
    }

    fn push_metric(&self, op: MetricOperation) {
        let metric = MetricData {
            name: self.key.name().to_string(),
            tags: self
                .key
                .labels()
                .map(|label| format!("{}:{}", label.key(), label.value()))
                .collect(),
            operation: op,
            sample_rate: SAMPLE_RATE,
        };
        self.sink.write_event(&metric);
    }
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        self.push_metric(MetricOperation::IncrementCounter(value));
    }

    fn absolute(&self, value: u64) {
        self.push_metric(MetricOperation::SetCounter(value));
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        self.push_metric(MetricOperation::IncrementGauge(value));
    }

    fn decrement(&self, value: f64) {
        self.push_metric(MetricOperation::DecrementGauge(value));
    }

    fn set(&self, value: f64) {
        self.push_metric(MetricOperation::SetGauge(value));
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        self.push_metric(MetricOperation::RecordHistogram(value));
    }
}

/// A buffered DogStatsD client exposed as a [`metrics::Recorder`].
///
/// Every emission is prefixed with the configured namespace and carries the constant tags.
/// Sends are fire-and-forget: failures are logged and dropped.
#[derive(Debug, Clone)]
pub struct DogStatsdRecorder {
    sink: Arc<Sink>,
}

impl DogStatsdRecorder {
    /// Sends any buffered lines to the sidecar now.
    pub fn flush(&self) {
        self.sink.flush();
    }

    fn describe(&self, kind: &str, key_name: &metrics::KeyName, description: &str) {
        log::trace!(
            "ignoring {kind} description for {}{}: {description}",
            self.sink.namespace,
            key_name.as_str()
        );
    }
}

impl metrics::Recorder for DogStatsdRecorder {
    fn describe_counter(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        description: metrics::SharedString,
    ) {
        self.describe("counter", &key_name, &description);
    }

    fn describe_gauge(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        description: metrics::SharedString,
    ) {
        self.describe("gauge", &key_name, &description);
    }

    fn describe_histogram(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        description: metrics::SharedString,
    ) {
        self.describe("histogram", &key_name, &description);
    }

    fn register_counter(
        &self,
        key: &metrics::Key,
        _meta: &metrics::Metadata<'_>,
    ) -> metrics::Counter {
        metrics::Counter::from_arc(Arc::new(Handle::new(key.clone(), self.sink.clone())))
    }

    fn register_gauge(&self, key: &metrics::Key, _meta: &metrics::Metadata<'_>) -> metrics::Gauge {
        metrics::Gauge::from_arc(Arc::new(Handle::new(key.clone(), self.sink.clone())))
    }

    fn register_histogram(
        &self,
        key: &metrics::Key,
        _meta: &metrics::Metadata<'_>,
    ) -> metrics::Histogram {
        metrics::Histogram::from_arc(Arc::new(Handle::new(key.clone(), self.sink.clone())))
    }
}

#[derive(Debug)]
pub struct DogStatsdRecorderBuilder {
    address: String,
    namespace: String,
    tags: Vec<metrics::Label>,
    max_messages: usize,
}

impl Default for DogStatsdRecorderBuilder {
    fn default() -> Self {
        Self {
            address: Config::default().address(),
            namespace: String::new(),
            tags: Vec::new(),
            max_messages: 1,
        }
    }
}

impl From<&Config> for DogStatsdRecorderBuilder {
    fn from(config: &Config) -> Self {
        Self::default()
            .address(&config.address())
            .namespace(&config.namespace)
            .tags(Environment::from(config.environment.as_str()).tags())
    }
}

impl DogStatsdRecorderBuilder {
    /// Sets the `host:port` of the sidecar.
    #[must_use]
    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    /// Sets the prefix written in front of every metric name.
    #[must_use]
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Adds tags attached to every metric.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = metrics::Label>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Sets how many lines are buffered into one datagram before it is sent. Zero is treated as one.
    #[must_use]
    pub fn max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.max(1);
        self
    }

    /// Binds a local UDP socket and connects it to the sidecar address.
    ///
    /// # Example
    /// ```
    /// use dogstatsd_demo::DogStatsdRecorderBuilder;
    /// let builder = DogStatsdRecorderBuilder::default().namespace("demo.");
    /// if let Err(e) = builder.build() {
    ///     eprintln!("Failed to set up dogstatsd client: {}", e);
    /// }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the address does not resolve or the socket cannot be bound or connected.
    pub fn build(self) -> Result<DogStatsdRecorder, Error> {
        let addr = self.address.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address found for {}", self.address),
            )
        })?;
        let local = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(addr)?;

        let sink = Sink {
            socket,
            namespace: self.namespace,
            constant_tags: self
                .tags
                .iter()
                .map(|label| format!("{}:{}", label.key(), label.value()))
                .collect(),
            max_messages: self.max_messages,
            buffer: Mutex::new(Buffer::default()),
        };
        Ok(DogStatsdRecorder {
            sink: Arc::new(sink),
        })
    }
}
