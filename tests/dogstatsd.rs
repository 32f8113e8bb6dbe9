//! End-to-end tests against a loopback UDP socket standing in for the sidecar.

use dogstatsd_demo::{Config, DogStatsdRecorderBuilder, Error, tasks};
use std::{collections::HashMap, net::UdpSocket, time::Duration};

fn sidecar(timeout: Duration) -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind sidecar socket");
    socket
        .set_read_timeout(Some(timeout))
        .expect("Failed to set read timeout");
    socket
}

fn env_for(sidecar: &UdpSocket, extra: &[(&str, &str)]) -> HashMap<String, String> {
    let port = sidecar.local_addr().unwrap().port().to_string();
    let mut vars: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    vars.insert("DEMO_SIDECAR_PORT".into(), port);
    vars
}

fn receive_lines(socket: &UdpSocket, count: usize) -> Vec<String> {
    let mut buf = [0u8; 2048];
    let mut lines = Vec::new();
    while lines.len() < count {
        let n = socket.recv(&mut buf).expect("Expected another datagram");
        lines.extend(
            String::from_utf8_lossy(&buf[..n])
                .split('\n')
                .map(ToString::to_string),
        );
    }
    lines
}

#[test]
fn full_run_reports_every_metric_in_order() {
    let server = sidecar(Duration::from_secs(2));
    let vars = env_for(
        &server,
        &[("DEMO_DD_NAMESPACE", "demo."), ("DEMO_ENVIRONMENT", "prod")],
    );
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let recorder = DogStatsdRecorderBuilder::from(&config).build().unwrap();

    let converted = tasks::run(&recorder, &tasks::DEFAULT_VALUES);
    recorder.flush();

    assert_eq!(converted, [1, 2, 4, 5]);
    let tags = "account:mmcken3-demos,environment:prod";
    assert_eq!(
        receive_lines(&server, 6),
        [
            format!("demo.value.count:5|g|#{tags}"),
            format!("demo.conversion.error:1|c|#{tags}"),
            format!("demo.converted.count:4|g|#{tags}"),
            format!("demo.task.happened:1|c|#{tags},type:somethingNormal"),
            format!("demo.task.happened:1|c|#{tags},type:somethingspecial"),
            format!("demo.task.complete:1|c|#{tags}"),
        ]
    );
}

#[test]
fn generic_environment_tags_use_the_label() {
    let server = sidecar(Duration::from_secs(2));
    let vars = env_for(&server, &[("DEMO_ENVIRONMENT", "staging")]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let recorder = DogStatsdRecorderBuilder::from(&config).build().unwrap();

    tasks::something_special(&recorder);

    assert_eq!(
        receive_lines(&server, 1),
        ["task.happened:1|c|#account:staging,environment:staging,type:somethingspecial"]
    );
}

#[test]
fn buffered_client_batches_until_flushed() {
    let server = sidecar(Duration::from_secs(2));
    let recorder = DogStatsdRecorderBuilder::default()
        .address(&server.local_addr().unwrap().to_string())
        .max_messages(64)
        .build()
        .unwrap();

    tasks::convert_values(&recorder, &["7", "x"]);
    recorder.flush();

    let mut buf = [0u8; 2048];
    let n = server.recv(&mut buf).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&buf[..n]),
        "value.count:2|g\nconversion.error:1|c\nconverted.count:1|g"
    );
}

#[test]
fn start_with_reports_to_the_configured_sidecar() {
    let server = sidecar(Duration::from_secs(2));
    let vars = env_for(&server, &[("DEMO_ENVIRONMENT", "test")]);

    let converted = tasks::start_with(|key| vars.get(key).cloned()).unwrap();

    assert_eq!(converted, [1, 2, 4, 5]);
    let lines = receive_lines(&server, 6);
    assert_eq!(
        lines[0],
        "value.count:5|g|#account:mmcken3-demos-dev,environment:test"
    );
    assert_eq!(
        lines[5],
        "task.complete:1|c|#account:mmcken3-demos-dev,environment:test"
    );
}

#[test]
fn malformed_port_emits_nothing() {
    let server = sidecar(Duration::from_millis(200));
    let endpoint = server.local_addr().unwrap().ip().to_string();

    let result = tasks::start_with(|key| match key {
        "DEMO_SIDECAR_ENDPOINT" => Some(endpoint.clone()),
        "DEMO_SIDECAR_PORT" => Some("not-a-port".to_string()),
        _ => None,
    });

    assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    let mut buf = [0u8; 64];
    assert!(server.recv(&mut buf).is_err(), "no metric may be sent");
}

#[test]
fn newline_in_environment_stays_one_emission() {
    let server = sidecar(Duration::from_secs(2));
    let config = Config {
        port: server.local_addr().unwrap().port(),
        environment: "staging\nforged.metric:999|c".into(),
        ..Config::default()
    };
    let recorder = DogStatsdRecorderBuilder::from(&config).build().unwrap();

    tasks::something_special(&recorder);

    let mut buf = [0u8; 2048];
    let n = server.recv(&mut buf).unwrap();
    let payload = String::from_utf8_lossy(&buf[..n]).into_owned();
    assert_eq!(payload.lines().count(), 1, "{payload}");
    assert_eq!(
        payload,
        "task.happened:1|c|#account:stagingforged.metric:999|c,\
         environment:stagingforged.metric:999|c,type:somethingspecial"
    );
}

#[test]
fn unreachable_sidecar_does_not_fail_emission() {
    // bind then drop to get a port nobody listens on
    let port = sidecar(Duration::from_millis(10))
        .local_addr()
        .unwrap()
        .port();
    let recorder = DogStatsdRecorderBuilder::default()
        .address(&format!("127.0.0.1:{port}"))
        .build()
        .unwrap();

    let converted = tasks::run(&recorder, &tasks::DEFAULT_VALUES);
    recorder.flush();
    assert_eq!(converted, [1, 2, 4, 5]);
}
