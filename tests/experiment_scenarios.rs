#[cfg(test)]
mod experiment_scenarios {
    use std::path::Path;

    use fanetsim::config::{Config, ConfigError};
    use fanetsim::orchestrator::{output_path_for, run_experiment, run_protocol_sweep, Experiment};
    use fanetsim::output::FlowSummary;
    use fanetsim::routing::ProtocolChoice;

    /// 10 nodes, one 1000-byte datagram per second per sender.
    fn scenario(dir: &Path, sinks: usize, total: &str, interval: &str) -> Config {
        let mut config = Config::default();
        config.general.output_file = dir.join("routing.csv").to_string_lossy().into_owned();
        config.experiment.nodes = 10;
        config.experiment.sinks = sinks;
        config.experiment.total_time = total.to_string();
        config.experiment.sample_interval = interval.to_string();
        config.traffic.packet_size = 1000;
        config.traffic.data_rate = 8000;
        config
    }

    fn read_rows(path: &Path) -> (String, Vec<Vec<String>>) {
        let text = std::fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap().to_string();
        let rows = lines
            .map(|l| l.split(',').map(str::to_string).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_two_sinks_five_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario(dir.path(), 2, "5s", "1s");

        let report = run_experiment(&config).unwrap();
        assert_eq!(report.rows, 5);

        let (header, rows) = read_rows(&report.csv_path);
        assert_eq!(
            header,
            "SimulationSecond,ReceiveRate,PacketsReceived,NumberOfSinks,RoutingProtocol,TransmissionPower"
        );
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row[0].parse::<f64>().unwrap(), i as f64);
            assert_eq!(row[1], "16.0");
            assert_eq!(row[2], "2");
            assert_eq!(row[3], "2");
            assert_eq!(row[4], "AODV");
            assert_eq!(row[5], "27.0");
        }
    }

    #[test]
    fn test_single_sink_rate() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario(dir.path(), 1, "5s", "1s");

        let report = run_experiment(&config).unwrap();
        let (_, rows) = read_rows(&report.csv_path);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r[1] == "8.0" && r[2] == "1" && r[3] == "1"));
    }

    #[test]
    fn test_rows_account_for_every_received_packet() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario(dir.path(), 3, "10s", "1s");

        let report = run_experiment(&config).unwrap();
        let (_, rows) = read_rows(&report.csv_path);

        let packets: u64 = rows.iter().map(|r| r[2].parse::<u64>().unwrap()).sum();
        assert_eq!(packets, report.packets_received);
        assert_eq!(report.packets_received, report.packets_sent);

        // kbps equals bytes in the interval * 8 / 1000
        for row in &rows {
            let kbps: f64 = row[1].parse().unwrap();
            let count: u64 = row[2].parse().unwrap();
            assert_eq!(kbps, (count * 1000 * 8) as f64 / 1000.0);
        }
    }

    #[test]
    fn test_row_count_is_floor_of_total_over_interval() {
        let dir = tempfile::tempdir().unwrap();
        for (total, interval, expected) in [("5.5s", "1s", 5), ("3s", "500ms", 6), ("2.9", "1", 2)] {
            let config = scenario(dir.path(), 2, total, interval);
            let report = run_experiment(&config).unwrap();
            assert_eq!(report.rows, expected, "{} / {}", total, interval);
            let (_, rows) = read_rows(&report.csv_path);
            assert_eq!(rows.len() as u64, expected);
        }
    }

    #[test]
    fn test_half_second_interval_doubles_rate() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario(dir.path(), 1, "2s", "500ms");

        let report = run_experiment(&config).unwrap();
        let (_, rows) = read_rows(&report.csv_path);
        let rates: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
        // One packet per second lands in every other half-second window.
        assert_eq!(rates, vec!["16.0", "0.0", "16.0", "0.0"]);
    }

    #[test]
    fn test_unknown_protocol_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario(dir.path(), 2, "5s", "1s");
        config.experiment.protocol = 5;

        let err = run_experiment(&config).unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::UnknownProtocol(5)));
        assert!(!Path::new(&config.general.output_file).exists());
    }

    #[test]
    fn test_pairing_error_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario(dir.path(), 6, "5s", "1s");
        config.experiment.nodes = 10;

        let err = Experiment::new(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Pairing { sinks: 6, senders: 4 })
        ));
        assert!(!Path::new(&config.general.output_file).exists());
    }

    #[test]
    fn test_every_protocol_runs() {
        let dir = tempfile::tempdir().unwrap();
        for protocol in ProtocolChoice::ALL {
            let mut config = scenario(dir.path(), 2, "3s", "1s");
            config.experiment.protocol = protocol.code();

            let report = run_experiment(&config).unwrap();
            assert_eq!(report.protocol, protocol);
            let (_, rows) = read_rows(&report.csv_path);
            assert!(rows.iter().all(|r| r[4] == protocol.name()));
        }
    }

    #[test]
    fn test_rerun_truncates_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let long = scenario(dir.path(), 2, "8s", "1s");
        let short = scenario(dir.path(), 2, "2s", "1s");

        run_experiment(&long).unwrap();
        let report = run_experiment(&short).unwrap();
        let (_, rows) = read_rows(&report.csv_path);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_flow_summary_and_mobility_trace() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario(dir.path(), 2, "4s", "1s");
        config.general.trace_mobility = true;

        let report = run_experiment(&config).unwrap();

        let summary_path = report.flow_summary_path.clone().unwrap();
        assert_eq!(summary_path, dir.path().join("routing.flowmon.json"));
        let summary: FlowSummary = serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(summary.flows.len(), 2);
        assert_eq!(summary.rx_packets(), report.packets_received);
        assert!(summary.flows.iter().all(|f| f.tx_packets == 4 && f.delivery_ratio == 1.0));

        let trace_path = report.mobility_trace_path.clone().unwrap();
        assert_eq!(trace_path, dir.path().join("routing.mob"));
        let trace = std::fs::read_to_string(trace_path).unwrap();
        assert_eq!(trace.lines().count(), 10);
        assert!(trace.lines().all(|l| l.starts_with("now=+0.0ns node=")));
    }

    #[test]
    fn test_flow_summary_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario(dir.path(), 2, "2s", "1s");
        config.general.flow_summary = false;

        let report = run_experiment(&config).unwrap();
        assert_eq!(report.flow_summary_path, None);
        assert_eq!(report.mobility_trace_path, None);
        assert!(!dir.path().join("routing.flowmon.json").exists());
    }

    #[test]
    fn test_protocol_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let config = scenario(dir.path(), 2, "3s", "1s");

        let reports = run_protocol_sweep(&config).unwrap();
        assert_eq!(reports.len(), 4);

        let base = Path::new(&config.general.output_file);
        for (report, protocol) in reports.iter().zip(ProtocolChoice::ALL) {
            assert_eq!(report.protocol, protocol);
            assert_eq!(report.csv_path, output_path_for(base, protocol));
            assert_eq!(report.rows, 3);
            let (_, rows) = read_rows(&report.csv_path);
            assert!(rows.iter().all(|r| r[4] == protocol.name()));
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = scenario(dir.path(), 2, "3s", "1s");
        config.general.trace_mobility = true;
        config.traffic.start_jitter = Some("500ms".to_string());

        let first = run_experiment(&config).unwrap();
        let first_csv = std::fs::read_to_string(&first.csv_path).unwrap();
        let first_trace = std::fs::read_to_string(first.mobility_trace_path.as_ref().unwrap()).unwrap();

        let second = run_experiment(&config).unwrap();
        assert_eq!(std::fs::read_to_string(&second.csv_path).unwrap(), first_csv);
        assert_eq!(
            std::fs::read_to_string(second.mobility_trace_path.as_ref().unwrap()).unwrap(),
            first_trace
        );
    }
}
