//! Experiment orchestrator.
//!
//! Wires the configured pieces together (nodes, addresses, routing, traffic,
//! sampling and output), drives the event loop up to the horizon and tears
//! everything down exactly once.

use crate::config::{sibling_path, Config};
use crate::ip::AddressAllocator;
use crate::measurement::{Counters, SampleRecorder};
use crate::output::{write_flow_summary, FlowStats, FlowSummary, ResultWriter};
use crate::routing::{self, ProtocolChoice, RoutingHandle};
use crate::sim::{AdhocNetwork, Datagram, EventQueue, SimTime};
use crate::traffic::TrafficPlan;
use color_eyre::eyre::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything that can happen during a run. Flow and sink events carry the
/// flow index into the traffic plan.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    FlowStart(usize),
    FlowSend(usize),
    FlowStop(usize),
    Deliver { flow: usize, datagram: Datagram },
    SinkReadable(usize),
    SampleTick,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub protocol: ProtocolChoice,
    pub rows: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_received: u64,
    /// Received packets that fell into a CSV row.
    pub packets_sampled: u64,
    /// Datagrams the channel accepted for delivery.
    pub packets_delivered: u64,
    /// Datagrams still queued at a sink when it was closed.
    pub unread_at_close: usize,
    pub events_processed: u64,
    pub csv_path: PathBuf,
    pub flow_summary_path: Option<PathBuf>,
    pub mobility_trace_path: Option<PathBuf>,
}

/// A fully set-up experiment, ready to run.
pub struct Experiment<W: Write = File> {
    protocol: ProtocolChoice,
    horizon: SimTime,
    queue: EventQueue<Event>,
    network: AdhocNetwork,
    routing: RoutingHandle,
    plan: TrafficPlan,
    counters: Counters,
    recorder: SampleRecorder,
    writer: ResultWriter<W>,
    csv_path: PathBuf,
    flow_summary_path: Option<PathBuf>,
    mobility_trace_path: Option<PathBuf>,
}

impl Experiment<File> {
    /// Validate `config` and build every component of the run.
    ///
    /// The result file is created last, so a configuration error leaves no
    /// file behind.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_writer(config, ResultWriter::create)
    }
}

impl<W: Write> Experiment<W> {
    /// Like [`Experiment::new`], with the result writer opened by `open` once
    /// every other component is built.
    pub(crate) fn with_writer<F>(config: &Config, open: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> Result<ResultWriter<W>>,
    {
        config.validate()?;

        let protocol = config.protocol()?;
        let horizon = SimTime::ZERO + config.total_time()?;
        let interval = config.sample_interval()?;
        let mut rng = StdRng::seed_from_u64(config.general.seed);

        // Nodes and addresses
        let mut network = AdhocNetwork::new(config.experiment.nodes, config.network.propagation_delay);
        network.place_nodes(&mut rng, &config.network.placement);
        let addresses = AddressAllocator::new(config.network.address_base, config.network.address_mask)?
            .assign(network.len())?;
        network.assign_addresses(addresses.iter().copied());
        let node_ids = network.node_ids();
        info!(
            "Created {} nodes with addresses {} .. {}",
            node_ids.len(),
            addresses.first().map(|a| a.to_string()).unwrap_or_default(),
            addresses.last().map(|a| a.to_string()).unwrap_or_default()
        );

        // Routing
        let routing = routing::install(protocol, &mut network, &node_ids)
            .wrap_err_with(|| format!("Failed to install {} routing", protocol))?;

        // Traffic
        let mut plan = TrafficPlan::build(
            &node_ids,
            &addresses,
            config.experiment.sinks,
            config.traffic.port,
            config.sender_profile(),
            horizon,
        )?;
        if let Some(jitter) = config.start_jitter()? {
            plan.jitter_starts(&mut rng, jitter);
        }
        info!(
            "Configured {} flows to port {} ({} byte packets at {} bit/s)",
            plan.len(),
            config.traffic.port,
            config.traffic.packet_size,
            config.traffic.data_rate
        );

        let recorder = SampleRecorder::new(
            interval,
            horizon,
            config.experiment.sinks,
            protocol,
            config.experiment.tx_power_dbm,
        );

        let csv_path = config.output_path();
        let flow_summary_path = config
            .general
            .flow_summary
            .then(|| sibling_path(&csv_path, ".flowmon", "json"));
        let mobility_trace_path = config
            .general
            .trace_mobility
            .then(|| sibling_path(&csv_path, "", "mob"));
        let writer = open(&csv_path)?;

        Ok(Experiment {
            protocol,
            horizon,
            queue: EventQueue::new(),
            network,
            routing,
            plan,
            counters: Counters::new(),
            recorder,
            writer,
            csv_path,
            flow_summary_path,
            mobility_trace_path,
        })
    }

    pub fn protocol(&self) -> ProtocolChoice {
        self.protocol
    }

    pub fn routing(&self) -> &RoutingHandle {
        &self.routing
    }

    pub fn network(&self) -> &AdhocNetwork {
        &self.network
    }

    pub fn plan(&self) -> &TrafficPlan {
        &self.plan
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Run until the horizon, then tear down.
    pub fn run(mut self) -> Result<RunReport> {
        info!(
            "Starting {} run: horizon {}s, {} samples expected",
            self.protocol,
            self.horizon,
            self.recorder.expected_samples()
        );

        for flow in 0..self.plan.len() {
            let sender = &self.plan.senders()[flow];
            let (start, stop) = (sender.start_time(), sender.stop_time());
            self.queue.schedule_at(start, Event::FlowStart(flow));
            self.queue.schedule_at(stop, Event::FlowStop(flow));
        }
        if let Some(first) = self.recorder.first_tick() {
            self.queue.schedule_timer_at(first, Event::SampleTick);
        }

        while let Some((now, event)) = self.queue.pop_before(self.horizon) {
            self.handle(now, event)?;
        }

        self.teardown()
    }

    fn handle(&mut self, now: SimTime, event: Event) -> Result<()> {
        match event {
            Event::FlowStart(flow) => {
                if let Some(sender) = self.plan.sender_mut(flow) {
                    sender.start(now);
                }
                self.send(flow, now);
            }
            Event::FlowSend(flow) => self.send(flow, now),
            Event::FlowStop(flow) => {
                if let Some(sender) = self.plan.sender_mut(flow) {
                    sender.stop();
                }
            }
            Event::Deliver { flow, datagram } => {
                let notify = self.plan.sink_mut(flow).map_or(false, |sink| sink.enqueue(datagram));
                if notify {
                    self.queue.schedule_at(now, Event::SinkReadable(flow));
                }
            }
            Event::SinkReadable(flow) => {
                if let Some(sink) = self.plan.sink_mut(flow) {
                    sink.on_receive(&mut self.counters, now);
                }
            }
            Event::SampleTick => {
                let (sample, next) = self.recorder.tick(&mut self.counters, now);
                self.writer
                    .append_row(&sample)
                    .wrap_err_with(|| format!("Failed to record sample at {}s", now))?;
                if let Some(at) = next {
                    self.queue.schedule_timer_at(at, Event::SampleTick);
                }
            }
        }
        Ok(())
    }

    fn send(&mut self, flow: usize, now: SimTime) {
        let Some(sender) = self.plan.sender_mut(flow) else {
            return;
        };
        let Some((datagram, next)) = sender.send(now) else {
            return;
        };
        if let Some(at) = next {
            self.queue.schedule_at(at, Event::FlowSend(flow));
        }
        if let Some((node, arrival)) = self.network.transmit(&datagram, now) {
            match self.plan.sink_for(node, datagram.destination.port()) {
                Some(target) => self.queue.schedule_at(arrival, Event::Deliver { flow: target, datagram }),
                None => debug!("{} no sink bound to {}", now, datagram.destination),
            }
        }
    }

    fn teardown(mut self) -> Result<RunReport> {
        let pending = self.queue.clear();
        if pending > 0 {
            debug!("Discarded {} events at or beyond the horizon", pending);
        }
        let unread_at_close = self.plan.close_sinks();
        let rows = self.writer.rows();
        self.writer
            .finish()
            .wrap_err_with(|| format!("Failed to finish {}", self.csv_path.display()))?;

        let flows: Vec<FlowStats> = self
            .plan
            .flows()
            .iter()
            .zip(self.plan.senders().iter().zip(self.plan.sinks()))
            .map(|(flow, (sender, sink))| FlowStats {
                flow_id: flow.id,
                source: flow.source,
                sink: flow.sink,
                sink_address: flow.address,
                port: flow.port,
                tx_packets: sender.tx_packets(),
                tx_bytes: sender.tx_bytes(),
                rx_packets: sink.rx_packets(),
                rx_bytes: sink.rx_bytes(),
                delivery_ratio: FlowStats::delivery_ratio(sender.tx_packets(), sink.rx_packets()),
            })
            .collect();

        let packets_sent: u64 = flows.iter().map(|f| f.tx_packets).sum();
        let packets_received: u64 = flows.iter().map(|f| f.rx_packets).sum();
        let bytes_received: u64 = flows.iter().map(|f| f.rx_bytes).sum();

        if let Some(path) = &self.flow_summary_path {
            let summary = FlowSummary::new(
                self.protocol,
                self.network.len(),
                self.horizon.as_secs_f64(),
                flows,
            );
            write_flow_summary(&summary, path)?;
        }
        if let Some(path) = &self.mobility_trace_path {
            self.network.write_mobility_trace(path)?;
        }
        if self.network.dropped() > 0 {
            warn!("{} datagrams had no route to their destination", self.network.dropped());
        }
        let packets_sampled = self.recorder.packets_sampled();
        if packets_sampled < packets_received {
            warn!(
                "{} of {} received packets arrived after the last sample and appear in no row",
                packets_received - packets_sampled,
                packets_received
            );
        }

        info!(
            "Finished {} run: {} of {} samples, {}/{} packets received",
            self.protocol,
            self.recorder.samples_taken(),
            self.recorder.expected_samples(),
            packets_received,
            packets_sent
        );

        Ok(RunReport {
            protocol: self.protocol,
            rows,
            packets_sent,
            packets_received,
            bytes_received,
            packets_sampled,
            packets_delivered: self.network.delivered(),
            unread_at_close,
            events_processed: self.queue.processed(),
            csv_path: self.csv_path,
            flow_summary_path: self.flow_summary_path,
            mobility_trace_path: self.mobility_trace_path,
        })
    }
}

/// Set up and run one experiment.
pub fn run_experiment(config: &Config) -> Result<RunReport> {
    Experiment::new(config)?.run()
}

/// Run every protocol once with otherwise identical settings, in parallel.
///
/// Each run writes to its own file, named after the configured output file
/// with the protocol appended (see [`output_path_for`]).
pub fn run_protocol_sweep(config: &Config) -> Result<Vec<RunReport>> {
    config.validate()?;
    info!("Sweeping {} protocols", ProtocolChoice::ALL.len());
    ProtocolChoice::ALL[..]
        .par_iter()
        .map(|&protocol| {
            run_experiment(&config.for_protocol(protocol))
                .wrap_err_with(|| format!("{} run failed", protocol))
        })
        .collect()
}

/// Output file used for `protocol` in a sweep over `base`.
pub fn output_path_for(base: &Path, protocol: ProtocolChoice) -> PathBuf {
    sibling_path(base, &format!("-{}", protocol), "csv")
}
