use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use pnet::datalink;

use crate::errors::{GraphError, Result};
use crate::source::{BandwidthEvent, EventSource, Listener, Ticker};

const NET_DEV_PATH: &str = "/proc/net/dev";

pub fn get_local_ip(interface: &str) -> Option<Ipv4Addr> {
    let interfaces = datalink::interfaces();
    let iface = interfaces.into_iter().find(|i| i.name == interface)?;
    iface.ips.iter().find_map(|ip| {
        if let pnet::ipnetwork::IpNetwork::V4(net) = ip {
            Some(net.ip())
        } else {
            None
        }
    })
}

// First interface that is up, not loopback, and has an IPv4 address
pub fn default_interface() -> Result<String> {
    datalink::interfaces()
        .into_iter()
        .find(|i| i.is_up() && !i.is_loopback() && i.ips.iter().any(|ip| ip.is_ipv4()))
        .map(|i| i.name)
        .ok_or_else(|| GraphError::NoInterface {
            details: "no interface is up with an IPv4 address".to_string(),
        })
}

/// Cumulative (received, transmitted) bytes for `interface` from the
/// contents of `/proc/net/dev`.
pub fn parse_net_dev(contents: &str, interface: &str) -> Option<(u64, u64)> {
    contents.lines().skip(2).find_map(|line| {
        let (name, counters) = line.split_once(':')?;
        if name.trim() != interface {
            return None;
        }
        let fields: Vec<&str> = counters.split_whitespace().collect();
        // 8 receive columns precede the transmit columns
        let rx = fields.first()?.parse().ok()?;
        let tx = fields.get(8)?.parse().ok()?;
        Some((rx, tx))
    })
}

/// Turns monotonically increasing counters into per-interval deltas.
#[derive(Debug, Default)]
pub struct CounterDelta {
    last: Option<(u64, u64)>,
}

impl CounterDelta {
    /// Returns `None` for the first reading, which only sets the baseline.
    /// A counter that went backwards (interface reset) counts as zero.
    pub fn advance(&mut self, rx: u64, tx: u64) -> Option<BandwidthEvent> {
        let previous = self.last.replace((rx, tx))?;
        Some(BandwidthEvent {
            read: rx.saturating_sub(previous.0),
            written: tx.saturating_sub(previous.1),
        })
    }
}

/// Samples the kernel's per-interface byte counters once per interval.
pub struct CounterSource {
    interface: String,
    interval: Duration,
    path: PathBuf,
    ticker: Option<Ticker>,
}

impl CounterSource {
    pub fn new(interface: impl Into<String>, interval: Duration) -> Self {
        Self {
            interface: interface.into(),
            interval,
            path: PathBuf::from(NET_DEV_PATH),
            ticker: None,
        }
    }

    /// Reads counters from `path` instead of `/proc/net/dev`.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

}

fn read_counters(path: &Path, interface: &str) -> Result<(u64, u64)> {
    let contents = fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_net_dev(&contents, interface).ok_or_else(|| GraphError::NoInterface {
        details: format!("'{interface}' not listed in {}", path.display()),
    })
}

struct CounterSampler {
    path: PathBuf,
    interface: String,
    delta: CounterDelta,
}

impl CounterSampler {
    fn poll(&mut self) -> Option<BandwidthEvent> {
        match read_counters(&self.path, &self.interface) {
            Ok((rx, tx)) => self.delta.advance(rx, tx),
            Err(err) => {
                // Next good read re-primes, so a gap never shows up as one big column
                warn!("skipping sample: {err}");
                self.delta = CounterDelta::default();
                None
            }
        }
    }
}

impl EventSource for CounterSource {
    fn subscribe(&mut self, listener: Listener) -> Result<()> {
        if self.ticker.is_some() {
            return Err(GraphError::Source {
                details: format!("already subscribed to '{}'", self.interface),
            });
        }

        let mut sampler = CounterSampler {
            path: self.path.clone(),
            interface: self.interface.clone(),
            delta: CounterDelta::default(),
        };
        let (rx, tx) = read_counters(&sampler.path, &sampler.interface)?;
        sampler.delta.advance(rx, tx);
        let poll = move || sampler.poll();

        info!(
            "sampling {} counters every {:?}",
            self.interface, self.interval
        );
        self.ticker = Some(Ticker::spawn(self.interval, poll, listener));
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
            info!("stopped sampling {}", self.interface);
        }
    }
}

#[cfg(feature = "capture")]
pub use capture::CaptureSource;

#[cfg(feature = "capture")]
mod capture {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use log::{debug, info, warn};
    use parking_lot::Mutex;
    use pcap::Capture;
    use pnet::packet::{
        ethernet::{EtherTypes, EthernetPacket},
        ipv4::Ipv4Packet,
        Packet,
    };

    use super::get_local_ip;
    use crate::errors::{GraphError, Result};
    use crate::source::{BandwidthEvent, EventSource, Listener, Ticker};

    /// Counts bytes of every IPv4 frame seen on the interface, split by
    /// whether the interface's own address sent it.
    pub struct CaptureSource {
        interface: String,
        interval: Duration,
        running: Arc<AtomicBool>,
        capture: Option<JoinHandle<()>>,
        ticker: Option<Ticker>,
    }

    impl CaptureSource {
        pub fn new(interface: impl Into<String>, interval: Duration) -> Self {
            Self {
                interface: interface.into(),
                interval,
                running: Arc::new(AtomicBool::new(false)),
                capture: None,
                ticker: None,
            }
        }
    }

    impl EventSource for CaptureSource {
        fn subscribe(&mut self, listener: Listener) -> Result<()> {
            if self.ticker.is_some() {
                return Err(GraphError::Source {
                    details: format!("already capturing on '{}'", self.interface),
                });
            }

            let local_ip = get_local_ip(&self.interface).ok_or_else(|| GraphError::NoInterface {
                details: format!("'{}' has no IPv4 address", self.interface),
            })?;
            let mut cap = Capture::from_device(self.interface.as_str())
                .and_then(|c| c.promisc(true).snaplen(65535).timeout(10).open())
                .map_err(|err| GraphError::Source {
                    details: format!("capture on '{}': {err}", self.interface),
                })?;

            let totals = Arc::new(Mutex::new(BandwidthEvent::default()));
            let counted = Arc::clone(&totals);
            let running = Arc::clone(&self.running);
            running.store(true, Ordering::SeqCst);
            let interface = self.interface.clone();

            self.capture = Some(thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    let next = cap.next_packet();
                    if !keep_capturing(&next) {
                        if let Err(err) = next {
                            warn!("capture on {interface} failed, stopping: {err}");
                        }
                        break;
                    }
                    // Timeouts land here, which is what lets the flag be checked
                    let Ok(packet) = next else {
                        continue;
                    };
                    let Some(ethernet) = EthernetPacket::new(packet.data) else {
                        continue;
                    };
                    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
                        continue;
                    }
                    if let Some(ipv4) = Ipv4Packet::new(ethernet.payload()) {
                        let len = u64::from(packet.header.len);
                        let mut totals = counted.lock();
                        if ipv4.get_source() == local_ip {
                            totals.written += len;
                        } else {
                            totals.read += len;
                        }
                    }
                }
                debug!("capture thread exiting");
            }));

            let poll = move || Some(std::mem::take(&mut *totals.lock()));
            self.ticker = Some(Ticker::spawn(self.interval, poll, listener));
            info!("capturing on {} ({local_ip})", self.interface);
            Ok(())
        }

        fn unsubscribe(&mut self) {
            if let Some(mut ticker) = self.ticker.take() {
                ticker.stop();
            }
            self.running.store(false, Ordering::SeqCst);
            if let Some(capture) = self.capture.take() {
                let _ = capture.join();
                info!("stopped capturing on {}", self.interface);
            }
        }
    }

    impl Drop for CaptureSource {
        fn drop(&mut self) {
            self.unsubscribe();
        }
    }

    // Only a read timeout is worth retrying; anything else repeats forever
    fn keep_capturing<T>(next: &std::result::Result<T, pcap::Error>) -> bool {
        matches!(next, Ok(_) | Err(pcap::Error::TimeoutExpired))
    }

}
