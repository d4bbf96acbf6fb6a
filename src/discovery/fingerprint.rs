use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};

use crate::constants::{OFFLINE_TTL, WINDOWS_TTL_LOWER_EXCLUSIVE, WINDOWS_TTL_UPPER_EXCLUSIVE};
use crate::discovery::probe::EchoProbe;
use crate::models::HostClassification;

/// Map a reply TTL to an OS bucket.
///
/// Windows ships with a default TTL of 128, so anything a few hops below
/// that lands in the Windows band. Zero means no reply at all.
pub fn classify(ttl: u32) -> HostClassification {
    if ttl == OFFLINE_TTL {
        HostClassification::Offline
    } else if ttl > WINDOWS_TTL_LOWER_EXCLUSIVE && ttl < WINDOWS_TTL_UPPER_EXCLUSIVE {
        HostClassification::Windows
    } else {
        HostClassification::Other
    }
}

/// Address -> classification map shared by the fingerprinting workers.
///
/// Every enumerated address is seeded with `Unknown` before the pool starts
/// and must be overwritten exactly once. Writes go through `record`, a
/// single-entry upsert under the lock.
#[derive(Debug, Default)]
pub struct ClassificationMap {
    entries: Mutex<BTreeMap<Ipv4Addr, HostClassification>>,
}

impl ClassificationMap {
    pub fn seeded(hosts: &[Ipv4Addr]) -> Self {
        let entries = hosts
            .iter()
            .map(|host| (*host, HostClassification::Unknown))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Ipv4Addr, HostClassification>> {
        // A poisoned lock only means another worker panicked mid-upsert;
        // each entry is a plain Copy value, so the map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store the classification for `host`.
    ///
    /// Returns `true` when the entry was still `Unknown` (or absent), i.e.
    /// this is the single expected write for the host.
    pub fn record(&self, host: Ipv4Addr, classification: HostClassification) -> bool {
        let previous = self.lock().insert(host, classification);
        match previous {
            None | Some(HostClassification::Unknown) => true,
            Some(earlier) => {
                warn!(
                    "{} classified twice ({} then {}), keeping the latest",
                    host, earlier, classification
                );
                false
            }
        }
    }

    pub fn get(&self, host: Ipv4Addr) -> Option<HostClassification> {
        self.lock().get(&host).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Ascending copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<Ipv4Addr, HostClassification> {
        self.lock().clone()
    }

    /// Hosts still carrying the `Unknown` sentinel.
    pub fn unresolved(&self) -> Vec<Ipv4Addr> {
        self.hosts_with(HostClassification::Unknown)
    }

    /// Ascending list of hosts classified as Windows.
    pub fn windows_hosts(&self) -> Vec<Ipv4Addr> {
        self.hosts_with(HostClassification::Windows)
    }

    pub fn count(&self, classification: HostClassification) -> usize {
        self.lock().values().filter(|c| **c == classification).count()
    }

    fn hosts_with(&self, classification: HostClassification) -> Vec<Ipv4Addr> {
        self.lock()
            .iter()
            .filter(|(_, c)| **c == classification)
            .map(|(host, _)| *host)
            .collect()
    }
}

/// Probes one host and records its classification.
pub struct Fingerprinter {
    probe: Arc<dyn EchoProbe>,
    results: Arc<ClassificationMap>,
}

impl Fingerprinter {
    pub fn new(probe: Arc<dyn EchoProbe>, results: Arc<ClassificationMap>) -> Self {
        Self { probe, results }
    }

    /// Classify `host` and write the result into the shared map.
    ///
    /// Never fails: probe errors are logged and treated as TTL 0.
    pub fn probe(&self, host: Ipv4Addr) -> HostClassification {
        let ttl = match self.probe.probe(host) {
            Ok(ttl) => ttl,
            Err(e) => {
                debug!("{}", e);
                OFFLINE_TTL
            }
        };

        let classification = classify(ttl);
        debug!("{} -> {} (TTL {})", host, classification, ttl);
        self.results.record(host, classification);
        classification
    }

    pub fn results(&self) -> &Arc<ClassificationMap> {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SweepError;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct ScriptedProbe {
        replies: HashMap<Ipv4Addr, Result<u32, String>>,
    }

    impl EchoProbe for ScriptedProbe {
        fn probe(&self, host: Ipv4Addr) -> Result<u32, SweepError> {
            match self.replies.get(&host) {
                Some(Ok(ttl)) => Ok(*ttl),
                Some(Err(reason)) => Err(SweepError::probe(host, reason.clone())),
                None => Err(SweepError::probe(host, "timed out")),
            }
        }
    }

    fn fingerprinter(replies: Vec<(Ipv4Addr, Result<u32, String>)>, hosts: &[Ipv4Addr]) -> Fingerprinter {
        let probe = ScriptedProbe {
            replies: replies.into_iter().collect(),
        };
        Fingerprinter::new(Arc::new(probe), Arc::new(ClassificationMap::seeded(hosts)))
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), HostClassification::Offline);
        assert_eq!(classify(1), HostClassification::Other);
        assert_eq!(classify(64), HostClassification::Other);
        assert_eq!(classify(120), HostClassification::Other);
        assert_eq!(classify(121), HostClassification::Windows);
        assert_eq!(classify(128), HostClassification::Windows);
        assert_eq!(classify(139), HostClassification::Windows);
        assert_eq!(classify(140), HostClassification::Other);
        assert_eq!(classify(255), HostClassification::Other);
    }

    proptest! {
        #[test]
        fn prop_classify_bands(ttl in any::<u32>()) {
            let class = classify(ttl);
            prop_assert_eq!(class == HostClassification::Windows, ttl > 120 && ttl < 140);
            prop_assert_eq!(class == HostClassification::Offline, ttl == 0);
            prop_assert!(class != HostClassification::Unknown);
        }
    }

    #[test]
    fn test_probe_failure_is_offline() {
        let host = Ipv4Addr::new(10, 0, 0, 7);
        let fp = fingerprinter(vec![(host, Err("reply carried no numeric TTL".into()))], &[host]);
        assert_eq!(fp.probe(host), HostClassification::Offline);
        assert_eq!(fp.results().get(host), Some(HostClassification::Offline));
    }

    #[test]
    fn test_timeout_is_offline() {
        let host = Ipv4Addr::new(10, 0, 0, 8);
        let fp = fingerprinter(vec![], &[host]);
        assert_eq!(fp.probe(host), HostClassification::Offline);
    }

    #[test]
    fn test_probe_records_into_map() {
        let win = Ipv4Addr::new(10, 0, 0, 1);
        let lin = Ipv4Addr::new(10, 0, 0, 2);
        let fp = fingerprinter(vec![(win, Ok(128)), (lin, Ok(64))], &[win, lin]);

        assert_eq!(fp.results().unresolved(), vec![win, lin]);
        fp.probe(lin);
        fp.probe(win);

        assert!(fp.results().unresolved().is_empty());
        assert_eq!(fp.results().windows_hosts(), vec![win]);
        assert_eq!(fp.results().count(HostClassification::Other), 1);
    }

    #[test]
    fn test_record_detects_second_write() {
        let host = Ipv4Addr::new(192, 168, 0, 10);
        let map = ClassificationMap::seeded(&[host]);
        assert!(map.record(host, HostClassification::Windows));
        assert!(!map.record(host, HostClassification::Other));
        assert_eq!(map.get(host), Some(HostClassification::Other));
    }

    #[test]
    fn test_snapshot_is_ascending() {
        let hosts = vec![
            Ipv4Addr::new(10, 0, 0, 3),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        ];
        let map = ClassificationMap::seeded(&hosts);
        let keys: Vec<_> = map.snapshot().into_keys().collect();
        assert_eq!(
            keys,
            vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 3)]
        );
    }
}
