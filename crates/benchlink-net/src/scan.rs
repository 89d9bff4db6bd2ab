//! Keeping the strongest few networks from a scan.

use crate::{AuthMode, ScanRecord};

/// The top-N usable networks from the last scan, strongest first.
///
/// Built fresh from each scan. Hidden networks and unsupported security
/// modes are skipped; when an SSID is seen more than once, the strongest
/// sighting wins. Once full, a new network only gets in by displacing the
/// current weakest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopScanResults {
    capacity: usize,
    entries: Vec<ScanRecord>,
}

impl TopScanResults {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Filters and ranks one scan's raw records.
    pub fn from_scan(
        records: impl IntoIterator<Item = ScanRecord>,
        supported: &[AuthMode],
        capacity: usize,
    ) -> Self {
        let mut top = Self::new(capacity);
        for record in records {
            if supported.contains(&record.auth_mode) {
                top.offer(record);
            }
        }
        // Stable, so equal-strength networks keep their sighting order.
        top.entries.sort_by(|a, b| b.rssi.cmp(&a.rssi));
        top
    }

    fn offer(&mut self, record: ScanRecord) {
        if record.ssid.is_empty() || self.capacity == 0 {
            return;
        }

        if let Some(existing) = self.entries.iter_mut().find(|e| e.ssid == record.ssid) {
            if record.rssi > existing.rssi {
                *existing = record;
            }
            return;
        }

        if self.entries.len() < self.capacity {
            self.entries.push(record);
            return;
        }

        if let Some(weakest) = self.entries.iter_mut().min_by_key(|e| e.rssi) {
            if record.rssi > weakest.rssi {
                *weakest = record;
            }
        }
    }

    pub fn as_slice(&self) -> &[ScanRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ScanRecord> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [AuthMode; 2] = [AuthMode::WPA_TKIP_PSK, AuthMode::WPA2_AES_PSK];

    fn ssids(top: &TopScanResults) -> Vec<&str> {
        top.as_slice().iter().map(|r| r.ssid.as_str()).collect()
    }

    #[test]
    fn test_only_supported_auth_modes_kept() {
        let top = TopScanResults::from_scan(
            [
                ScanRecord::new("open", -30, AuthMode(0)),
                ScanRecord::new("tkip", -60, AuthMode(5)),
                ScanRecord::new("wpa2", -50, AuthMode(7)),
            ],
            &SUPPORTED,
            5,
        );
        assert_eq!(ssids(&top), vec!["wpa2", "tkip"]);
    }

    #[test]
    fn test_hidden_networks_ignored() {
        let top = TopScanResults::from_scan(
            [ScanRecord::new("", -20, AuthMode(7))],
            &SUPPORTED,
            5,
        );
        assert!(top.is_empty());
    }

    #[test]
    fn test_duplicate_ssid_keeps_strongest() {
        let top = TopScanResults::from_scan(
            [
                ScanRecord::new("home", -80, AuthMode(7)),
                ScanRecord::new("home", -40, AuthMode(5)),
                ScanRecord::new("home", -70, AuthMode(7)),
            ],
            &SUPPORTED,
            5,
        );
        assert_eq!(top.as_slice(), &[ScanRecord::new("home", -40, AuthMode(5))]);
    }

    #[test]
    fn test_full_list_replaces_weakest() {
        let top = TopScanResults::from_scan(
            [
                ScanRecord::new("a", -50, AuthMode(7)),
                ScanRecord::new("b", -90, AuthMode(7)),
                ScanRecord::new("c", -60, AuthMode(7)),
                ScanRecord::new("d", -95, AuthMode(7)),
                ScanRecord::new("e", -40, AuthMode(7)),
            ],
            &SUPPORTED,
            3,
        );
        assert_eq!(ssids(&top), vec!["e", "a", "c"]);
    }

    #[test]
    fn test_sorted_strongest_first() {
        let top = TopScanResults::from_scan(
            (0..5).map(|i| ScanRecord::new(format!("n{i}"), -90 + i * 10, AuthMode(7))),
            &SUPPORTED,
            5,
        );
        let rssi: Vec<_> = top.as_slice().iter().map(|r| r.rssi).collect();
        assert_eq!(rssi, vec![-50, -60, -70, -80, -90]);
    }
}
