use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BaseStation, Slot, SlotRecord};

/// Group flat availability records into stations.
///
/// Stations come out sorted by name, slots ascending by number. A later record
/// for the same (station, slot) replaces the earlier one.
pub fn group_slot_records(records: impl IntoIterator<Item = SlotRecord>) -> Vec<BaseStation> {
    let mut by_station: BTreeMap<String, BTreeMap<u32, bool>> = BTreeMap::new();
    for r in records {
        by_station.entry(r.station).or_default().insert(r.slot, r.status);
    }

    by_station
        .into_iter()
        .map(|(station, slots)| BaseStation {
            station,
            slots: slots
                .into_iter()
                .map(|(slot, available)| Slot { slot, available })
                .collect(),
        })
        .collect()
}

/// Sort top-unit slots by number, dropping duplicates (last wins).
pub fn normalize_slots(slots: impl IntoIterator<Item = Slot>) -> Vec<Slot> {
    let map: BTreeMap<u32, bool> = slots.into_iter().map(|s| (s.slot, s.available)).collect();
    map.into_iter()
        .map(|(slot, available)| Slot { slot, available })
        .collect()
}

impl BaseStation {
    pub fn available_slots(&self) -> BTreeSet<u32> {
        self.slots
            .iter()
            .filter(|s| s.available)
            .map(|s| s.slot)
            .collect()
    }
}

pub fn find_station<'a>(stations: &'a [BaseStation], name: &str) -> Option<&'a BaseStation> {
    stations.iter().find(|s| s.station == name)
}

/// Stations that may be picked as dropoff once `pickup` is chosen.
pub fn dropoff_options<'a>(stations: &'a [BaseStation], pickup: &str) -> Vec<&'a str> {
    stations
        .iter()
        .filter(|s| s.station != pickup)
        .map(|s| s.station.as_str())
        .collect()
}

/// Slots available at both stations, ascending. Empty when the stations are
/// the same or either one is unknown.
pub fn common_slots(stations: &[BaseStation], pickup: &str, dropoff: &str) -> Vec<u32> {
    if pickup == dropoff {
        return Vec::new();
    }
    let (Some(a), Some(b)) = (find_station(stations, pickup), find_station(stations, dropoff)) else {
        return Vec::new();
    };
    a.available_slots()
        .intersection(&b.available_slots())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(station: &str, slot: u32, status: bool) -> SlotRecord {
        SlotRecord {
            station: station.into(),
            slot,
            status,
        }
    }

    fn board() -> Vec<BaseStation> {
        group_slot_records(vec![
            rec("StationB", 3, true),
            rec("StationA", 2, true),
            rec("StationA", 1, true),
            rec("StationB", 1, false),
            rec("StationA", 3, true),
            rec("StationB", 2, true),
        ])
    }

    #[test]
    fn groups_and_sorts() {
        let stations = board();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station, "StationA");
        let numbers: Vec<u32> = stations[1].slots.iter().map(|s| s.slot).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_slot_last_record_wins() {
        let stations = group_slot_records(vec![rec("S", 1, true), rec("S", 1, false)]);
        assert_eq!(stations[0].slots, vec![Slot { slot: 1, available: false }]);
    }

    #[test]
    fn common_slots_is_intersection() {
        let stations = board();
        assert_eq!(common_slots(&stations, "StationA", "StationB"), vec![2, 3]);
        assert_eq!(common_slots(&stations, "StationB", "StationA"), vec![2, 3]);
    }

    #[test]
    fn same_or_unknown_station_has_no_slots() {
        let stations = board();
        assert!(common_slots(&stations, "StationA", "StationA").is_empty());
        assert!(common_slots(&stations, "StationA", "Nowhere").is_empty());
    }

    #[test]
    fn dropoff_excludes_pickup() {
        let stations = board();
        assert_eq!(dropoff_options(&stations, "StationA"), vec!["StationB"]);
    }
}
