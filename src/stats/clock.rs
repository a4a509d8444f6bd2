//! Time-of-day distribution

use crate::table::EventTable;
use chrono::Timelike;

pub const HOURS_PER_DAY: usize = 24;

/// Count events of `species` by the hour they started, in the offset the
/// event was recorded with
pub fn hourly_histogram(table: &EventTable, species: &str) -> [usize; HOURS_PER_DAY] {
    let mut bins = [0usize; HOURS_PER_DAY];
    for row in table.rows().iter().filter(|r| r.species == species) {
        bins[row.start.hour() as usize] += 1;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{tabulate, tests::event, tests::stream};

    #[test]
    fn test_hourly_histogram() {
        let s = stream(
            "f",
            vec![
                event("e1", "dog", "button_press", "2021-05-01T00:10:00Z", "2021-05-01T00:10:01Z", Some("food")),
                event("e2", "dog", "bark", "2021-05-01T23:59:00-04:00", "2021-05-01T23:59:01-04:00", None),
                event("e3", "dog", "button_press", "2021-05-01T23:01:00Z", "2021-05-01T23:01:01Z", Some("out")),
                event("e4", "person", "button_press", "2021-05-01T12:00:00Z", "2021-05-01T12:00:01Z", Some("out")),
            ],
        );
        let table = EventTable::new(tabulate(&s).unwrap());

        let bins = hourly_histogram(&table, "canis familiaris");
        assert_eq!(bins[0], 1);
        assert_eq!(bins[23], 2);
        assert_eq!(bins[12], 0);
        assert_eq!(bins.iter().sum::<usize>(), 3);
    }
}
