use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{arena::Arena, error::SimError, options::SaveOptions};

/// One sampled row per live bird per sampled tick: everything a renderer or
/// an offline analysis needs, nothing the collision engine cares about.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct BirdData {
    pub id: usize,
    pub y: f32,
    pub tilt: f32,
    pub frame: usize,
    pub score: u32,
    pub time: u64,
}

pub struct Birdwatcher {
    locations: Vec<BirdData>,
    render_ticker: u64,
    sample_rate: u64,
}

const PREFIX: &str = "flappers-data";

impl Birdwatcher {
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            locations: Vec::new(),
            render_ticker: 0,
            sample_rate,
        }
    }

    /// Triggers data collection
    pub fn watch(&mut self, arena: &Arena) {
        if !self.should_sample() {
            return;
        }

        let score = arena.score();
        let time = self.render_ticker / self.sample_rate;

        let mut current: Vec<BirdData> = arena
            .view()
            .map(|agent| BirdData {
                id: agent.id,
                y: agent.bird.position.y,
                tilt: agent.bird.tilt,
                frame: agent.bird.frame,
                score,
                time,
            })
            .collect();

        self.locations.append(&mut current);
    }

    pub fn restart(&mut self) {
        self.locations.clear();
    }

    pub fn pop_data(&mut self) -> Vec<BirdData> {
        mem::take(&mut self.locations)
    }

    /// Saves the latest data in CSV format, then returns it while emptying
    /// the birdwatcher's memory.
    ///
    /// Depending on save options, either overwrites the current file or
    /// writes a new timestamped one.
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> Result<Vec<BirdData>, SimError> {
        let data = self.pop_data();

        if !save_options.save_locations {
            return Ok(data);
        }

        if let Some(path) = &save_options.save_locations_path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = Birdwatcher::get_dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(file_path)?;
            let mut wtr = csv::Writer::from_writer(file);

            for row in data.iter() {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }

        Ok(data)
    }

    fn get_dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_locations_timestamp {
            true => {
                let datetime_part = now.timestamp_millis();
                format!(
                    "{prefix}_{datetime}.csv",
                    prefix = PREFIX,
                    datetime = datetime_part
                )
            }
            false => format!("{prefix}.csv", prefix = PREFIX),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use crate::{birdwatcher::Birdwatcher, options::SaveOptions};

    #[test]
    fn test_name_timestamped() {
        let expected = "flappers-data_1668038059490.csv";
        let save_options = SaveOptions {
            save_locations: true,
            save_locations_path: Some("".to_owned()),
            save_locations_timestamp: true,
        };
        let dt = Utc.timestamp_millis_opt(1_668_038_059_490).unwrap();
        let actual = Birdwatcher::get_dataset_name(&save_options, dt);

        assert_eq!(actual, expected)
    }

    #[test]
    fn test_name_overwrite() {
        let expected = "flappers-data.csv";
        let save_options = SaveOptions {
            save_locations: true,
            save_locations_path: Some("".to_owned()),
            save_locations_timestamp: false,
        };
        let dt = Utc.timestamp_millis_opt(1_668_038_059_490).unwrap();
        let actual = Birdwatcher::get_dataset_name(&save_options, dt);

        assert_eq!(actual, expected)
    }

    #[test]
    fn respects_sample_rate() {
        use std::cell::Cell;
        use std::rc::Rc;

        use crate::arena::Arena;
        use crate::controller::{AgentSeed, Controller, Features};
        use crate::options::RunOptions;

        struct Still;
        impl Controller for Still {
            fn activate(&mut self, _: Features) -> f32 {
                0.
            }
        }

        let ro = RunOptions::default();
        let seeds = vec![AgentSeed {
            controller: Box::new(Still),
            fitness: Rc::new(Cell::new(0.)),
        }];
        let mut arena = Arena::new(seeds, &ro);
        let mut watcher = Birdwatcher::new(4);

        for _ in 0..8 {
            arena.update(&ro);
            watcher.watch(&arena);
        }

        // one live bird, sampled on ticks 4 and 8
        assert_eq!(watcher.pop_data().len(), 2);
    }
}
