use std::error::Error;

use chrono::{DateTime, Duration, FixedOffset};
use timeseq::sequence::{source, SequenceExt};
use timeseq::timeseries::util::{compact, mean};
use timeseq::{linearize, Pair, TimeSeries, Tolerance};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let readings = [
        ("2011-10-05T14:48:00.000Z", 32.6),
        ("2011-10-05T14:58:00.000Z", 32.7),
        ("2011-10-05T15:08:00.000Z", 32.8),
        ("2011-10-05T15:18:00.000Z", 32.5),
        ("2011-10-05T15:22:00.000Z", 33.8),
        ("2011-10-05T16:48:00.000Z", 34.0),
        ("2011-10-05T17:48:00.000Z", 28.2),
        ("2011-10-05T18:48:00.000Z", 12.3),
    ];
    let samples = readings
        .iter()
        .map(|&(at, value)| Ok(Pair::new(DateTime::parse_from_rfc3339(at)?, value)))
        .collect::<Result<Vec<Pair<DateTime<FixedOffset>, f64>>, chrono::ParseError>>()?;

    let segments = linearize(source::of(samples.clone()), 0.5)?.take_all()?;
    for segment in &segments {
        println!(
            "segment from {} over {} readings: {:.2} {:+.6}/s",
            segment.start, segment.len, segment.intercept, segment.slope
        );
    }

    let tolerance = Tolerance::default();
    let steps = TimeSeries::from_entries(
        samples
            .iter()
            .map(|sample| Pair::new(Some(*sample.first()), Some(*sample.second()))),
        tolerance,
    )?;
    if let (Some(start), Some(end)) = (steps.starts_at(), steps.ends_at()) {
        println!("steps: {} from {start} to {end}", steps.len());
    }

    let origin = *samples[0].first();
    let hourly = source::unary_generator(origin, |t| *t + Duration::hours(1));
    let buckets = compact(source::of(samples), hourly, |values: &[f64]| mean(values));
    for bucket in buckets.iter() {
        let bucket = bucket?;
        println!("hour from {}: mean {:.2}", bucket.first(), bucket.second());
    }

    Ok(())
}
