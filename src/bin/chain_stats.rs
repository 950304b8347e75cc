#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

//! Measures chain lengths and load factor of `ChainedHashTable` under random student ids and
//! renders the results as SVG charts.

use std::{env, error::Error};

use log::info;
use plotters::prelude::*;
use rand::{
    Rng,
    distr::{Alphanumeric, SampleString},
};
use roster::{
    ChainedHashTable, TableExtensions,
    config::{LOG_LEVEL_ENV, parse_level},
    logger::initialize_logger,
};

/// Largest number of ids inserted
const MAX_KEYS: usize = 50_000;
/// Number of table sizes measured between zero and `MAX_KEYS`
const NUM_SAMPLES: usize = 10;
/// Insertions traced one by one for the load factor chart
const TRACE_KEYS: usize = 2_000;
/// Random characters after the `S` prefix
const ID_SUFFIX_LEN: usize = 7;
/// Growth threshold drawn on the load factor chart
const MAX_LOAD_FACTOR: f64 = 0.75;

/// Shape of one table after a batch of insertions
#[derive(Debug, Clone, Copy)]
struct Sample {
    /// Distinct keys stored
    keys: usize,
    /// Bucket count after growth
    buckets: usize,
    /// `keys / buckets`
    load_factor: f64,
    /// Mean length of the non-empty chains
    mean_chain: f64,
    /// Longest chain
    longest_chain: usize,
}

/// Generates `count` ids such as `S4fZ01qa`
fn random_ids<R: Rng>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| format!("S{}", Alphanumeric.sample_string(rng, ID_SUFFIX_LEN)))
        .collect()
}

/// Inserts the first `count` ids into a default table and records its shape
fn measure(ids: &[String], count: usize) -> Sample {
    let table: ChainedHashTable<()> = ids.iter().take(count).map(|id| (id.as_str(), ())).collect();

    let lengths = table.chain_lengths();
    let occupied = lengths.iter().filter(|&&len| len > 0).count();
    let mean_chain = if occupied == 0 { 0.0 } else { table.len() as f64 / occupied as f64 };

    Sample {
        keys: table.len(),
        buckets: table.bucket_count(),
        load_factor: table.load_factor(),
        mean_chain,
        longest_chain: table.longest_chain(),
    }
}

/// Load factor after each of the first `TRACE_KEYS` insertions
fn trace_load_factor(ids: &[String]) -> Vec<(usize, f64)> {
    let mut table = ChainedHashTable::new();
    ids.iter()
        .take(TRACE_KEYS)
        .enumerate()
        .map(|(i, id)| {
            table.set(id.as_str(), ());
            (i + 1, table.load_factor())
        })
        .collect()
}

/// Label, color and value accessor of one line on the chain length chart
type Series = (&'static str, RGBColor, fn(&Sample) -> f64);

/// Font used for every caption and axis description
const FONT_FAMILY: &str = "sans-serif";
/// Axis description size
const TEXT_SIZE: i32 = 16;
/// Caption size
const TITLE_SIZE: i32 = 35;
/// Stroke width of data lines
const LINE_WIDTH: u32 = 2;
/// Radius of sample markers
const MARKER_SIZE: i32 = 4;
/// Size of every rendered chart
const CHART_SIZE: (u32, u32) = (1200, 800);

/// Longest chain and the number of buckets in the most common length
fn histogram_bounds(lengths: &[u32]) -> (u32, u32) {
    let longest = lengths.iter().copied().max().unwrap_or(0);
    let most_common = (0..=longest)
        .map(|len| lengths.iter().filter(|&&l| l == len).count())
        .max()
        .unwrap_or(0);
    (longest, u32::try_from(most_common).unwrap_or(u32::MAX))
}

/// Mean and longest chain against the number of keys
fn plot_chain_lengths(samples: &[Sample]) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new("chain_lengths.svg", CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max_chain = samples.iter().map(|s| s.longest_chain).max().unwrap_or(1) as f64 * 1.1;
    let max_keys = samples.iter().map(|s| s.keys).max().unwrap_or(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Chain Length by Number of Keys", (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..max_keys, 0.0..max_chain)?;

    chart
        .configure_mesh()
        .x_desc("Number of Keys Inserted")
        .y_desc("Chain Length (entries)")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    let series: [Series; 2] = [
        ("Mean non-empty chain", RGBColor(50, 90, 220), |s| s.mean_chain),
        ("Longest chain", RGBColor(220, 50, 50), |s| s.longest_chain as f64),
    ];

    for (label, color, value) in series {
        let style = ShapeStyle::from(&color).stroke_width(LINE_WIDTH);
        chart
            .draw_series(LineSeries::new(samples.iter().map(|s| (s.keys, value(s))), style))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        chart.draw_series(
            samples.iter().map(|s| Circle::new((s.keys, value(s)), MARKER_SIZE, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Load factor sawtooth caused by growth
fn plot_load_factor(trace: Vec<(usize, f64)>) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new("load_factor.svg", CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Load Factor per Insertion", (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..TRACE_KEYS, 0.0..1.0)?;

    chart
        .configure_mesh()
        .x_desc("Insertions")
        .y_desc("Load Factor")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    let threshold_style = ShapeStyle::from(&RED.mix(0.3)).stroke_width(1);
    chart
        .draw_series(LineSeries::new(
            vec![(0, MAX_LOAD_FACTOR), (TRACE_KEYS, MAX_LOAD_FACTOR)],
            threshold_style,
        ))?
        .label("Growth threshold")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], threshold_style));

    let trace_style = ShapeStyle::from(&BLUE).stroke_width(LINE_WIDTH);
    chart
        .draw_series(LineSeries::new(trace, trace_style))?
        .label("Load factor")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], trace_style));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Distribution of chain lengths in a table holding every id
fn plot_chain_histogram(ids: &[String]) -> Result<(), Box<dyn Error>> {
    let table: ChainedHashTable<()> = ids.iter().map(|id| (id.as_str(), ())).collect();
    let lengths: Vec<u32> =
        table.chain_lengths().into_iter().map(|len| u32::try_from(len).unwrap_or(u32::MAX)).collect();
    let (longest, most_common) = histogram_bounds(&lengths);
    info!("Histogram of {} chains, longest {longest}", lengths.len());

    let root = SVGBackend::new("chain_histogram.svg", CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Chain Lengths over {} Buckets", table.bucket_count()),
            (FONT_FAMILY, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..longest + 1).into_segmented(), 0u32..most_common + most_common / 10 + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Chain Length")
        .y_desc("Buckets")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(RGBColor(50, 180, 50).mix(0.7).filled())
            .data(lengths.iter().map(|&len| (len, 1))),
    )?;
    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    initialize_logger(parse_level(&env::var(LOG_LEVEL_ENV).unwrap_or_default()));

    let mut rng = rand::rng();
    let ids = random_ids(&mut rng, MAX_KEYS);

    let samples: Vec<Sample> =
        (1..=NUM_SAMPLES).map(|step| measure(&ids, MAX_KEYS * step / NUM_SAMPLES)).collect();

    for sample in &samples {
        println!(
            "  {} keys: buckets = {}, load factor = {:.3}, mean chain = {:.2}, longest chain = {}",
            sample.keys, sample.buckets, sample.load_factor, sample.mean_chain, sample.longest_chain
        );
    }

    plot_chain_lengths(&samples)?;
    plot_load_factor(trace_load_factor(&ids))?;
    plot_chain_histogram(&ids)?;

    println!("Generated plot images: chain_lengths.svg, load_factor.svg, chain_histogram.svg");

    Ok(())
}
