use std::error::Error;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use island_worldgen::ascii;
use island_worldgen::config::WorldGenConfig;
use island_worldgen::explorer::{Direction, Explorer};
use island_worldgen::export;
use island_worldgen::grid::CellSize;
use island_worldgen::groups::GroupKind;
use island_worldgen::map::MapGen;
use island_worldgen::render::MonoMetrics;
use island_worldgen::world::{ViewUpdate, World};

/// Glyph extent used when no font backend is attached.
const MONO_CELL: CellSize = CellSize::new(8, 14);

#[derive(Parser, Debug)]
#[command(name = "island_worldgen")]
#[command(about = "Generate seeded island maps and stream them as chunks")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map height in cells
    #[arg(long)]
    rows: Option<usize>,

    /// Map width in cells
    #[arg(long)]
    cols: Option<usize>,

    /// Chunk height in cells
    #[arg(long)]
    chunk_rows: Option<usize>,

    /// Chunk width in cells
    #[arg(long)]
    chunk_cols: Option<usize>,

    /// Chunk hops kept in view around the center
    #[arg(long)]
    view_distance: Option<usize>,

    /// JSON config file; command-line values override it
    #[arg(short, long)]
    config: Option<String>,

    /// Print the map as ASCII
    #[arg(long)]
    ascii: bool,

    /// Export the map to PNG (specify output path)
    #[arg(long)]
    export_png: Option<String>,

    /// Export the group summary to JSON (specify output path)
    #[arg(long)]
    export_groups: Option<String>,

    /// Walk the camera east this many chunks from the map centre
    #[arg(long, default_value = "0")]
    walk: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldGenConfig::from_json_file(path)?,
        None => WorldGenConfig::default(),
    };
    match args.seed {
        Some(seed) => config.seed = seed,
        None if args.config.is_none() => config.seed = rand::random(),
        None => {}
    }
    if let Some(rows) = args.rows {
        config.map_rows = rows;
    }
    if let Some(cols) = args.cols {
        config.map_cols = cols;
    }
    if let Some(rows) = args.chunk_rows {
        config.chunk_rows = rows;
    }
    if let Some(cols) = args.chunk_cols {
        config.chunk_cols = cols;
    }
    if let Some(distance) = args.view_distance {
        config.view_distance = distance;
    }
    config.validate()?;

    let map = MapGen::from_config(&config, &MonoMetrics::new(MONO_CELL)).generate_map();
    println!("Seed: {}", map.seed);
    println!("Map size: {}x{} cells ({}x{} px)", map.cols(), map.rows(), map.size().w, map.size().h);
    println!(
        "Groups: {} ({} seas, {} mountains, {} rivers)",
        map.groups.len(),
        map.groups.count_kind(GroupKind::Sea),
        map.groups.count_kind(GroupKind::Mountain),
        map.groups.count_kind(GroupKind::River),
    );

    if args.ascii {
        print!("{}", ascii::render_map_ascii(&map));
    }
    if let Some(path) = &args.export_png {
        export::export_map_png(&map, path)?;
        println!("Map image written to {}", path);
    }
    if let Some(path) = &args.export_groups {
        export::export_groups_json(&map, path)?;
        println!("Group summary written to {}", path);
    }

    let start = map.center_cell();
    let mut world = World::from_config(map, &config);
    let speed = world.chunk_size().w;
    let Some(mut explorer) = Explorer::spawn(&mut world, &start, speed) else {
        return Err("map has no centre cell".into());
    };
    println!(
        "World: {} chunks in view, {} generated",
        world.chunks_in_view().len(),
        world.chunks_generated()
    );

    for _ in 0..args.walk {
        if explorer.step(&mut world, Direction::East) == ViewUpdate::OutOfView {
            info!("walked off the map");
            break;
        }
    }
    if args.walk > 0 {
        println!(
            "Walk: {} recenters, {} chunks generated, {} cached, {} in view",
            explorer.recenters(),
            world.chunks_generated(),
            world.cached_chunks(),
            world.chunks_in_view().len()
        );
        if args.ascii {
            print!("{}", ascii::render_view_ascii(&world, &config.map_font));
        }
    }

    Ok(())
}
