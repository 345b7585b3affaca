use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tfstore::asset::{AssetConfig, AssetReader, AssetState, Checkpoint, CheckpointRegistry, DataLimitSettings};
use tfstore::core::{QuantaClock, TimeUnit, Timeframe};
use tfstore::lifecycle::{AccessLog, ReadRecorder};
use tfstore::record::{BinaryParser, DataList, DataType, Value};
use tfstore::storage::MemoryStore;

#[derive(Parser)]
#[command(name = "tfstore-inspect")]
#[command(about = "Load an asset dataset into memory and run reads against it")]
struct Cli {
    /// Asset config JSON
    #[arg(long)]
    config: PathBuf,

    /// CSV rows: timeframe,time_ms,field[,field...]
    #[arg(long)]
    data: PathBuf,

    /// Directory for the persistent read log. Enables read recording.
    #[arg(long)]
    read_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Records in [from, to)
    Range {
        #[arg(long)]
        timeframe: Timeframe,
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
    },
    /// Up to LIMIT records after (or before, with --backward) OFFSET
    Limit {
        #[arg(long)]
        timeframe: Timeframe,
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        backward: bool,
    },
    /// Oldest record of a timeframe
    Earliest {
        #[arg(long)]
        timeframe: Timeframe,
    },
    /// Newest record of a timeframe
    Latest {
        #[arg(long)]
        timeframe: Timeframe,
    },
    /// Active timeframes that need reindexing
    Reindex {
        /// Base timeframe consistency checkpoint (ms)
        #[arg(long)]
        checkpoint: Option<u64>,
        /// Treat the base timeframe as consistent
        #[arg(long)]
        consistent: bool,
    },
    /// Every key under the asset prefix
    Dump,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = AssetConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let state = AssetState::from_config(config)?;

    let store = Arc::new(MemoryStore::new());
    let loaded = load_csv(&cli.data, &state, &store)?;
    info!("loaded {} rows for asset {}", loaded, state.id());

    let registry = Arc::new(CheckpointRegistry::new());
    let clock = Arc::new(QuantaClock::new());
    let mut reader = AssetReader::new(state.clone(), store, registry.clone()).with_clock(clock.clone());

    let access_log = match &cli.read_log {
        Some(dir) => {
            let log = Arc::new(AccessLog::open(dir)?);
            let recorder = ReadRecorder::spawn(log.clone(), clock.clone())?;
            reader = reader.with_recorder(Arc::new(recorder));
            Some(log)
        }
        None => None,
    };
    let record = access_log.is_some();

    match cli.command {
        Command::Range { timeframe, from, to } => {
            let list = reader.get_in_data_range(
                TimeUnit::from_millis(from),
                TimeUnit::from_millis(to),
                timeframe,
                None,
                None,
                record,
            )?;
            print_list(&list)?;
        }
        Command::Limit {
            timeframe,
            limit,
            offset,
            backward,
        } => {
            let offset = TimeUnit::from_millis(offset);
            let settings = if backward {
                DataLimitSettings::backward(timeframe, limit, offset)
            } else {
                DataLimitSettings::forward(timeframe, limit, offset)
            };
            print_list(&reader.get_data_limit(&settings, record)?)?;
        }
        Command::Earliest { timeframe } => match reader.get_earliest_data(timeframe)? {
            Some(found) => println!("{}", serde_json::to_string(&found)?),
            None => println!("null"),
        },
        Command::Latest { timeframe } => match reader.get_latest_data(timeframe)? {
            Some(found) => println!("{}", serde_json::to_string(&found)?),
            None => println!("null"),
        },
        Command::Reindex {
            checkpoint,
            consistent,
        } => {
            registry.set(
                state.id(),
                state.base_timeframe(),
                Checkpoint {
                    time: checkpoint.map(TimeUnit::from_millis),
                    consistent,
                },
            )?;
            let labels = reader
                .get_timeframe_to_reindex()?
                .into_iter()
                .map(|tf| tf.label())
                .collect::<tfstore::Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string(&labels)?);
        }
        Command::Dump => {
            for entry in reader.scan_asset()? {
                println!("{} {} {}", entry.timeframe, entry.time, entry.value_len);
            }
        }
    }

    // Dropping the last reader joins the recorder and drains pending stamps.
    drop(reader);
    if let Some(log) = access_log {
        log.flush()?;
    }

    Ok(())
}

fn load_csv(path: &Path, state: &AssetState, store: &MemoryStore) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = 0;
    for (line, row) in rdr.records().enumerate() {
        let row = row?;
        if row.len() < 3 {
            bail!("line {}: expected timeframe,time,fields", line + 1);
        }
        let timeframe: Timeframe = row[0].parse()?;
        let time = TimeUnit::from_millis(row[1].parse().context("time")?);
        let fields = row
            .iter()
            .skip(2)
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("line {}: fields", line + 1))?;
        let value = value_from_fields(state.data_type(), &fields)
            .ok_or_else(|| anyhow!("line {}: wrong field count for {:?}", line + 1, state.data_type()))?;
        store.put(
            state.codec().encode_timeframe(timeframe, time)?,
            BinaryParser::encode(&value),
        )?;
        rows += 1;
    }
    Ok(rows)
}

fn value_from_fields(data_type: DataType, fields: &[f64]) -> Option<Value> {
    match (data_type, fields) {
        (DataType::Point, [v]) => Some(Value::Point(*v)),
        (DataType::Quantity, [plus, minus]) => Some(Value::Quantity {
            plus: *plus,
            minus: *minus,
        }),
        (DataType::Candle, [open, high, low, close, volume]) => Some(Value::Candle {
            open: *open,
            high: *high,
            low: *low,
            close: *close,
            volume: *volume,
        }),
        _ => None,
    }
}

fn print_list(list: &DataList) -> Result<()> {
    for record in list.iter() {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}
