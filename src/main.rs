use anyhow::anyhow;
use std::env;
use std::fs::File;

use rdb_stream::{Record, Records, ScanOptions, Value};

mod cli;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let path = cli::get_file(&args)
        .ok_or(anyhow!("usage: rdb-dump --file <dump.rdb> [--chunk-size <bytes>] [--verify-checksum]"))?;
    let mut options = ScanOptions::default();
    if let Some(chunk_size) = cli::get_chunk_size(&args)? {
        options.chunk_size = chunk_size;
    }
    options.verify_checksum = cli::get_verify_checksum(&args);

    let file = File::open(&path)?;
    for record in Records::with_options(file, options) {
        println!("{}", describe(&record?));
    }
    Ok(())
}

fn describe(record: &Record) -> String {
    match record {
        Record::Version(version) => format!("version {}", version),
        Record::SelectDb(id) => format!("select db {}", id),
        Record::ResizeDb { main, expires } => {
            format!("resize hint: {} keys, {} with expiry", main, expires)
        }
        Record::Aux { key, value } => format!("aux {} = {}", key, value),
        Record::Entry { key, value, expiry } => {
            let mut line = format!("{} = {}", key, describe_value(value));
            if let Some(expiry) = expiry {
                line.push_str(&format!(" (expires {:?})", expiry));
            }
            line
        }
        Record::Eof(checksum) => {
            let hex: String = checksum.iter().map(|b| format!("{:02x}", b)).collect();
            format!("eof, checksum {}", hex)
        }
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Bytes(data) => format!("{:?}", String::from_utf8_lossy(data)),
        Value::Int(n) => n.to_string(),
        Value::List(elements) => format!("list of {} elements", elements.len()),
        Value::Set(members) => format!("set of {} members", members.len()),
        Value::Hash(pairs) => format!("hash of {} fields", pairs.len()),
    }
}
