/// CLI argument parsing for the `rdb-dump` binary.
///
/// Handles the dump file path, the chunk size override, and the
/// checksum verification flag.

/// Extracts an option value from command-line arguments.
///
/// Looks for `--{option_name}` and returns the following argument as the value.
fn get_option_value(option_name: &str, args: &[String]) -> Option<String> {
    let option_flag = format!("--{}", option_name);
    if let Some(option_position) = args.iter().position(|x| x == &option_flag) {
        args.get(option_position + 1).cloned()
    } else {
        None
    }
}

/// True when the bare flag `--{flag_name}` is present.
fn has_flag(flag_name: &str, args: &[String]) -> bool {
    let flag = format!("--{}", flag_name);
    args.iter().any(|x| x == &flag)
}

/// Parses the dump file path from `--file`.
pub fn get_file(args: &[String]) -> Option<String> {
    get_option_value("file", args)
}

/// Parses the chunk size override from `--chunk-size`.
///
/// # Returns
/// * `Ok(Some(size))` - If the argument is present and a positive integer
/// * `Ok(None)` - If no chunk-size argument is provided
/// * `Err(e)` - If the argument is present but invalid
pub fn get_chunk_size(args: &[String]) -> Result<Option<usize>, anyhow::Error> {
    match get_option_value("chunk-size", args) {
        Some(raw) => {
            let size: usize = raw.parse()?;
            anyhow::ensure!(size > 0, "--chunk-size must be positive");
            Ok(Some(size))
        }
        None => Ok(None),
    }
}

/// True when `--verify-checksum` was passed.
pub fn get_verify_checksum(args: &[String]) -> bool {
    has_flag("verify-checksum", args)
}
