use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use base64::alphabet::URL_SAFE;
use base64::engine::{general_purpose, Engine as _};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::core::logger::event_logger::CombinedLogEntry;

/// Reads an ndjson event log and returns it as a compact, compressed,
/// URL-safe base64 blob suitable for a `?logs=` query parameter.
///
/// Pipeline: parse lines -> MessagePack -> gzip -> base64url. Lines that
/// fail to parse (partial writes at the tail of an unflushed file) are
/// skipped rather than failing the whole encode.
pub fn process_log_for_url<P: AsRef<Path>>(log_path: P) -> Result<String> {
    let file = File::open(log_path.as_ref()).context("failed to open log file")?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read line from log file")?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<CombinedLogEntry>(&line) {
            entries.push(entry);
        }
    }

    let msgpack = rmp_serde::to_vec(&entries).context("failed to encode log as MessagePack")?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&msgpack).context("failed to compress log data")?;
    let compressed = encoder.finish().context("failed to finish compression")?;

    let engine = general_purpose::GeneralPurpose::new(&URL_SAFE, general_purpose::PAD);
    Ok(engine.encode(compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logger::event_logger::EventLogger;
    use crate::core::types::LogEvent;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::io::Write;

    fn decode(encoded: &str) -> Vec<CombinedLogEntry> {
        let engine = general_purpose::GeneralPurpose::new(&URL_SAFE, general_purpose::PAD);
        let compressed = engine.decode(encoded).unwrap();
        let mut decoder = GzDecoder::new(&compressed[..]);
        let mut msgpack = Vec::new();
        decoder.read_to_end(&mut msgpack).unwrap();
        rmp_serde::from_slice(&msgpack).unwrap()
    }

    #[test]
    fn test_round_trip_encoding_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut logger = EventLogger::with_file(path.to_str().unwrap()).unwrap();
        logger.log_thread_spawn(1, None);
        logger.log_mutex_create(10, Some(1));
        logger.log_mutex_lock(1, 10);
        logger.log_mutex_unlock(1, 10);
        logger.flush().unwrap();

        let encoded = process_log_for_url(&path).unwrap();
        assert!(!encoded.is_empty());

        let decoded = decode(&encoded);
        assert_eq!(decoded.len(), 4);
        match &decoded[0].event {
            LogEvent::ThreadSpawn { thread_id, parent_id } => {
                assert_eq!(*thread_id, 1);
                assert_eq!(*parent_id, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match &decoded[2].event {
            LogEvent::MutexLock { thread_id, lock_id } => {
                assert_eq!(*thread_id, 1);
                assert_eq!(*lock_id, 10);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(decoded[1].graph.threads, vec![1]);
    }

    #[test]
    fn test_process_log_for_url_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut logger = EventLogger::with_file(path.to_str().unwrap()).unwrap();
        logger.log_thread_spawn(1, None);
        logger.log_thread_spawn(2, None);
        logger.flush().unwrap();

        // Splice a line that isn't valid JSON between the two real entries,
        // as if a concurrent write had torn mid-line.
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines.insert(1, "this is not valid JSON");
        let mut file = std::fs::File::create(&path).unwrap();
        for line in &lines {
            writeln!(file, "{line}").unwrap();
        }
        drop(file);

        let encoded = process_log_for_url(&path).unwrap();
        let decoded = decode(&encoded);
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn test_process_log_for_url_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ndjson");
        std::fs::File::create(&path).unwrap();

        let encoded = process_log_for_url(&path).unwrap();
        assert!(!encoded.is_empty());
        let decoded = decode(&encoded);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_file_not_found() {
        let result = process_log_for_url("non_existent_file.log");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("failed to open log file"));
    }
}
